/*!
 * Tracing
 * Structured tracing for heap operations using the tracing crate
 *
 * Features:
 * - Env-filtered levels through RUST_LOG
 * - JSON-formatted logs for structured parsing
 * - Timed spans around replayed scenarios
 */

use crate::core::limits::TRACE_JSON_ENV_VAR;
use std::time::Instant;
use tracing::{info, span, Level, Span};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - TAGHEAP_TRACE_JSON: Enable JSON output (default: false)
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var(TRACE_JSON_ENV_VAR)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    // try_init: a second call (tests, embedding) keeps the first subscriber
    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
    };

    if installed.is_ok() {
        info!(json = use_json, "Structured tracing initialized");
    }
}

/// Span covering one replayed allocation scenario
pub struct ScenarioSpan {
    span: Span,
    start: Instant,
    name: &'static str,
    steps: usize,
}

impl ScenarioSpan {
    pub fn new(name: &'static str) -> Self {
        let span = span!(
            Level::INFO,
            "scenario",
            name = name,
            steps = tracing::field::Empty,
            duration_us = tracing::field::Empty,
        );
        Self {
            span,
            start: Instant::now(),
            name,
            steps: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run one step inside the span
    pub fn step<R>(&mut self, f: impl FnOnce() -> R) -> R {
        self.steps += 1;
        self.span.in_scope(f)
    }
}

impl Drop for ScenarioSpan {
    fn drop(&mut self) {
        self.span.record("steps", self.steps);
        self.span
            .record("duration_us", self.start.elapsed().as_micros() as u64);
    }
}
