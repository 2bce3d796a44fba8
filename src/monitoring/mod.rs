/*!
 * Monitoring
 * Tracing setup for the heap and its demo driver
 */

mod tracer;

pub use tracer::{init_tracing, ScenarioSpan};
