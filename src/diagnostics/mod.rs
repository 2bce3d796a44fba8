/*!
 * Diagnostics
 *
 * Read-only observers of the heap: a free-list printer, a tag signature
 * checker and a layout verifier. None of them alter allocator control flow.
 */

mod printer;
mod signature;
mod verify;

pub use printer::FreeListDump;
pub use signature::{check_signature, SignatureMismatch};
pub use verify::{verify, Violation};
