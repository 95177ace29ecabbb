//! Pipeline layer
//!
//! Runs the fixed download -> extract -> separate_vocals -> transcribe ->
//! merge -> overlay sequence for a single job.

mod executor;

pub use executor::PipelineExecutor;
