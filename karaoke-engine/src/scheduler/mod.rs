//! Scheduler layer
//!
//! Serializes pipeline execution: jobs are queued in FIFO order and a
//! single worker runs them one after the other.

pub mod worker;

pub use worker::JobQueue;
