//! Core domain types
//!
//! A job aggregates the results of the six pipeline stages. These types are
//! owned by the engine (which mutates them) and copied out to readers as DTOs.

pub mod job;
pub mod stage;
