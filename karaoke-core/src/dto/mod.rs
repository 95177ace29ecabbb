//! Data Transfer Objects
//!
//! Serializable views of the domain handed to the HTTP layer and its clients.

pub mod job;
