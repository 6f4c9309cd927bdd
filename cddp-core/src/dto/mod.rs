//! Data Transfer Objects for the HTTP API
//!
//! This module contains DTOs exchanged between the CDDP server and its
//! clients. Domain types that travel as-is (pipeline artifacts, summaries,
//! ingestion descriptors) are not duplicated here.

pub mod error;
pub mod generation;
