//! Core domain types
//!
//! This module contains the core domain structures used across CDDP crates.
//! The server persists and generates them, the client and CLI exchange them.

pub mod generation;
pub mod ingestion;
pub mod pipeline;
pub mod template;
