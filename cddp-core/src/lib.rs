//! CDDP Core
//!
//! Core types and abstractions shared by the CDDP gallery service, its
//! client and the command line.
//!
//! This crate contains:
//! - Domain types: pipeline artifacts and their index records, prompt
//!   templates, generation requests and ingestion task descriptors
//! - DTOs: Data transfer objects exchanged over the HTTP API

pub mod domain;
pub mod dto;
