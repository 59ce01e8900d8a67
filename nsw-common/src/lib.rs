//! # NSW Common Library
//!
//! Shared code for the Novel Scene Workshop reviewer controller:
//! - Candidate model and its wire decoding
//! - Generation parameter set with the original form defaults
//! - Backend endpoint and response envelope types
//! - Workflow event bus
//! - Configuration loading

pub mod api;
pub mod candidate;
pub mod config;
pub mod error;
pub mod events;
pub mod params;

pub use candidate::{Candidate, CandidateId, CandidateKind};
pub use error::{Error, Result};
pub use params::ParameterSet;
