//! Backend API surface shared by the controller and its tests
//!
//! This module contains ONLY:
//! - Endpoint identifiers and paths
//! - Request/response body types
//! - Response envelope decoding (pure, no HTTP client dependency)
//!
//! The HTTP transport lives in nsw-ui and wraps these types.

pub mod endpoint;
pub mod envelope;
pub mod types;

pub use endpoint::Endpoint;
pub use envelope::{decode_envelope, Envelope, EnvelopeError};
pub use types::{
    Ack, CandidateBatch, DraftEditRequest, DraftPayload, EmptyRequest, FinalPayload,
    RatingRequest, StageRequest,
};
