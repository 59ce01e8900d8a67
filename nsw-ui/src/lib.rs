//! nsw-ui - reviewer-side controller for the Novel Scene Workshop
//!
//! Drives the candidate review workflow against the generation backend:
//! - `gateway`: one request/one envelope per backend call
//! - `render`: pure candidate collection → display tree transform
//! - `rating`: fire-and-forget rating propagation
//! - `orchestrator`: stage sequencing, busy indicator, session state,
//!   draft pipeline
//! - `console`: line-oriented reviewer shell used by the binary

pub mod console;
pub mod error;
pub mod gateway;
pub mod orchestrator;
pub mod rating;
pub mod render;

pub use crate::error::{GatewayError, StageError, StageResult};
pub use crate::gateway::{Gateway, HttpTransport, Transport};
pub use crate::orchestrator::{ConfirmPrompt, WorkflowOrchestrator};
pub use crate::render::{render, DisplayTree};
