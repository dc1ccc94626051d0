//! Request handling - authenticate, validate, check quota, generate, persist.
//!
//! [`GenerationOrchestrator`] owns the per-request state machine and
//! [`router`] puts it behind HTTP.

mod error;
mod http;
mod orchestrator;

#[cfg(test)]
mod testing;

pub use error::GenerateError;
pub use http::router;
pub use orchestrator::{GenerateRequest, GenerateResponse, GenerationOrchestrator, QuotaView};
