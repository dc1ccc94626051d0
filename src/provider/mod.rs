//! Generation provider - one outbound language-model call per target.
//!
//! # Example
//!
//! ```ignore
//! use crate::provider::{GatewaySettings, GenerationProvider, ProviderGateway};
//! use crate::types::{Target, Tone};
//!
//! let gateway = ProviderGateway::new(GatewaySettings::from(&config))?;
//! let post = gateway.generate(text, &Target::Linkedin, &Tone::Professional).await?;
//! ```

mod client;
mod error;
mod gateway;
mod prompt;

pub use client::GenerationProvider;
pub use error::{ProviderCause, ProviderError};
pub use gateway::{GatewaySettings, ProviderGateway};
pub use prompt::Prompt;
