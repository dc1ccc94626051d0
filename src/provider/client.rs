//! Generation provider trait.

use std::future::Future;

use super::error::ProviderError;
use crate::types::{Target, Tone};

/// Something that rewrites `text` for one target.
///
/// One call per target. Implementations must not retry internally.
pub trait GenerationProvider: Send + Sync {
    fn generate(
        &self,
        text: &str,
        target: &Target,
        tone: &Tone,
    ) -> impl Future<Output = Result<String, ProviderError>> + Send;
}
