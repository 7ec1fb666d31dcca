//! Backend trait for text generation.

use async_trait::async_trait;
use dramaturg_core::CompletionRequest;
use dramaturg_error::DramaturgResult;
use std::sync::Arc;

/// Core trait that all generative backends must implement.
///
/// One call sends one fully assembled prompt to one model and returns the raw
/// text reply. Fallback, throttling and JSON handling live above this seam.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for a single request.
    async fn complete(&self, req: &CompletionRequest) -> DramaturgResult<String>;

    /// Provider name (e.g., "gemini", "scripted").
    fn provider_name(&self) -> &'static str;
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    async fn complete(&self, req: &CompletionRequest) -> DramaturgResult<String> {
        (**self).complete(req).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }
}
