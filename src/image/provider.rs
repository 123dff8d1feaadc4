//! Image provider trait.

use crate::error::Result;
use crate::image::types::{GeneratedImage, GenerationRequest, ImageProviderKind};
use async_trait::async_trait;

/// Trait for remote image transformation services.
///
/// A successful call may still return no images: the service can decline
/// (for example through a safety filter) without raising an error.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Submits the request and returns every image payload in the response.
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<GeneratedImage>>;

    /// Returns the kind of this provider.
    fn kind(&self) -> ImageProviderKind;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str {
        match self.kind() {
            ImageProviderKind::Gemini => "Gemini (Google)",
        }
    }

    /// Checks if the provider is reachable and authenticated.
    async fn health_check(&self) -> Result<()>;
}

