use async_trait::async_trait;

use crate::Result;
use crate::types::{GenerationRequest, ImageBatch};

/// The remote image-generation endpoint as the orchestrator sees it.
/// Both calls may fail on network, auth, or quota errors; `generate`
/// is the operation wrapped by [`RetryPolicy`](crate::RetryPolicy).
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Raw model identifiers as the provider reports them (a
    /// `models/` prefix is allowed and stripped by the catalog).
    async fn list_models(&self) -> Result<Vec<String>>;

    async fn generate(&self, request: &GenerationRequest) -> Result<ImageBatch>;
}

#[async_trait]
impl<'a, P: ImageProvider + ?Sized> ImageProvider for &'a P {
    async fn list_models(&self) -> Result<Vec<String>> {
        (**self).list_models().await
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<ImageBatch> {
        (**self).generate(request).await
    }
}
