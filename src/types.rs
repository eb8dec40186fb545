use bytes::Bytes;

/// Named unit of work: one text description mapping to one output file group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub name: String,
    pub text: String,
}

impl Prompt {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Number of image variants requested per prompt. Only values in 1..=4
/// exist, so an out-of-range count cannot reach the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantCount(u32);

impl VariantCount {
    pub const MAX: u32 = 4;

    pub fn new(n: u32) -> Option<Self> {
        (1..=Self::MAX).contains(&n).then_some(Self(n))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for VariantCount {
    fn default() -> Self {
        Self(1)
    }
}

/// One provider call: a single prompt rendered with up to four variants.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub variant_count: VariantCount,
}

/// Ordered image payloads returned by one generation call. An empty
/// batch is a valid provider response and is classified by the
/// orchestrator, not here.
#[derive(Debug, Clone, Default)]
pub struct ImageBatch {
    pub images: Vec<Bytes>,
}
