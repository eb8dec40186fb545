use tracing::warn;

use crate::provider::ImageProvider;

/// Case-insensitive token that marks an identifier as part of the
/// image-generation model family.
pub const FAMILY_TOKEN: &str = "imagen";

/// Known-good models used when discovery fails or comes back empty.
pub const FALLBACK_MODELS: &[&str] = &[
    "imagen-3.0-generate-001",
    "imagen-3.0-generate-002",
    "imagen-4.0-generate-001",
    "imagen-4.0-ultra-generate-001",
];

/// Resolves the usable model catalog. Never fails: any discovery error
/// or an empty filtered result falls back to [`FALLBACK_MODELS`].
pub async fn discover<P: ImageProvider + ?Sized>(provider: &P) -> Vec<String> {
    match provider.list_models().await {
        Ok(models) => {
            let filtered = filter_image_models(models);
            if !filtered.is_empty() {
                return filtered;
            }
            warn!("provider listed no {FAMILY_TOKEN} models; using known defaults");
        }
        Err(err) => warn!("could not fetch models ({err}); using known defaults"),
    }

    FALLBACK_MODELS.iter().map(|m| m.to_string()).collect()
}

/// Strips the `models/` prefix, keeps the image-generation family,
/// and returns a sorted, deduplicated list.
pub fn filter_image_models(models: Vec<String>) -> Vec<String> {
    let mut out = models
        .into_iter()
        .map(|name| {
            name.strip_prefix("models/")
                .map(str::to_string)
                .unwrap_or(name)
        })
        .filter(|name| name.to_lowercase().contains(FAMILY_TOKEN))
        .collect::<Vec<_>>();
    out.sort();
    out.dedup();
    out
}
