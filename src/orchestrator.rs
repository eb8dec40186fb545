use std::path::{Path, PathBuf};

use bytes::Bytes;
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::{info, warn};

use crate::provider::ImageProvider;
use crate::retry::RetryPolicy;
use crate::types::{GenerationRequest, Prompt, VariantCount};
use crate::{Error, Result};

/// Final tally for one run. Mutated only by the orchestrator's
/// sequential loop; `succeeded + failed == total` once `run` returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failed_names: Vec<String>,
    pub output_dir: PathBuf,
}

impl RunReport {
    fn record_failure(&mut self, name: &str) {
        self.failed += 1;
        self.failed_names.push(name.to_string());
    }

    /// Human-readable summary block. Failed names are omitted entirely
    /// when there are none.
    pub fn render(&self) -> String {
        let rule = "=".repeat(50);
        let mut out = format!(
            "{rule}\n  Completed: {}/{} succeeded, {} failed\n",
            self.succeeded, self.total, self.failed
        );
        if !self.failed_names.is_empty() {
            out.push_str(&format!("  Failed:    {}\n", self.failed_names.join(", ")));
        }
        out.push_str(&format!("  Output:    {}\n{rule}", self.output_dir.display()));
        out
    }
}

/// Drives one batch: every prompt is taken to a terminal outcome
/// (persisted or recorded as failed) before the next begins. Per-prompt
/// failures never abort the run; only the run-directory creation does.
pub struct Orchestrator<P> {
    provider: P,
    retry: RetryPolicy,
    output_base: PathBuf,
}

impl<P: ImageProvider> Orchestrator<P> {
    pub fn new(provider: P, output_base: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            retry: RetryPolicy::default(),
            output_base: output_base.into(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn run(
        &self,
        model: &str,
        prompts: &[Prompt],
        variant_count: VariantCount,
    ) -> Result<RunReport> {
        if prompts.is_empty() {
            return Err(Error::EmptyPromptSet);
        }

        let run_dir = self.output_base.join(run_timestamp());
        tokio::fs::create_dir_all(&run_dir).await?;
        info!("saving to: {}", run_dir.display());

        let mut report = RunReport {
            total: prompts.len(),
            output_dir: run_dir.clone(),
            ..RunReport::default()
        };

        for (i, prompt) in prompts.iter().enumerate() {
            info!("[{}/{}] generating: {}", i + 1, report.total, prompt.name);
            let request = GenerationRequest {
                model: model.to_string(),
                prompt: prompt.text.clone(),
                variant_count,
            };

            match self.retry.execute(|| self.provider.generate(&request)).await {
                Ok(batch) if batch.images.is_empty() => {
                    warn!("no image returned for {}", prompt.name);
                    report.record_failure(&prompt.name);
                }
                Ok(batch) => {
                    match persist_images(&run_dir, &prompt.name, variant_count, &batch.images)
                        .await
                    {
                        Ok(()) => report.succeeded += 1,
                        Err(err) => {
                            warn!("could not save images for {} ({err})", prompt.name);
                            report.record_failure(&prompt.name);
                        }
                    }
                }
                Err(err) => {
                    warn!("{} failed: {err}", prompt.name);
                    report.record_failure(&prompt.name);
                }
            }
        }

        Ok(report)
    }
}

/// `<name>.png` for single-variant runs, `<name>_<i>.png` (1-based)
/// otherwise.
pub fn variant_file_name(name: &str, variant_count: VariantCount, index: usize) -> String {
    if variant_count.get() > 1 {
        format!("{name}_{}.png", index + 1)
    } else {
        format!("{name}.png")
    }
}

async fn persist_images(
    run_dir: &Path,
    name: &str,
    variant_count: VariantCount,
    images: &[Bytes],
) -> Result<()> {
    for (index, image) in images.iter().enumerate() {
        let file = run_dir.join(variant_file_name(name, variant_count, index));
        tokio::fs::write(&file, image).await?;
        info!("saved: {}", file.display());
    }
    Ok(())
}

/// Second-resolution UTC run directory name. Two runs started within
/// the same second share a directory and the later one overwrites the
/// earlier; known limitation.
fn run_timestamp() -> String {
    let format = format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
    let now = OffsetDateTime::now_utc();
    now.format(&format)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}
