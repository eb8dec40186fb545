use std::collections::BTreeMap;
use std::path::Path;

use tracing::warn;

use crate::Result;
use crate::types::Prompt;

pub const TEMPLATE_NAME: &str = "Example Person";
pub const TEMPLATE_TEXT: &str = "Describe your image prompt here.";

/// The loaded batch: job name -> prompt text, iterated in
/// lexicographic name order for deterministic logs and reports.
#[derive(Debug, Clone, Default)]
pub struct PromptSet {
    prompts: Vec<Prompt>,
}

impl PromptSet {
    pub fn from_map(map: BTreeMap<String, String>) -> Self {
        let mut prompts = Vec::<Prompt>::with_capacity(map.len());
        for (name, text) in map {
            if text.trim().is_empty() {
                warn!("skipping prompt {name:?}: text is blank");
                continue;
            }
            prompts.push(Prompt::new(name, text));
        }
        Self { prompts }
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let map = serde_json::from_str::<BTreeMap<String, String>>(contents)?;
        Ok(Self::from_map(map))
    }

    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}

#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(PromptSet),
    /// No prompt file existed; a one-entry template was written so the
    /// user can fill it in and run again.
    TemplateCreated,
}

pub async fn load_or_template(path: &Path) -> Result<LoadOutcome> {
    if !tokio::fs::try_exists(path).await? {
        let template = BTreeMap::from([(TEMPLATE_NAME.to_string(), TEMPLATE_TEXT.to_string())]);
        let contents = serde_json::to_string_pretty(&template)?;
        tokio::fs::write(path, contents).await?;
        return Ok(LoadOutcome::TemplateCreated);
    }

    let contents = tokio::fs::read_to_string(path).await?;
    Ok(LoadOutcome::Loaded(PromptSet::parse(&contents)?))
}
