pub mod catalog;
mod config;
mod error;
mod google;
pub mod orchestrator;
pub mod prompts;
mod provider;
mod retry;
mod types;

pub use config::{API_KEY_VARS, ConfigSource, Env, parse_dotenv, select_model};
pub use error::{Error, Result};
pub use google::Google;
pub use orchestrator::{Orchestrator, RunReport};
pub use prompts::{LoadOutcome, PromptSet, load_or_template};
pub use provider::ImageProvider;
pub use retry::RetryPolicy;
pub use types::{GenerationRequest, ImageBatch, Prompt, VariantCount};
