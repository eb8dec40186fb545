use std::io::Write as _;
use std::path::{Path, PathBuf};

use clap::Parser;

use imagen_batch::{
    ConfigSource, Env, Error, Google, LoadOutcome, Orchestrator, Result, VariantCount, catalog,
    load_or_template, select_model,
};

#[derive(Debug, Parser)]
#[command(name = "imagen-batch", about = "Bulk image generation via Google AI Studio")]
struct Cli {
    /// Model identifier; skips the interactive menu. Must be in the
    /// discovered catalog.
    #[arg(long)]
    model: Option<String>,

    /// Images per prompt (1-4); skips the interactive question.
    #[arg(long)]
    variants: Option<u32>,

    /// Start generation without asking for confirmation.
    #[arg(short = 'y', long)]
    yes: bool,

    /// Prompt file: a JSON object of name -> prompt text.
    #[arg(long, default_value = "prompts.json")]
    prompts: PathBuf,

    /// Base directory for timestamped run output.
    #[arg(long, default_value = "generated_images")]
    output: PathBuf,
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    println!();
    println!("  Bulk Image Generator");
    println!("  ====================");
    println!();

    let env = Env::load(Path::new(".")).await;
    let api_key = env.resolve_api_key()?;
    let client = Google::new(api_key);

    let prompts = match load_or_template(&cli.prompts).await? {
        LoadOutcome::TemplateCreated => {
            println!("No {} found. Created a template at:", cli.prompts.display());
            println!("  {}", cli.prompts.display());
            println!("Edit it with your prompts and run again.");
            return Ok(());
        }
        LoadOutcome::Loaded(set) if set.is_empty() => {
            println!(
                "{} has no usable prompts. Add some and run again.",
                cli.prompts.display()
            );
            return Ok(());
        }
        LoadOutcome::Loaded(set) => set,
    };
    println!(
        "Loaded {} prompt(s) from {}",
        prompts.len(),
        cli.prompts.display()
    );

    println!("Fetching available models...");
    let models = catalog::discover(&client).await;

    let mut source = FlagsThenTerminal {
        model: cli.model,
        variants: cli.variants,
        yes: cli.yes,
    };
    let model = source.select_model(&models)?;
    let variant_count = source.variant_count()?;
    if !source.confirm(&model, prompts.len(), variant_count)? {
        println!("Cancelled.");
        return Ok(());
    }

    let orchestrator = Orchestrator::new(client, cli.output);
    let report = orchestrator
        .run(&model, prompts.prompts(), variant_count)
        .await?;
    println!("{}", report.render());
    Ok(())
}

/// Answers from flags where given, terminal prompts otherwise.
struct FlagsThenTerminal {
    model: Option<String>,
    variants: Option<u32>,
    yes: bool,
}

impl ConfigSource for FlagsThenTerminal {
    fn select_model(&mut self, catalog: &[String]) -> Result<String> {
        match self.model.take() {
            Some(requested) => select_model(catalog, &requested),
            None => choose_model(catalog),
        }
    }

    fn variant_count(&mut self) -> Result<VariantCount> {
        match self.variants {
            Some(n) => VariantCount::new(n).ok_or(Error::InvalidVariantCount(n)),
            None => ask_variant_count(),
        }
    }

    fn confirm(
        &mut self,
        model: &str,
        prompt_count: usize,
        variant_count: VariantCount,
    ) -> Result<bool> {
        if self.yes {
            return Ok(true);
        }
        confirm_run(model, prompt_count, variant_count)
    }
}

fn read_line(prompt: &str) -> std::io::Result<String> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn choose_model(models: &[String]) -> Result<String> {
    let rule = "\u{2500}".repeat(42);
    println!("\n{rule}");
    println!("  Available Image Generation Models");
    println!("{rule}");
    for (i, model) in models.iter().enumerate() {
        println!("  [{}] {model}", i + 1);
    }
    println!("{rule}");

    loop {
        let raw = read_line(&format!("Select model (1-{}): ", models.len()))?;
        if let Ok(choice) = raw.parse::<usize>() {
            if (1..=models.len()).contains(&choice) {
                let model = models[choice - 1].clone();
                println!("  -> {model}");
                return Ok(model);
            }
        }
        println!("  Invalid choice, try again.");
    }
}

fn ask_variant_count() -> Result<VariantCount> {
    loop {
        let raw = read_line("Images per prompt (1-4) [default: 1]: ")?;
        if raw.is_empty() {
            return Ok(VariantCount::default());
        }
        if let Some(count) = raw.parse::<u32>().ok().and_then(VariantCount::new) {
            return Ok(count);
        }
        println!("  Enter a number between 1 and 4.");
    }
}

fn confirm_run(model: &str, prompt_count: usize, variant_count: VariantCount) -> Result<bool> {
    let total_images = prompt_count * variant_count.get() as usize;
    let rule = "=".repeat(50);
    println!("\n{rule}");
    println!("  Model:             {model}");
    println!("  Prompts:           {prompt_count}");
    println!("  Images per prompt: {}", variant_count.get());
    println!("  Total images:      {total_images}");
    println!("{rule}");

    let answer = read_line("Start generation? (Y/n): ")?.to_lowercase();
    Ok(answer.is_empty() || matches!(answer.as_str(), "y" | "yes"))
}
