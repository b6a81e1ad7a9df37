use std::{io::Write, path::PathBuf, sync::Arc};

use clap::Parser;
use prompt_router::{
    catalog::ModelCatalog,
    config::{self, RouterConfig},
    observability,
    pipeline::{Pipeline, PipelineResult},
    providers::{FallbackInvoker, OpenAICompatibleProvider, build_attempt_sequence},
    routing::{matching_group, select_model, validate_model_override},
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

#[derive(Parser)]
#[command(version, about = "Route prompts to the best-fitting model, with fallback", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to config file (defaults to ./prompt-router.toml if it exists,
    /// otherwise built-in defaults)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Interactive prompt loop (default)
    Chat,
    /// Answer a single prompt
    Ask {
        /// The prompt text
        prompt: String,
        /// Use this model instead of keyword selection
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Interactive batch run, writing every result to a CSV file
    #[cfg(feature = "csv-export")]
    Batch {
        /// Results file (defaults to batch.output from config)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Pause between prompts in milliseconds (defaults to batch.pause_ms)
        #[arg(long)]
        pause_ms: Option<u64>,
    },
    /// Show which model a prompt would be routed to, without calling it
    Select {
        /// The prompt text
        prompt: String,
    },
    /// List catalogued models and their fallbacks
    Models,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    if let Err(e) = config::load_dotenv() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let config = match RouterConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let catalog = Arc::new(ModelCatalog::builtin().with_overrides(&config.catalog));

    match args.command.unwrap_or(Command::Chat) {
        Command::Models => run_models(&catalog),
        Command::Select { prompt } => run_select(&config, &catalog, &prompt),
        Command::Ask { prompt, model } => {
            if let Some(model) = &model
                && let Err(e) = validate_model_override(model)
            {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
            let mut pipeline = start(&config, catalog);
            run_ask(&mut pipeline, &prompt, model.as_deref()).await;
        }
        #[cfg(feature = "csv-export")]
        Command::Batch { output, pause_ms } => {
            let output = output.unwrap_or_else(|| config.batch.output.clone());
            let pause = pause_ms
                .map(std::time::Duration::from_millis)
                .unwrap_or_else(|| config.batch.pause());
            let mut pipeline = start(&config, catalog);
            if let Err(e) = run_batch(&mut pipeline, &output, pause).await {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        Command::Chat => {
            let mut pipeline = start(&config, catalog);
            if let Err(e) = run_chat(&mut pipeline).await {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    }
}

/// Initialize logging, resolve the credential and build the pipeline.
/// Exits the process on any configuration failure.
fn start(config: &RouterConfig, catalog: Arc<ModelCatalog>) -> Pipeline {
    if let Err(e) = observability::init_tracing(&config.logging) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let credential = match config.credential() {
        Ok(credential) => credential,
        Err(e) => {
            tracing::error!(error = %e, "Configuration failure");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let client = match OpenAICompatibleProvider::from_config(&config.api, credential) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: failed to create HTTP client: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        url = %client.url(),
        models = catalog.len(),
        max_attempts = config.retry.max_attempts,
        "Prompt router ready"
    );

    let invoker = FallbackInvoker::from_config(Arc::new(client), catalog, config);
    Pipeline::new(invoker).with_memory()
}

fn run_models(catalog: &ModelCatalog) {
    for entry in catalog.entries() {
        let fallbacks = catalog.fallbacks_for(&entry.id);
        let fallbacks = if fallbacks.is_empty() {
            "-".to_string()
        } else {
            fallbacks.join(", ")
        };
        println!("{:<24} {:<22} -> {}", entry.id, entry.capability, fallbacks);
    }
}

fn run_select(config: &RouterConfig, catalog: &ModelCatalog, prompt: &str) {
    let model = select_model(prompt);
    let group = matching_group(prompt).map_or("default", |g| g.name);
    let capability = catalog.capability(model).unwrap_or("uncatalogued");

    let sequence = build_attempt_sequence(model, catalog, config.routing.unknown_models);

    println!("Model:      {model}");
    println!("Group:      {group}");
    println!("Capability: {capability}");
    println!("Sequence:   {}", sequence.join(" -> "));
}

async fn run_ask(pipeline: &mut Pipeline, prompt: &str, model: Option<&str>) {
    let result = match model {
        Some(model) => pipeline.run_with_model(prompt, model).await,
        None => pipeline.run(prompt).await,
    };
    print_summary(&result);
}

async fn run_chat(pipeline: &mut Pipeline) -> std::io::Result<()> {
    let mut lines = stdin_lines();

    loop {
        let Some(prompt) = read_prompt(&mut lines, "Enter your prompt (or 'exit' to quit): ").await?
        else {
            break;
        };
        if prompt.is_empty() {
            continue;
        }

        let result = pipeline.run(&prompt).await;
        print_summary(&result);
    }

    if let Some(memory) = pipeline.memory() {
        println!("Session ended after {} successful exchange(s).", memory.len());
    }
    Ok(())
}

#[cfg(feature = "csv-export")]
async fn run_batch(
    pipeline: &mut Pipeline,
    output: &std::path::Path,
    pause: std::time::Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    use prompt_router::results::{ResultRecord, ResultSink};

    let mut sink = ResultSink::create(output)?;
    let mut lines = stdin_lines();
    let mut test_number = 1;

    loop {
        let label = format!("Enter Prompt {test_number} (or 'exit' to quit): ");
        let Some(prompt) = read_prompt(&mut lines, &label).await? else {
            break;
        };
        if prompt.is_empty() {
            continue;
        }

        let result = pipeline.run(&prompt).await;
        print_summary(&result);

        sink.write(&ResultRecord::from_pipeline(test_number, &result))?;
        test_number += 1;

        tokio::time::sleep(pause).await;
    }

    println!("{} result(s) saved to {}", sink.rows(), output.display());
    Ok(())
}

fn stdin_lines() -> Lines<BufReader<Stdin>> {
    BufReader::new(tokio::io::stdin()).lines()
}

/// Print `label` and read one trimmed line. `None` on EOF or `exit`.
async fn read_prompt(
    lines: &mut Lines<BufReader<Stdin>>,
    label: &str,
) -> std::io::Result<Option<String>> {
    print!("\n{label}");
    std::io::stdout().flush()?;

    let Some(line) = lines.next_line().await? else {
        return Ok(None);
    };
    let prompt = line.trim();
    if prompt.eq_ignore_ascii_case("exit") {
        return Ok(None);
    }
    Ok(Some(prompt.to_string()))
}

fn print_summary(result: &PipelineResult) {
    println!("\n--- Summary ---");
    println!("Prompt:     {}", result.state.prompt);
    println!("Model Used: {}", result.model());
    println!("Response:   {}", result.response());
}
