//! CLI command definitions for promptforge.
//!
//! `optimize` runs the full pipeline; `score`, `models` and `check` expose the
//! heuristic scorer and the local model server on their own.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing::info;

use crate::config::{ChatConfig, OptimizerConfig, RunnerConfig, ScoringMode};
use crate::llm::{LiteLlmClient, LlmProvider, ModelRunner, OllamaClient, ProviderRunner};
use crate::pipeline::{OptimizationResult, PromptOptimizer, TaskSpec};
use crate::scoring::ScoreBreakdown;

/// Maximum prompt characters shown per row of the ranking table.
const PREVIEW_CHARS: usize = 72;

/// Iterative prompt optimizer for small and local language models.
#[derive(Parser)]
#[command(name = "promptforge")]
#[command(about = "Optimize prompts for local language models")]
#[command(version)]
#[command(
    long_about = "promptforge rewrites a prompt with an optimizer LLM, critiques and refines it, generates variants, runs every candidate against a target model and scores the outputs.\n\nExample usage:\n  promptforge optimize --task \"Translate Chinese to English\" --prompt \"Translate this:\" --example \"你好\""
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Run the optimization pipeline for a prompt.
    #[command(alias = "opt")]
    Optimize(OptimizeArgs),

    /// Compute the heuristic score of an output.
    Score(ScoreArgs),

    /// List models installed on the local model server.
    Models(ServerArgs),

    /// Check whether the local model server is reachable.
    Check(ServerArgs),
}

/// Arguments for `promptforge optimize`.
#[derive(Parser, Debug)]
pub struct OptimizeArgs {
    /// What the prompt should make the model do.
    #[arg(short = 't', long)]
    pub task: String,

    /// The prompt to optimize.
    #[arg(short = 'p', long)]
    pub prompt: String,

    /// Example input. Enables critique and refinement.
    #[arg(short = 'e', long)]
    pub example: Option<String>,

    /// Model candidates are executed against (overrides config).
    #[arg(short = 'm', long, env = "PROMPTFORGE_TARGET_MODEL")]
    pub target_model: Option<String>,

    /// Chat model driving the stages and the judge (defaults to LITELLM_DEFAULT_MODEL).
    #[arg(long)]
    pub optimizer_model: Option<String>,

    /// YAML optimizer configuration. Environment variables override it.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Score with the heuristic only; no judge calls.
    #[arg(long)]
    pub heuristic_only: bool,

    /// Execute candidates through the chat endpoint instead of the local server.
    #[arg(long)]
    pub remote_target: bool,

    /// Local model server URL.
    #[arg(long, env = "OLLAMA_HOST")]
    pub host: Option<String>,

    /// Print the full result as JSON.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for `promptforge score`.
#[derive(Parser, Debug)]
pub struct ScoreArgs {
    /// File containing the output to score, or "-" for stdin.
    #[arg(short = 'o', long)]
    pub output: String,

    /// Prompt that produced the output.
    #[arg(short = 'p', long, default_value = "")]
    pub prompt: String,

    /// Task description.
    #[arg(short = 't', long, default_value = "")]
    pub task: String,

    /// Also print the per-component scores.
    #[arg(short = 'b', long)]
    pub breakdown: bool,
}

/// Arguments for the local model server commands.
#[derive(Parser, Debug)]
pub struct ServerArgs {
    /// Local model server URL.
    #[arg(long, env = "OLLAMA_HOST")]
    pub host: Option<String>,

    /// Output as JSON.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Parse CLI arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Parse arguments and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Run the CLI with already parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Optimize(args) => run_optimize_command(args).await,
        Commands::Score(args) => run_score_command(args),
        Commands::Models(args) => run_models_command(args).await,
        Commands::Check(args) => run_check_command(args).await,
    }
}

// ============================================================================
// optimize
// ============================================================================

async fn run_optimize_command(args: OptimizeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => OptimizerConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => OptimizerConfig::default(),
    }
    .with_env_overrides()?;

    if let Some(model) = &args.target_model {
        config = config.with_target_model(model.clone());
    }
    if args.heuristic_only {
        config = config.with_scoring_mode(ScoringMode::Heuristic);
    }
    config.validate()?;

    let provider: Arc<dyn LlmProvider> = Arc::new(LiteLlmClient::new(ChatConfig::from_env()?)?);
    let runner: Arc<dyn ModelRunner> = if args.remote_target {
        Arc::new(ProviderRunner::new(provider.clone()))
    } else {
        Arc::new(OllamaClient::new(runner_config(args.host)?)?)
    };

    info!(
        target_model = %config.target_model,
        scoring = %config.scoring_mode,
        guided = args.example.is_some(),
        "Optimizing prompt"
    );

    let mut task = TaskSpec::new(args.task, args.prompt);
    task.example = args.example;

    let mut optimizer = PromptOptimizer::new(provider, runner, config);
    if let Some(model) = args.optimizer_model {
        optimizer = optimizer.with_chat_model(model);
    }
    let result = optimizer.optimize(&task).await;

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| anyhow::anyhow!("Failed to serialize JSON output: {}", e))?;
        println!("{}", json);
    } else {
        print!("{}", render_summary(&result));
    }

    if !result.is_success() {
        anyhow::bail!("Prompt optimization failed");
    }
    Ok(())
}

/// Human-readable summary: best prompt first, then the ranking.
fn render_summary(result: &OptimizationResult) -> String {
    let mut out = String::new();

    if !result.is_success() {
        out.push_str("Optimization failed; the original prompt was kept.\n");
        return out;
    }

    if let Some((prompt, score)) = result.best_prompt() {
        out.push_str(&format!("Best prompt ({:.1}):\n{}\n\n", score, prompt));
    }

    if let Some(critique) = &result.critique_feedback {
        out.push_str("Critique:\n");
        for line in critique.lines() {
            out.push_str(&format!("  - {}\n", line));
        }
        out.push('\n');
    }

    out.push_str(&format!("Candidates ({}):\n", result.scores.len()));
    for (rank, (prompt, score)) in result.ranked().into_iter().enumerate() {
        out.push_str(&format!("{:>3}. {:>5.1}  {}\n", rank + 1, score, preview(prompt)));
    }
    out
}

fn preview(prompt: &str) -> String {
    let single_line = prompt.split_whitespace().collect::<Vec<_>>().join(" ");
    match single_line.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &single_line[..idx]),
        None => single_line,
    }
}

fn runner_config(host: Option<String>) -> anyhow::Result<RunnerConfig> {
    let mut config = RunnerConfig::from_env()?;
    if let Some(host) = host {
        config.host = host;
        config.validate()?;
    }
    Ok(config)
}

// ============================================================================
// score
// ============================================================================

#[derive(Debug, Serialize)]
struct ScoreOutput {
    score: f64,
    #[serde(flatten)]
    breakdown: ScoreBreakdown,
}

fn run_score_command(args: ScoreArgs) -> anyhow::Result<()> {
    let output = read_output_source(&args.output)?;
    let breakdown = ScoreBreakdown::of(&output);
    let score = crate::scoring::heuristic_score(&args.prompt, &output, &args.task);

    if args.breakdown {
        let json = serde_json::to_string_pretty(&ScoreOutput { score, breakdown })
            .map_err(|e| anyhow::anyhow!("Failed to serialize JSON output: {}", e))?;
        println!("{}", json);
    } else {
        println!("{:.2}", score);
    }
    Ok(())
}

/// Reads a file path, or stdin for "-".
fn read_output_source(source: &str) -> anyhow::Result<String> {
    if source == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read output from stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(source).with_context(|| format!("Failed to read {}", source))
    }
}

// ============================================================================
// models / check
// ============================================================================

#[derive(Debug, Serialize)]
struct ModelEntry {
    name: String,
    size_gb: String,
    family: String,
    parameter_size: String,
    quantization: String,
    modified: Option<String>,
}

async fn run_models_command(args: ServerArgs) -> anyhow::Result<()> {
    let client = OllamaClient::new(runner_config(args.host)?)?;
    let models = client
        .list_models()
        .await
        .with_context(|| format!("Failed to list models from {}", client.host()))?;

    let entries: Vec<ModelEntry> = models
        .into_iter()
        .map(|model| ModelEntry {
            size_gb: model.size_gb(),
            modified: model.modified_at.map(|t| t.format("%Y-%m-%d").to_string()),
            name: model.name,
            family: model.details.family,
            parameter_size: model.details.parameter_size,
            quantization: model.details.quantization_level,
        })
        .collect();

    if args.json {
        let json = serde_json::to_string_pretty(&entries)
            .map_err(|e| anyhow::anyhow!("Failed to serialize JSON output: {}", e))?;
        println!("{}", json);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No models installed on {}", client.host());
        return Ok(());
    }
    for entry in &entries {
        println!(
            "{:<32} {:>7} GB  {:<10} {:<8} {:<8} {}",
            entry.name,
            entry.size_gb,
            entry.family,
            entry.parameter_size,
            entry.quantization,
            entry.modified.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

async fn run_check_command(args: ServerArgs) -> anyhow::Result<()> {
    let client = OllamaClient::new(runner_config(args.host)?)?;
    let connected = client.check_connection().await;

    if args.json {
        println!(
            "{}",
            serde_json::json!({ "host": client.host(), "connected": connected })
        );
    } else if connected {
        println!("Connected to {}", client.host());
    } else {
        println!("Cannot reach {}", client.host());
    }

    if !connected {
        anyhow::bail!("Local model server is not reachable");
    }
    Ok(())
}
