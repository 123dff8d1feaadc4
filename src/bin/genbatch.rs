//! CLI for GenBatch - batch image transformation.

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use genbatch::batch::{ProcessedItem, DEFAULT_SAMPLE_SIZE};
use genbatch::image::providers::API_KEY_ENV;
use genbatch::{
    enumerate_inputs, BatchConfig, BatchEstimate, BatchRunner, GeminiModel, GeminiProvider,
    ImageProvider, Outcome, Pacing, RunLog, RunObserver, RunSummary, WorkItem,
};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const RULE: &str = "============================================================";

#[derive(Parser)]
#[command(name = "genbatch")]
#[command(about = "Transform a folder of product photos with an AI image model")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print the run summary as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every image in the input directory
    Run(RunArgs),

    /// Process the first few images for a quality check
    Sample(SampleArgs),

    /// Verify the API key and model are usable
    Check(ModelArgs),
}

#[derive(Args)]
struct ModelArgs {
    /// Model to use
    #[arg(long, value_enum, default_value = "pro")]
    model: ModelArg,
}

#[derive(Args)]
struct RunArgs {
    /// Directory containing the source images
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory for transformed images
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Run log file (appended to)
    #[arg(long)]
    log: Option<PathBuf>,

    /// Read the instruction from a file instead of the built-in prompt
    #[arg(long)]
    prompt_file: Option<PathBuf>,

    /// Seconds to wait after each submission
    #[arg(long, default_value_t = 3)]
    pause_secs: u64,

    /// Seconds to wait after a failed submission
    #[arg(long, default_value_t = 5)]
    error_pause_secs: u64,

    #[command(flatten)]
    model: ModelArgs,
}

#[derive(Args)]
struct SampleArgs {
    /// Number of images to process
    #[arg(short = 'n', long, default_value_t = DEFAULT_SAMPLE_SIZE)]
    count: usize,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    /// Nano Banana Pro (gemini-3-pro-image-preview)
    Pro,
    /// Nano Banana (gemini-2.5-flash-image)
    Flash,
}

impl From<ModelArg> for GeminiModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Pro => GeminiModel::NanoBananaPro,
            ModelArg::Flash => GeminiModel::NanoBanana,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            run_batch(BatchConfig::full(), args, cli.json).await?;
        }
        Commands::Sample(args) => {
            run_batch(BatchConfig::sample(args.count), args.run, cli.json).await?;
        }
        Commands::Check(args) => {
            check(args, cli.json).await?;
        }
    }

    Ok(())
}

fn build_provider(model: GeminiModel) -> anyhow::Result<GeminiProvider> {
    GeminiProvider::builder()
        .model(model)
        .build()
        .with_context(|| format!("set {API_KEY_ENV} in the environment before running"))
}

fn apply_overrides(mut config: BatchConfig, args: &RunArgs) -> anyhow::Result<BatchConfig> {
    if let Some(ref input) = args.input {
        config.input_dir = input.clone();
    }
    if let Some(ref output) = args.output {
        config.output_dir = output.clone();
    }
    if let Some(ref log) = args.log {
        config.log_file = log.clone();
    }
    if let Some(ref prompt_file) = args.prompt_file {
        config = config.with_prompt_file(prompt_file)?;
    }
    config.pacing = Pacing {
        success: Duration::from_secs(args.pause_secs),
        error: Duration::from_secs(args.error_pause_secs),
    };
    config.validate()?;
    Ok(config)
}

async fn run_batch(config: BatchConfig, args: RunArgs, json_output: bool) -> anyhow::Result<()> {
    let config = apply_overrides(config, &args)?;
    let model = GeminiModel::from(args.model.model);
    let provider = build_provider(model)?;

    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "cannot create output directory {}",
            config.output_dir.display()
        )
    })?;

    let inputs = enumerate_inputs(&config.input_dir)?;
    let items = inputs.work_items(&config.output_dir, config.mode);
    let sample = config.mode.is_sample();

    if !json_output {
        print_banner(&config, model);
        if sample {
            println!("\nProcessing first {} images as a test:\n", items.len());
            for item in &items {
                println!("  {}. {}", item.index, item.file_name());
            }
            println!("\n{RULE}");
        } else {
            println!("\nFound {} images to process\n", items.len());
        }
    }

    let title = if sample {
        "Test Run - Processing Log"
    } else {
        "Batch Run - Processing Log"
    };
    let mut log = RunLog::open(&config.log_file)
        .with_context(|| format!("cannot open run log {}", config.log_file.display()))?;
    log.header(title, items.len())?;

    let runner = BatchRunner::new(provider, config.prompt.as_str()).with_pacing(config.pacing);
    let mut progress = ConsoleProgress {
        quiet: json_output,
        verbose: sample,
    };
    let summary = runner.run(&items, Some(&mut log), &mut progress).await;

    if let Err(e) = log.footer(&summary) {
        tracing::warn!("could not finish run log: {e}");
    }

    let estimate = if sample {
        BatchEstimate::from_sample(&summary, inputs.len())
    } else {
        None
    };

    if json_output {
        let result = serde_json::json!({
            "mode": config.mode,
            "model": model.as_str(),
            "output_dir": config.output_dir.display().to_string(),
            "log_file": log.path().display().to_string(),
            "summary": summary,
            "estimate": estimate,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&config, &summary, log.path().display().to_string());
        if let Some(ref estimate) = estimate {
            print_estimate(estimate);
        }
        print_next_steps(&config);
    }

    Ok(())
}

async fn check(args: ModelArgs, json_output: bool) -> anyhow::Result<()> {
    let model = GeminiModel::from(args.model);
    let provider = build_provider(model)?;
    provider.health_check().await?;

    if json_output {
        let result = serde_json::json!({
            "provider": provider.kind().to_string(),
            "model": model.as_str(),
            "ok": true,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{} is reachable, model {} is available", provider.name(), model);
    }
    Ok(())
}

/// Prints per-item progress lines.
struct ConsoleProgress {
    quiet: bool,
    verbose: bool,
}

impl ConsoleProgress {
    fn print_processed(&self, done: &ProcessedItem) {
        if self.verbose {
            let (w, h) = done.original_size;
            println!("    Size: {w}x{h}");
            if (w, h) != (done.submitted_side, done.submitted_side) {
                let side = done.submitted_side;
                println!("    Pre-cropped to: {side}x{side}");
            }
            let name = done
                .output
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            println!("    ✓ Saved: {name}");
            println!("    Output size: {:.2} MB", done.megabytes());
        } else {
            println!("✓ Done");
        }
    }
}

impl RunObserver for ConsoleProgress {
    fn item_started(&mut self, item: &WorkItem, total: usize) {
        if self.quiet {
            return;
        }
        if self.verbose {
            println!("[{}/{}] Processing {}...", item.index, total, item.file_name());
            println!("    Original: {}", item.input.display());
        } else {
            print!("[{}/{}] Processing {}... ", item.index, total, item.file_name());
            let _ = std::io::stdout().flush();
        }
    }

    fn item_finished(&mut self, item: &WorkItem, total: usize, outcome: &Outcome) {
        if self.quiet {
            return;
        }
        let indent = if self.verbose { "    " } else { "" };
        match outcome {
            Outcome::Processed(done) => self.print_processed(done),
            Outcome::Skipped => {
                println!(
                    "[{}/{}] Skipping {} (already processed)",
                    item.index,
                    total,
                    item.file_name()
                );
            }
            Outcome::Failed(failure) => println!("{indent}✗ {failure}"),
        }
    }

    fn pausing(&mut self, pause: Duration) {
        if !self.quiet && self.verbose {
            println!("    Waiting {} seconds before next image...\n", pause.as_secs());
        }
    }
}

fn print_banner(config: &BatchConfig, model: GeminiModel) {
    if config.mode.is_sample() {
        println!("TEST MODE: processing a small sample only");
    } else {
        println!("Cake Gallery - AI Batch Processor");
    }
    println!("{RULE}");
    println!("Model: {model}");
    println!("Input: {}", config.input_dir.display());
    println!("Output: {}", config.output_dir.display());
    println!("{RULE}");
}

fn print_summary(config: &BatchConfig, summary: &RunSummary, log_path: String) {
    let elapsed = summary.elapsed.as_secs_f64();
    println!("\n{RULE}");
    if config.mode.is_sample() {
        println!("TEST RESULTS");
    } else {
        println!("Batch Processing Complete");
    }
    println!("{RULE}");
    println!("Total images: {}", summary.total);
    println!("✓ Processed: {}", summary.processed);
    println!("- Skipped (already done): {}", summary.skipped);
    println!("✗ Errors: {}", summary.failed);
    println!("Total time: {elapsed:.1} seconds ({:.1} minutes)", elapsed / 60.0);
    if let Some(avg) = summary.average_per_item() {
        println!("Average per image: {:.1} seconds", avg.as_secs_f64());
    }
    println!("\nProcessed images saved to: {}", config.output_dir.display());
    println!("Log file: {log_path}");
}

fn print_estimate(estimate: &BatchEstimate) {
    println!(
        "\nFULL BATCH ESTIMATE (if you process all {} images):",
        estimate.total_images
    );
    println!("   Estimated time: {:.1} hours", estimate.hours());
    println!(
        "   Estimated cost: ${:.2} - ${:.2} USD",
        estimate.cost_low, estimate.cost_high
    );
}

fn print_next_steps(config: &BatchConfig) {
    println!("\nNext steps:");
    if config.mode.is_sample() {
        println!("   1. Compare originals with {}", config.output_dir.display());
        println!("   2. If satisfied, run the full batch: genbatch run");
        println!("   3. To adjust quality, pass a different instruction with --prompt-file");
    } else {
        println!("   1. Review processed images in {}", config.output_dir.display());
        println!("   2. Check {} for details", config.log_file.display());
        println!("   3. Re-run to retry any failed images");
    }
}
