//! Hygiene analysis CLI binary.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use hygiene_models::{AnalysisProgress, AnalysisResult};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hygiene_worker::{AnalyzerConfig, HygieneAnalyzer};

#[derive(Parser)]
#[command(name = "hygiene-analyze")]
#[command(about = "Score a kitchen preparation video for hygiene compliance", long_about = None)]
#[command(version)]
struct Cli {
    /// Video file to analyze
    video: PathBuf,

    /// Duration estimate in seconds (probed with ffprobe when omitted)
    #[arg(short, long)]
    duration: Option<f64>,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,
}

fn init_tracing() -> anyhow::Result<()> {
    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("hygiene=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
    Ok(())
}

fn print_report(result: &AnalysisResult) {
    println!("Overall score: {}/100", result.overall_score);
    println!("{}", result.summary);
    println!();

    println!("Categories:");
    for (category, score) in &result.category_scores {
        println!(
            "  {:<24} {:>5.1}  (seen in {:.0}% of frames)",
            category.display_name(),
            score.score,
            score.detection_rate
        );
    }

    if !result.findings.is_empty() {
        println!();
        println!("Findings:");
        for finding in &result.findings {
            println!(
                "  [{}] {}s  {}",
                finding.severity.as_str(),
                finding.timestamp_secs,
                finding.description
            );
        }
    }

    println!();
    println!("Suggestions:");
    for suggestion in &result.suggestions {
        println!("  - {}", suggestion);
    }

    if result.frames_failed > 0 {
        println!();
        println!(
            "Note: {} of {} frames could not be analyzed.",
            result.frames_failed,
            result.frames_analyzed + result.frames_failed
        );
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = AnalyzerConfig::from_env().context("Failed to load configuration")?;
    let analyzer = HygieneAnalyzer::from_config(&config).context("Failed to create analyzer")?;

    info!(
        video = %cli.video.display(),
        detector = analyzer.detector_name(),
        "Starting hygiene analysis"
    );

    let on_progress = |p: AnalysisProgress| {
        info!(stage = p.stage.as_str(), percent = p.percent, "{}", p.message);
    };

    match analyzer
        .analyze_file(&cli.video, cli.duration, Some(&on_progress))
        .await
    {
        Ok(result) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_report(&result);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!(error = %e, "Analysis failed");
            eprintln!("{}", e.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    if let Err(e) = init_tracing() {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
