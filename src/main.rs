use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use yt_transcript_extractor::output::{self, FailureReport};
use yt_transcript_extractor::{
    utils, Cli, Commands, Config, OutputFormat, StrategyKind, TranscriptPipeline, VideoId,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let loaded = Config::load(cli.config.as_deref()).await;

    match cli.command {
        Commands::Extract {
            video,
            output,
            format,
            cookies,
            methods,
        } => {
            let show_progress = !cli.quiet && !cli.json_logs;
            let outcome = match loaded {
                Ok(config) => {
                    run_extract(config, &video, cookies, methods, output.as_deref(), &format, show_progress).await
                }
                Err(e) => Err(e),
            };

            match outcome {
                Ok(true) => {}
                Ok(false) => std::process::exit(1),
                Err(e) => {
                    report_failure(&e, &format);
                    std::process::exit(1);
                }
            }
        }
        Commands::Serve { host, port } => {
            let mut config = loaded?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;

            let missing_deps = utils::check_dependencies(&config.extraction).await;
            for dep in &missing_deps {
                tracing::warn!("Dependency missing: {}", dep);
            }

            let pipeline = Arc::new(TranscriptPipeline::new(&config)?);
            yt_transcript_extractor::server::serve(pipeline, &config.server.host, config.server.port).await?;
        }
        Commands::Config { show } => {
            let config = loaded?;
            if show {
                config.display();
            } else {
                let path = match cli.config {
                    Some(path) => path,
                    None => Config::config_path()?,
                };
                println!("Configuration file: {}", path.display());
            }
        }
        Commands::Methods => {
            let config = loaded?;
            let pipeline = TranscriptPipeline::new(&config)?;

            println!("Extraction methods (in order):");
            for (position, extractor) in pipeline.registry().iter().enumerate() {
                let state = if extractor.is_available().await {
                    "available"
                } else {
                    "unavailable"
                };
                println!("  {}. {} ({})", position + 1, extractor.name(), state);
            }

            let missing_deps = utils::check_dependencies(&config.extraction).await;
            if !missing_deps.is_empty() {
                println!();
                println!("Missing dependencies:");
                for dep in missing_deps {
                    println!("  • {}", dep);
                }
            }
        }
    }

    Ok(())
}

/// Run one extraction; `Ok(false)` means every method failed and the result was already written
async fn run_extract(
    mut config: Config,
    video: &str,
    cookies: Option<PathBuf>,
    methods: Vec<StrategyKind>,
    output: Option<&Path>,
    format: &OutputFormat,
    show_progress: bool,
) -> Result<bool> {
    if let Some(path) = cookies {
        config.extraction.use_cookies = true;
        config.extraction.cookie_file = Some(path);
    }
    if !methods.is_empty() {
        config.extraction.strategies = methods;
    }
    config.validate()?;

    let video_id = VideoId::resolve(video)?;
    let pipeline = TranscriptPipeline::new(&config)?;

    let progress = show_progress.then(|| {
        let progress = ProgressBar::new_spinner();
        progress.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        progress.enable_steady_tick(Duration::from_millis(100));
        progress
    });

    let result = pipeline
        .extract_video_with(&video_id, |method| {
            if let Some(progress) = &progress {
                progress.set_message(format!("Trying {} for {}", method, video_id));
            }
        })
        .await;

    if let Some(progress) = progress {
        progress.finish_and_clear();
    }

    let result = result?;

    match output {
        Some(path) => {
            output::save_to_file(&result, path, format).await?;
            eprintln!("Result saved to: {}", path.display());
        }
        None => output::print_to_console(&result, format)?,
    }

    Ok(result.success)
}

/// Any error before or during extraction still produces a failure report
fn report_failure(error: &anyhow::Error, format: &OutputFormat) {
    let message = format!("{:#}", error);
    tracing::error!("{}", message);

    match format {
        OutputFormat::Json => match output::format_as_json(&FailureReport::new(&message)) {
            Ok(json) => println!("{}", json),
            Err(_) => eprintln!("{}", message),
        },
        OutputFormat::Text => eprintln!("{}", message),
    }
}

fn init_tracing(cli: &Cli) {
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "yt_transcript_extractor={level},yt_transcript={level}",
            level = default_level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
