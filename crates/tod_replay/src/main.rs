//! TOD Checking replay CLI
//!
//! Runs a recorded distance-to-TOD trace through the plugin and reports
//! where the sim would have been paused.

#[cfg(feature = "cli")]
use anyhow::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "tod_replay")]
#[command(about = "Replay distance-to-TOD traces through the TOD Checking plugin", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Replay a CSV trace (columns: elapsed,distance)
    Run {
        /// Input CSV trace path
        #[arg(long)]
        trace: PathBuf,

        /// Log file the plugin writes to
        #[arg(long)]
        log: PathBuf,

        /// Sampler configuration JSON (defaults when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Simulated seconds per frame
        #[arg(long, default_value = "0.25")]
        frame_dt: f32,

        /// Stay paused after the first pause instead of resuming
        #[arg(long, default_value = "false")]
        hold_pause: bool,

        /// Print the summary as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Print the default sampler configuration as JSON
    Defaults,
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    use anyhow::Context;
    use tod_core::SamplerConfig;
    use tod_replay::{replay, ReplayOptions, Trace};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            trace,
            log,
            config,
            frame_dt,
            hold_pause,
            json,
        } => {
            let config = match config {
                Some(path) => SamplerConfig::from_path(&path)
                    .with_context(|| format!("Failed to load config: {}", path.display()))?,
                None => SamplerConfig::default(),
            };
            let trace = Trace::load(&trace)?;
            let options = ReplayOptions {
                frame_dt,
                auto_resume: !hold_pause,
            };

            let summary = replay(&trace, config, &log, options)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Replayed {:.1}s ({} frames, {} calls)", summary.sim_time, summary.frames, summary.calls);
                match &summary.log_path {
                    Some(path) if summary.log_open => println!("   Log:       {}", path.display()),
                    Some(path) => println!("   Log:       {} (unavailable)", path.display()),
                    None => println!("   Log:       none"),
                }
                for pause in &summary.pauses {
                    println!(
                        "   Pause:     t={:.1}s at {:.1} NM",
                        pause.elapsed, pause.reading
                    );
                }
                if let Some(threshold) = summary.final_threshold {
                    println!("   Threshold: {} NM", threshold);
                }
            }
        }
        Commands::Defaults => {
            println!("{}", serde_json::to_string_pretty(&SamplerConfig::default())?);
        }
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    std::process::exit(1);
}
