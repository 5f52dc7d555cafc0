use std::time::Instant;

use clap::Parser;
use tracing::{debug, error, info, warn};

use zano_log::{LogConfig, init_logging};

mod config;
use config::ClientConfig;

mod demo;

mod renderer;
use renderer::TracingRenderer;

const VERSION: &str = "0.1.0";

/// Zano Client - headless frame driver for scripted objects
#[derive(Parser, Debug)]
#[command(name = "zano_client")]
#[command(author = "Zano Project")]
#[command(version = VERSION)]
#[command(about = "Zano headless frame driver", long_about = None)]
struct Args {
    /// Path to configuration file (JSON)
    #[arg(short, long, env = "ZANO_CONFIG")]
    config: Option<String>,

    /// Lua script controlling the demo object (overrides config)
    #[arg(short, long)]
    script: Option<String>,

    /// Number of frames to simulate (overrides config)
    #[arg(short, long)]
    frames: Option<u64>,

    /// Simulated frames per second (overrides config)
    #[arg(long)]
    fps: Option<u32>,

    /// Per-call script time budget in milliseconds (overrides config)
    #[arg(long)]
    budget_ms: Option<u64>,

    /// Log level: trace, debug, info, warn, error (overrides config)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Also write logs to this file
    #[arg(long, env = "ZANO_LOG_FILE")]
    log_file: Option<String>,
}

/// Load the config file (if any), apply command line overrides and validate
fn load_config(args: &Args) -> config::Result<ClientConfig> {
    let mut config = match &args.config {
        Some(path) => ClientConfig::from_json_file(path)?,
        None => ClientConfig::default(),
    };

    if let Some(script) = &args.script {
        config.script = Some(script.clone());
    }
    if let Some(frames) = args.frames {
        config.frames = frames;
    }
    if let Some(fps) = args.fps {
        config.fps = fps;
    }
    if let Some(budget_ms) = args.budget_ms {
        config.script_budget_ms = Some(budget_ms);
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }

    config.validate()?;
    Ok(config)
}

fn main() {
    let args = Args::parse();

    // We can't log errors yet, so we use eprintln! for early failures
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let log_level = config.level().unwrap_or(tracing::Level::INFO);
    let log_config = match &args.log_file {
        Some(path) => match std::fs::File::create(path) {
            Ok(file) => LogConfig::new("zano_client::")
                .with_level(log_level)
                .with_log_file(file),
            Err(e) => {
                eprintln!("Unable to create log file '{}': {}", path, e);
                std::process::exit(1);
            }
        },
        None => LogConfig::<std::fs::File>::new("zano_client::").with_level(log_level),
    };

    if let Err(e) = init_logging(log_config) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Zano Client v{}", VERSION);
    if let Some(path) = &args.config {
        info!("Configuration: {}", path);
    }

    debug!("Settings:");
    debug!("  Object: {}", config.object_name);
    debug!(
        "  Script: {}",
        config.script.as_deref().unwrap_or("<bundled sprite controller>")
    );
    debug!("  Frames: {} @ {} fps", config.frames, config.fps);
    debug!("  Script budget: {:?}", config.script_config().max_call_duration());
    debug!("  Log Level: {}", config.log_level);

    let instance = match demo::build_demo_object(&config) {
        Ok(instance) => instance,
        Err(e) => {
            error!("Failed to build demo object. {}", e);
            std::process::exit(1);
        }
    };
    info!("Lua scripting demo initialized!");

    let mut renderer = TracingRenderer::new();
    let started = Instant::now();
    let time = demo::run_frames(&instance, config.frames, config.frame_delta(), &mut renderer);

    info!(
        "Simulated {} frames ({:.2}s of game time) in {:?}, {} draw calls",
        config.frames,
        time.total,
        started.elapsed(),
        renderer.draws()
    );
    match renderer.last() {
        Some(last) => debug!(
            "Last draw: position={} rotation={:.2} layer={}",
            last.position, last.rotation, last.layer
        ),
        None => warn!("Nothing was drawn; check that the object has a transform and a textured sprite"),
    }

    instance.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_defaults() {
        let args = Args::try_parse_from([
            "zano_client",
            "--frames",
            "5",
            "--fps",
            "30",
            "--budget-ms",
            "20",
            "-l",
            "debug",
            "-s",
            "scripts/other.lua",
        ])
        .unwrap();

        let config = load_config(&args).unwrap();

        assert_eq!(config.frames, 5);
        assert_eq!(config.fps, 30);
        assert_eq!(config.script_budget_ms, Some(20));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.script.as_deref(), Some("scripts/other.lua"));
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.json");
        std::fs::write(&path, r#"{"frames": 3, "object_name": "hero"}"#).unwrap();
        let path = path.display().to_string();

        let args = Args::try_parse_from(["zano_client", "-c", &path, "-f", "7"]).unwrap();
        let config = load_config(&args).unwrap();

        assert_eq!(config.frames, 7);
        assert_eq!(config.object_name, "hero");
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let args = Args::try_parse_from(["zano_client", "--fps", "0"]).unwrap();
        assert!(load_config(&args).is_err());

        let args = Args::try_parse_from(["zano_client", "--budget-ms", "0"]).unwrap();
        assert!(load_config(&args).is_err());
    }
}
