#![deny(unsafe_code)]
//! CLI binary for the cosmos animated background.
//!
//! Subcommands:
//! - `render [engine]` runs the frame loop headlessly and writes a PNG
//! - `inspect [engine]` builds a universe and prints its entities
//! - `list` prints available engines and themes

mod error;

use cosmos_core::prng::os_entropy;
use cosmos_core::{Config, CursorState, Engine, EngineError, FrameTime, Seed, Theme, Viewport};
use cosmos_engines::driver::{sanitize_dpr, FrameDriver, ManualScheduler};
use cosmos_engines::pixel::{backing_dims, PixelSurface};
use cosmos_engines::EngineKind;
use clap::{Args, Parser, Subcommand};
use error::CliError;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cosmos", about = "Animated cosmos background CLI")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Overrides applied on top of `--params`.
#[derive(Args, Debug, Clone)]
struct ConfigArgs {
    /// Seed for a reproducible layout. Omit for a random one.
    #[arg(long)]
    seed: Option<String>,

    /// Theme name (default, cool, warm, neon).
    #[arg(short, long)]
    theme: Option<String>,

    /// Velocity multiplier.
    #[arg(long)]
    speed: Option<f64>,

    /// Entity and particle count multiplier.
    #[arg(long)]
    density: Option<f64>,

    /// Black hole count and mass multiplier.
    #[arg(long)]
    black_holes: Option<f64>,

    /// Disable shooting stars.
    #[arg(long)]
    no_shooters: bool,

    /// Full config as a JSON object.
    #[arg(long, default_value = "{}")]
    params: String,
}

#[derive(Subcommand)]
enum Command {
    /// Run the frame loop for N frames and write a PNG snapshot.
    Render {
        /// Engine name.
        #[arg(default_value = "galaxy")]
        engine: String,

        /// Viewport width in CSS pixels.
        #[arg(short = 'W', long, default_value_t = 1280.0)]
        width: f64,

        /// Viewport height in CSS pixels.
        #[arg(short = 'H', long, default_value_t = 720.0)]
        height: f64,

        /// Device pixel ratio (values below 1 are raised to 1).
        #[arg(long, default_value_t = 1.0)]
        dpr: f64,

        /// Number of frames to run at the baseline frame interval.
        #[arg(short, long, default_value_t = 120)]
        frames: usize,

        /// Hold the cursor at `x,y` for every frame.
        #[arg(long, value_parser = parse_point)]
        cursor: Option<(f64, f64)>,

        /// Output file path.
        #[arg(short, long, default_value = "cosmos.png")]
        output: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Build a universe and print its entity counts and parameters.
    Inspect {
        /// Engine name.
        #[arg(default_value = "galaxy")]
        engine: String,

        /// Viewport width in CSS pixels.
        #[arg(short = 'W', long, default_value_t = 1280.0)]
        width: f64,

        /// Viewport height in CSS pixels.
        #[arg(short = 'H', long, default_value_t = 720.0)]
        height: f64,

        /// Frames to step before inspecting.
        #[arg(short, long, default_value_t = 0)]
        frames: usize,

        /// Include every entity in the output.
        #[arg(long)]
        layout: bool,

        #[command(flatten)]
        config: ConfigArgs,
    },
    /// List available engines and themes.
    List,
}

fn parse_point(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got '{s}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid coordinate '{v}': {e}"))
    };
    Ok((parse(x)?, parse(y)?))
}

/// Merges `--params` with the individual flags, flags winning.
fn build_config(args: &ConfigArgs) -> Result<Config, CliError> {
    let params: Value = serde_json::from_str(&args.params)
        .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
    let mut config = Config::try_from_json(&params)?;

    if let Some(seed) = &args.seed {
        config.seed = Seed::from_json(&Value::String(seed.clone()));
    }
    if let Some(theme) = &args.theme {
        config.theme = Theme::from_name(theme)?;
    }
    if let Some(speed) = args.speed {
        config.speed = positive("--speed", speed)?;
    }
    if let Some(density) = args.density {
        config.density = positive("--density", density)?;
    }
    if let Some(black_holes) = args.black_holes {
        config.black_holes = positive("--black-holes", black_holes)?;
    }
    if args.no_shooters {
        config.shooters = false;
    }
    Ok(config)
}

fn positive(flag: &str, value: f64) -> Result<f64, CliError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(CliError::Input(format!("{flag} must be positive, got {value}")))
    }
}

fn checked_viewport(width: f64, height: f64) -> Result<Viewport, CliError> {
    let viewport = Viewport::new(width, height);
    if !(width.is_finite() && height.is_finite()) || viewport.is_empty() {
        return Err(EngineError::InvalidDimensions.into());
    }
    Ok(viewport)
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let engines = EngineKind::list_engines();
            let themes = Theme::list_names();
            if cli.json {
                let info = json!({
                    "engines": engines,
                    "themes": themes,
                    "params": Config::param_schema(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Engines:");
                for name in engines {
                    println!("  {name}");
                }
                println!("Themes:");
                println!("  {}", themes.join(", "));
            }
        }
        Command::Render {
            engine,
            width,
            height,
            dpr,
            frames,
            cursor,
            output,
            config,
        } => {
            let config = build_config(&config)?;
            let viewport = checked_viewport(width, height)?;
            let driver = render(&engine, config, viewport, dpr, frames, cursor)?;
            cosmos_engines::snapshot::write_png(driver.surface(), &output)?;

            let counts = driver.engine().map(EngineKind::counts).unwrap_or(Value::Null);
            if cli.json {
                let info = json!({
                    "engine": engine,
                    "width": width,
                    "height": height,
                    "dpr": driver.dpr(),
                    "frames": frames,
                    "params": driver.config().params(),
                    "counts": counts,
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {engine} ({width}x{height} @{}x, {frames} frames) -> {}",
                    driver.dpr(),
                    output.display()
                );
            }
        }
        Command::Inspect {
            engine,
            width,
            height,
            frames,
            layout,
            config,
        } => {
            let config = build_config(&config)?;
            let viewport = checked_viewport(width, height)?;
            let mut eng = EngineKind::build(&engine, viewport, &config, os_entropy)?;
            let mut now = 0.0;
            for _ in 0..frames {
                let last = now;
                now += FrameTime::BASELINE_MS;
                eng.step(FrameTime::between(last, now), CursorState::default())?;
            }

            if cli.json {
                let mut info = json!({
                    "engine": engine,
                    "viewport": eng.viewport(),
                    "frames": frames,
                    "params": eng.params(),
                    "counts": eng.counts(),
                });
                if layout {
                    info["layout"] = eng.layout();
                }
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("{engine} at {width}x{height} after {frames} frames");
                if let Some(counts) = eng.counts().as_object() {
                    for (name, count) in counts {
                        println!("  {name}: {count}");
                    }
                }
                if layout {
                    println!("{}", serde_json::to_string_pretty(&eng.layout())?);
                }
            }
        }
    }

    Ok(())
}

/// Mounts a driver on a CPU surface and pumps `frames` scheduled frames.
fn render(
    engine: &str,
    config: Config,
    viewport: Viewport,
    dpr: f64,
    frames: usize,
    cursor: Option<(f64, f64)>,
) -> Result<FrameDriver<PixelSurface, ManualScheduler>, CliError> {
    if backing_dims(viewport.width, viewport.height, sanitize_dpr(dpr)).is_none() {
        return Err(EngineError::InvalidDimensions.into());
    }
    let mut driver = FrameDriver::new(
        engine,
        config,
        PixelSurface::default(),
        ManualScheduler::new(),
        os_entropy,
    )?;
    driver.mount(viewport, dpr)?;
    if let Some((x, y)) = cursor {
        driver.pointer_move(x, y);
    }

    for frame in 0..frames {
        if !driver.scheduler_mut().take() {
            break;
        }
        driver.on_frame(frame as f64 * FrameTime::BASELINE_MS);
    }
    debug!(requests = driver.scheduler().requests(), "frame loop finished");
    info!(frames, "rendered");
    Ok(driver)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("cosmos").chain(args.iter().copied())).unwrap()
    }

    fn config_args(cli: Cli) -> ConfigArgs {
        match cli.command {
            Command::Render { config, .. } | Command::Inspect { config, .. } => config,
            Command::List => panic!("no config on list"),
        }
    }

    #[test]
    fn render_defaults_to_galaxy() {
        match parse(&["render"]).command {
            Command::Render {
                engine,
                width,
                height,
                frames,
                ..
            } => {
                assert_eq!(engine, "galaxy");
                assert_eq!((width, height), (1280.0, 720.0));
                assert_eq!(frames, 120);
            }
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn flags_override_params_json() {
        let cli = parse(&[
            "inspect",
            "--params",
            r#"{"theme":"warm","speed":2,"seed":"a"}"#,
            "--theme",
            "neon",
            "--seed",
            "b",
            "--no-shooters",
        ]);
        let config = build_config(&config_args(cli)).unwrap();
        assert_eq!(config.theme, Theme::Neon);
        assert_eq!(config.seed, Some(Seed::from("b")));
        assert_eq!(config.speed, 2.0);
        assert!(!config.shooters);
    }

    #[test]
    fn unknown_theme_is_rejected() {
        let cli = parse(&["inspect", "--theme", "sepia"]);
        let err = build_config(&config_args(cli)).unwrap_err();
        assert_eq!(err.exit_code(), 12);

        let cli = parse(&["inspect", "--params", r#"{"theme":"sepia"}"#]);
        assert!(build_config(&config_args(cli)).is_err());
    }

    #[test]
    fn non_positive_multiplier_is_rejected() {
        let cli = parse(&["inspect", "--density", "0"]);
        assert!(matches!(
            build_config(&config_args(cli)),
            Err(CliError::Input(_))
        ));
    }

    #[test]
    fn bad_params_json_is_an_input_error() {
        let cli = parse(&["inspect", "--params", "{oops"]);
        assert_eq!(build_config(&config_args(cli)).unwrap_err().exit_code(), 12);
        let cli = parse(&["inspect", "--params", "[1,2]"]);
        assert_eq!(build_config(&config_args(cli)).unwrap_err().exit_code(), 12);
        let cli = parse(&["inspect", "--params", r#"{"sped":2}"#]);
        assert_eq!(build_config(&config_args(cli)).unwrap_err().exit_code(), 12);
    }

    #[test]
    fn cursor_point_parses() {
        assert_eq!(parse_point("10, 20.5"), Ok((10.0, 20.5)));
        assert!(parse_point("10").is_err());
        assert!(parse_point("a,b").is_err());
    }

    #[test]
    fn empty_viewport_is_rejected() {
        assert!(matches!(checked_viewport(0.0, 100.0), Err(CliError::Engine(_))));
        assert!(checked_viewport(f64::NAN, 100.0).is_err());
        assert!(checked_viewport(64.0, 48.0).is_ok());
    }

    #[test]
    fn render_pumps_frames_and_draws() {
        let config = Config {
            seed: Some(Seed::from("cli")),
            ..Config::default()
        };
        let driver = render("galaxy", config, Viewport::new(64.0, 48.0), 2.0, 5, None).unwrap();
        assert!(driver.is_running());
        assert_eq!(driver.scheduler().requests(), 6);
        assert_eq!(driver.surface().width(), 128);
        let corner = driver.surface().pixel(0, 0).unwrap();
        assert!(corner.a > 0.99, "background should be opaque: {corner:?}");
    }

    #[test]
    fn render_rejects_oversized_surface() {
        let result = render("galaxy", Config::default(), Viewport::new(8000.0, 8000.0), 1.0, 1, None);
        assert!(matches!(
            result,
            Err(CliError::Engine(EngineError::InvalidDimensions))
        ));
        let cli = parse(&["render", "-W", "4000", "-H", "3000", "--dpr", "2"]);
        assert_eq!(run(cli).unwrap_err().exit_code(), 10);
    }

    #[test]
    fn render_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.png");
        let cli = parse(&[
            "render",
            "-W",
            "40",
            "-H",
            "30",
            "--frames",
            "3",
            "--seed",
            "png",
            "-o",
            output.to_str().unwrap(),
        ]);
        run(cli).unwrap();
        assert!(output.exists());
    }

    #[test]
    fn unknown_engine_exits_with_engine_code() {
        let cli = parse(&["inspect", "nebula"]);
        assert_eq!(run(cli).unwrap_err().exit_code(), 10);
    }
}
