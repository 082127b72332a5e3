//! Meter Simulation Demo
//!
//! Drives an excitement meter at a fixed frame rate from a RON preset and
//! prints the status board once per simulated second.
//!
//! Usage: `meter_sim [--preset FILE] [--name NAME] [--seconds N] [--fps F] [--seed S] [--reset-at T] [--save FILE]`

use clap::Parser;
use excite_core::{EventId, LogAction, Meter, MeterConfig, MeterState};
use excite_script::{write_file, Loader, PresetDef};
use indexmap::IndexMap;
use std::path::PathBuf;
use std::process;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

const BUILTIN: &str = r#"
(
    name: "builtin",
    description: "Five steps from calm to climax",
    config: (
        fill: (base_fill_time: 90.0, randomness: 0.3),
        interval: (min: 3.0, max: 6.0),
        eligibility: (weighting: Decay(decay: 0.5), max_age: 500.0),
    ),
    playing: true,
    events: [
        (threshold: 0.0, action: "murmur"),
        (threshold: 200.0, action: "hum"),
        (threshold: 450.0, action: "chant"),
        (threshold: 700.0, weight: Some(0.8), action: "roar"),
        (threshold: 900.0, action: "thunder"),
    ],
    climax: "finale",
)
"#;

#[derive(Parser, Debug)]
#[command(name = "meter_sim")]
#[command(about = "Run an excitement meter preset at a fixed frame rate")]
struct Args {
    /// RON file with one or more presets; uses a built-in preset when absent
    #[arg(long)]
    preset: Option<PathBuf>,

    /// Preset to run when the file holds several; defaults to the first
    #[arg(long)]
    name: Option<String>,

    /// Simulated seconds to run
    #[arg(long, default_value_t = 120.0)]
    seconds: f64,

    /// Frames per simulated second
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Reset the meter at this simulated time
    #[arg(long = "reset-at")]
    reset_at: Option<f64>,

    /// Write the final meter setup as a preset
    #[arg(long)]
    save: Option<PathBuf>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,excite_core=info,meter_sim=info"));

    fmt().with_env_filter(filter).with_target(false).init();
}

fn load_preset(args: &Args) -> Result<PresetDef, String> {
    let mut loader = Loader::new();
    let loaded = match &args.preset {
        Some(path) => loader.load_file(path),
        None => loader.load_str(BUILTIN).map(|_| ()),
    };
    loaded.map_err(|e| e.to_string())?;

    let defs = loader.finish();
    let preset = match &args.name {
        Some(name) => defs.get(name),
        None => defs.presets.values().next(),
    };
    preset
        .cloned()
        .ok_or_else(|| format!("preset not found: {}", args.name.as_deref().unwrap_or("<first>")))
}

fn main() {
    init_logging();
    let args = Args::parse();

    if !(args.fps > 0.0 && args.fps.is_finite()) {
        error!(fps = args.fps, "frame rate must be positive");
        process::exit(2);
    }

    let preset = match load_preset(&args) {
        Ok(preset) => preset,
        Err(e) => {
            error!("Failed to load preset: {}", e);
            process::exit(1);
        }
    };

    println!("=== Excite Meter Simulation: {} ===", preset.name);
    if !preset.description.is_empty() {
        println!("{}", preset.description);
    }
    println!();

    let mut meter = Meter::with_seed(MeterConfig::default(), args.seed);
    if let Err(e) = meter.restore(&preset.to_snapshot(), LogAction::from_blob) {
        error!("Failed to restore preset: {}", e);
        process::exit(1);
    }
    meter.set_playing(true);

    let dt = 1.0 / args.fps;
    let frames = (args.seconds * args.fps).round().max(0.0) as u64;
    let frames_per_second = args.fps.round().max(1.0) as u64;
    let reset_frame = args.reset_at.map(|t| (t * args.fps).round().max(0.0) as u64);

    let mut fired: IndexMap<EventId, u64> = meter.registry().ids().map(|id| (id, 0)).collect();
    let mut attempts = 0u64;
    let mut climaxes = 0u64;

    info!(frames, dt, "simulation started");
    for frame in 0..frames {
        if reset_frame == Some(frame) {
            println!("-- reset at {:.1}s --", frame as f64 * dt);
            meter.reset();
        }

        let report = meter.tick(dt);
        if report.attempted {
            attempts += 1;
        }
        if let Some(id) = report.fired {
            *fired.entry(id).or_insert(0) += 1;
        }
        if report.climax {
            climaxes += 1;
            println!("** climax at {:.1}s **", (frame + 1) as f64 * dt);
        }

        if (frame + 1) % frames_per_second == 0 {
            println!(
                "t={:>5.1}s  excitement={:>6.1}  state={:?}",
                (frame + 1) as f64 * dt,
                meter.excitement(),
                meter.state()
            );
            println!("{}\n", meter.status().text());
        }
    }

    println!("=== Summary ===");
    println!("Attempts: {}", attempts);
    for (id, count) in &fired {
        let label = meter.registry().label(*id).unwrap_or_else(|| id.to_string());
        let threshold = meter.registry().get(*id).map(|e| e.threshold()).unwrap_or(0.0);
        println!("  {:<10} threshold {:>6.1}: fired {} times", label, threshold, count);
    }
    println!("Climaxes: {}", climaxes);
    println!(
        "Final excitement: {:.1} ({})",
        meter.excitement(),
        if meter.state() == MeterState::Saturated { "saturated" } else { "charging" }
    );

    if let Some(path) = &args.save {
        let saved = PresetDef {
            description: preset.description.clone(),
            ..PresetDef::from_snapshot(preset.name.clone(), &meter.snapshot())
        };
        match write_file(path, &saved) {
            Ok(()) => println!("Saved preset to {}", path.display()),
            Err(e) => {
                error!("Failed to save preset: {}", e);
                process::exit(1);
            }
        }
    }
}
