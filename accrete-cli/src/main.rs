use accrete_core::{
    compute_forces_sequential, ConfigError, ForceEngine, RunConfig, Scenario, Simulation,
    SimulationResult, StepReport,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

mod camera;
mod viewer;

#[derive(Parser)]
#[command(name = "accrete")]
#[command(about = "Accrete - N-body gravity with inelastic merging", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Overrides applied on top of the configuration file
#[derive(clap::Args, Debug, Clone, Default)]
struct Overrides {
    /// Path to a JSON run configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of steps to run
    #[arg(long)]
    steps: Option<usize>,
    /// Force workers (1 = sequential)
    #[arg(long)]
    workers: Option<usize>,
    /// Gravitational constant
    #[arg(long)]
    gravity: Option<f32>,
    /// Replace the scenario with a seeded disk of this many bodies
    #[arg(long)]
    bodies: Option<usize>,
    /// Seed for the disk scenario (defaults to the file's seed, then 42)
    #[arg(long)]
    seed: Option<u64>,
}

const DEFAULT_SEED: u64 = 42;

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation headless and report progress
    Run {
        #[command(flatten)]
        overrides: Overrides,
        /// Print a status line every N steps
        #[arg(long, default_value_t = 100)]
        report_every: usize,
        /// Only print the final summary
        #[arg(short, long)]
        quiet: bool,
    },
    /// Time sequential against parallel force computation
    Bench {
        #[arg(long, default_value_t = 4096)]
        bodies: usize,
        #[arg(long, default_value_t = 10)]
        steps: usize,
        #[arg(long, default_value_t = 8)]
        workers: usize,
    },
    /// Write the default run configuration as JSON
    InitConfig {
        file: PathBuf,
    },
    /// Open an interactive view of the simulation
    View {
        #[command(flatten)]
        overrides: Overrides,
    },
}

fn main() {
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Run {
            overrides,
            report_every,
            quiet,
        } => run(&overrides, report_every, quiet),
        Commands::Bench {
            bodies,
            steps,
            workers,
        } => bench(bodies, steps, workers),
        Commands::InitConfig { file } => init_config(&file),
        Commands::View { overrides } => view(overrides),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Load the configuration file (or defaults) and apply command-line overrides
fn load_run_config(overrides: &Overrides) -> Result<RunConfig, Box<dyn std::error::Error>> {
    let mut run = match &overrides.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    apply_overrides(&mut run, overrides)?;
    Ok(run)
}

fn apply_overrides(run: &mut RunConfig, overrides: &Overrides) -> Result<(), ConfigError> {
    if let Some(steps) = overrides.steps {
        run.steps = steps;
    }
    if let Some(workers) = overrides.workers {
        run.sim.workers = workers;
    }
    if let Some(gravity) = overrides.gravity {
        run.sim.gravity = gravity;
    }
    if let Some(count) = overrides.bodies {
        let seed = overrides
            .seed
            .or_else(|| run.scenario.seed())
            .unwrap_or(DEFAULT_SEED);
        run.scenario = Scenario::Disk { count, seed };
    } else if let Some(seed) = overrides.seed {
        if !run.scenario.reseed(seed) {
            eprintln!("Warning: --seed ignored, the scenario is not a sampled disk");
        }
    }
    run.sim.validate()
}

fn run(overrides: &Overrides, report_every: usize, quiet: bool) -> Result<(), Box<dyn std::error::Error>> {
    let run = load_run_config(overrides)?;
    let mut sim = Simulation::from_run_config(&run)?;
    println!(
        "{} bodies, {} steps, {} workers, G = {:e}",
        sim.store().len(),
        run.steps,
        run.sim.workers,
        run.sim.gravity
    );

    let started = Instant::now();
    let mut lap = Instant::now();
    let report_every = report_every.max(1);
    let result = sim.run_with(|sim, report: &StepReport| {
        if quiet || sim.current_step % report_every != 0 {
            return;
        }
        let stats = sim.stats();
        let ms = lap.elapsed().as_secs_f64() * 1000.0 / report_every as f64;
        lap = Instant::now();
        println!(
            "step {:>6}  live {:>6}  merged {:>4}  clamped {:>4}  mass {:.6}  |p| {:.3e}  {:.2} ms/step",
            sim.current_step,
            report.live,
            report.merged_away,
            report.clamped,
            stats.total_mass,
            stats.momentum.length(),
            ms
        );
    })?;

    print_summary(&result, started.elapsed().as_secs_f64());
    Ok(())
}

fn print_summary(result: &SimulationResult, seconds: f64) {
    let stats = &result.stats;
    println!("steps          = {}", result.steps);
    println!("live bodies    = {}", stats.count);
    println!("merged away    = {}", result.merged_away);
    println!("total mass     = {:.6}", stats.total_mass);
    println!("momentum       = {:?}", stats.momentum.to_array());
    println!("centre of mass = {:?}", stats.center_of_mass.to_array());
    println!("kinetic energy = {:.6e}", stats.kinetic_energy);
    println!("radius max     = {:.6}", stats.radius_max);
    println!("elapsed        = {:.3} s", seconds);
}

fn bench(bodies: usize, steps: usize, workers: usize) -> Result<(), Box<dyn std::error::Error>> {
    let run = RunConfig {
        scenario: Scenario::Disk {
            count: bodies,
            seed: DEFAULT_SEED,
        },
        ..RunConfig::default()
    };
    let sim = Simulation::from_run_config(&run)?;
    let store = sim.store();
    let g = run.sim.gravity;
    let steps = steps.max(1);

    let started = Instant::now();
    let mut sequential = Vec::new();
    for _ in 0..steps {
        sequential = compute_forces_sequential(store.positions(), store.masses(), g);
    }
    let seq_ms = started.elapsed().as_secs_f64() * 1000.0 / steps as f64;

    let engine = ForceEngine::new(workers)?;
    let started = Instant::now();
    let mut chunked = Vec::new();
    for _ in 0..steps {
        chunked = engine.compute(store.positions(), store.masses(), g);
    }
    let par_ms = started.elapsed().as_secs_f64() * 1000.0 / steps as f64;

    // deviation relative to the largest force in the system
    let scale = sequential.iter().map(|f| f.length()).fold(0.0f32, f32::max).max(f32::MIN_POSITIVE);
    let max_deviation = sequential
        .iter()
        .zip(&chunked)
        .map(|(a, b)| (*a - *b).length() / scale)
        .fold(0.0f32, f32::max);

    println!("bodies          = {}", store.len());
    println!("sequential      = {:.3} ms/step", seq_ms);
    println!("parallel ({:>2})   = {:.3} ms/step", engine.workers(), par_ms);
    println!("speedup         = {:.2}x", seq_ms / par_ms.max(1e-9));
    println!("max deviation   = {:.3e} (relative)", max_deviation);
    Ok(())
}

fn init_config(file: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    RunConfig::default().save(file)?;
    println!("wrote {}", file.display());
    Ok(())
}

fn view(overrides: Overrides) -> Result<(), Box<dyn std::error::Error>> {
    let run = load_run_config(&overrides)?;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1000.0, 1000.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Accrete",
        options,
        Box::new(move |cc| Ok(Box::new(viewer::ViewerApp::new(run, overrides, cc)))),
    )?;
    Ok(())
}
