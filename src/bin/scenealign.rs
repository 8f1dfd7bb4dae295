use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scenealign::{
    AutomationBackend as _, ConvergenceController, DiscrepancyLocalizer, FrameAcquirer,
    ObsClient, RasterImage, RunConfig, RunOutcome, Termination,
};

/// Exit status when the iteration budget ran out before converging.
const EXIT_EXHAUSTED: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "scenealign", version)]
struct Cli {
    /// Log at debug level (`RUST_LOG` takes precedence when set).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Converge the tracked sources onto the reference layout.
    Align(AlignArgs),
    /// Compare two image files offline and print the score and discrepancy.
    Score(ScoreArgs),
    /// Save one capture of the composited output as PNG.
    Capture(CaptureArgs),
}

#[derive(Parser, Debug)]
struct AlignArgs {
    /// Run configuration JSON.
    #[arg(long)]
    config: PathBuf,

    /// Override the scene name.
    #[arg(long)]
    scene: Option<String>,

    /// Override the tracked sources (repeatable).
    #[arg(long = "source")]
    sources: Vec<String>,

    /// Override the reference image.
    #[arg(long)]
    reference: Option<PathBuf>,

    /// Override the iteration budget.
    #[arg(long)]
    max_iterations: Option<u32>,

    /// Override the similarity threshold.
    #[arg(long)]
    threshold: Option<f64>,

    /// Override the adjustment step.
    #[arg(long)]
    step: Option<f64>,

    /// Override the difference intensity threshold.
    #[arg(long)]
    diff_threshold: Option<u8>,

    /// Override the settle delay between iterations, in milliseconds.
    #[arg(long)]
    settle_ms: Option<u64>,

    /// Write each captured frame and difference mask into this directory.
    #[arg(long)]
    dump_dir: Option<PathBuf>,

    /// Override the backend host.
    #[arg(long)]
    host: Option<String>,

    /// Override the backend port.
    #[arg(long)]
    port: Option<u16>,

    /// Print the run outcome as JSON on stdout.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct ScoreArgs {
    /// Reference image.
    #[arg(long)]
    reference: PathBuf,

    /// Image to compare against the reference.
    #[arg(long)]
    candidate: PathBuf,

    /// Difference intensity threshold.
    #[arg(long, default_value_t = 50)]
    diff_threshold: u8,

    /// Write the difference mask as PNG.
    #[arg(long)]
    mask_out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct CaptureArgs {
    /// Run configuration JSON (connection and capture source).
    #[arg(long)]
    config: PathBuf,

    /// Capture this source instead of the configured one.
    #[arg(long)]
    source: Option<String>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Align(args) => cmd_align(args),
        Command::Score(args) => cmd_score(args),
        Command::Capture(args) => cmd_capture(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &Path) -> anyhow::Result<RunConfig> {
    let mut cfg =
        RunConfig::from_path(path).with_context(|| format!("load config '{}'", path.display()))?;
    cfg.connection.password_from_env();
    Ok(cfg)
}

fn cmd_align(args: AlignArgs) -> anyhow::Result<ExitCode> {
    let mut cfg = load_config(&args.config)?;
    if let Some(scene) = args.scene {
        cfg.scene = scene;
    }
    if !args.sources.is_empty() {
        cfg.sources = args.sources;
    }
    if let Some(reference) = args.reference {
        cfg.reference = reference;
    }
    if let Some(n) = args.max_iterations {
        cfg.max_iterations = n;
    }
    if let Some(t) = args.threshold {
        cfg.similarity_threshold = t;
    }
    if let Some(s) = args.step {
        cfg.adjustment_step = s;
    }
    if let Some(d) = args.diff_threshold {
        cfg.diff_threshold = d;
    }
    if let Some(ms) = args.settle_ms {
        cfg.settle_delay_ms = ms;
    }
    if let Some(dir) = args.dump_dir {
        cfg.dump_dir = Some(dir);
    }
    if let Some(host) = args.host {
        cfg.connection.host = host;
    }
    if let Some(port) = args.port {
        cfg.connection.port = port;
    }

    cfg.connection.validate()?;
    let controller = ConvergenceController::from_config(cfg)?;
    let outcome = controller.run(|| ObsClient::connect(&controller.config().connection))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }

    Ok(match outcome.termination {
        Termination::Converged { .. } => ExitCode::SUCCESS,
        Termination::Exhausted => ExitCode::from(EXIT_EXHAUSTED),
    })
}

fn print_outcome(outcome: &RunOutcome) {
    match outcome.termination {
        Termination::Converged { iteration } => println!(
            "converged at iteration {iteration} with score {:.4}",
            outcome.score
        ),
        Termination::Exhausted => println!(
            "stopped after {} iterations with score {:.4}",
            outcome.captures, outcome.score
        ),
    }
    for (name, t) in &outcome.transforms {
        println!(
            "  {name}: position ({:.1}, {:.1}) scale ({:.3}, {:.3})",
            t.position_x, t.position_y, t.scale_x, t.scale_y
        );
    }
}

fn cmd_score(args: ScoreArgs) -> anyhow::Result<ExitCode> {
    let reference = RasterImage::open(&args.reference)
        .with_context(|| format!("load reference '{}'", args.reference.display()))?;
    let candidate = RasterImage::open(&args.candidate)
        .with_context(|| format!("load candidate '{}'", args.candidate.display()))?;

    let (score, report) = scenealign::compare_frames(&reference, &candidate, args.diff_threshold);
    println!("score: {score:.6}");
    match report {
        Some(r) => {
            println!("centroid: ({:.2}, {:.2})", r.centroid.x, r.centroid.y);
            println!("spread: ({:.2}, {:.2})", r.spread_x(), r.spread_y());
            println!("area: {}", r.area);
        }
        None => println!("no discrepancy"),
    }

    if let Some(out) = args.mask_out {
        let mask =
            DiscrepancyLocalizer::new(args.diff_threshold).difference_mask(&reference, &candidate);
        scenealign::save_png(&mask, &out)?;
        eprintln!("wrote {}", out.display());
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_capture(args: CaptureArgs) -> anyhow::Result<ExitCode> {
    let cfg = load_config(&args.config)?;
    let source = args
        .source
        .unwrap_or_else(|| cfg.capture_source().to_string());

    let mut client = ObsClient::connect(&cfg.connection)?;
    let captured = client
        .canvas_size()
        .and_then(|canvas| FrameAcquirer::new(source.as_str(), canvas).capture(&mut client));
    client.disconnect()?;

    let frame = captured?;
    frame.save_png(&args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(ExitCode::SUCCESS)
}
