use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use terminus::config::{EpochConfig, load_scenario};
use terminus::core::time::format_epoch;
use terminus::core::units::rad_to_deg;
use terminus::export::{points as export_points, summary as export_summary};
use terminus::terminator::{TerminatorContext, find_terminator_points};
use tracing::{Level, info};

/// Compute umbral or penumbral terminator points for a scenario.
#[derive(Parser, Debug)]
#[command(author, version, about = "Terminator point finder")]
struct Cli {
    /// Scenario file (YAML, or TOML with a .toml extension)
    #[arg(long)]
    scenario: PathBuf,

    /// Method string, e.g. "UMBRAL/TANGENT/ELLIPSOID"
    #[arg(long)]
    method: Option<String>,

    /// Illumination source name or code
    #[arg(long)]
    source: Option<String>,

    /// Target name or code
    #[arg(long)]
    target: Option<String>,

    /// Observer name or code
    #[arg(long)]
    observer: Option<String>,

    /// Body-fixed frame centered on the target
    #[arg(long)]
    frame: Option<String>,

    /// Observation epoch (ET seconds or TDB calendar string)
    #[arg(long)]
    epoch: Option<String>,

    /// Aberration correction: NONE, LT, LT+S, CN, CN+S
    #[arg(long)]
    abcorr: Option<String>,

    /// Correction locus: CENTER or "ELLIPSOID TERMINATOR"
    #[arg(long)]
    locus: Option<String>,

    /// Reference vector defining the first cut, as x,y,z
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    refvec: Option<Vec<f64>>,

    /// Number of cutting half-planes
    #[arg(long)]
    cuts: Option<usize>,

    /// Roll step between cuts in degrees (defaults to 360/cuts)
    #[arg(long)]
    roll_step_deg: Option<f64>,

    /// DSK bracketing step (radians)
    #[arg(long)]
    search_step: Option<f64>,

    /// DSK convergence tolerance (radians)
    #[arg(long)]
    tolerance: Option<f64>,

    /// Maximum number of terminator points
    #[arg(long)]
    max_points: Option<usize>,

    /// Write every point to this CSV file (use '-' for stdout)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write a JSON summary to this file
    #[arg(long)]
    json: Option<PathBuf>,

    /// Log level written to stderr (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: Level,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    let mut config = load_scenario(&cli.scenario)
        .with_context(|| format!("loading scenario {}", cli.scenario.display()))?;
    let overrides = &mut config.request;
    if let Some(method) = &cli.method {
        overrides.method = method.clone();
    }
    if let Some(source) = &cli.source {
        overrides.illumination_source = source.clone();
    }
    if let Some(target) = &cli.target {
        overrides.target = target.clone();
    }
    if let Some(observer) = &cli.observer {
        overrides.observer = observer.clone();
    }
    if let Some(frame) = &cli.frame {
        overrides.frame = frame.clone();
    }
    if let Some(epoch) = &cli.epoch {
        overrides.epoch = EpochConfig::Calendar(epoch.clone());
    }
    if let Some(abcorr) = &cli.abcorr {
        overrides.aberration_correction = abcorr.clone();
    }
    if let Some(locus) = &cli.locus {
        overrides.locus = locus.clone();
    }
    if let Some(refvec) = &cli.refvec {
        let [x, y, z] = refvec[..] else {
            bail!("--refvec expects three components, got {}", refvec.len());
        };
        overrides.reference_vector = [x, y, z];
    }
    if let Some(cuts) = cli.cuts {
        overrides.cut_count = cuts;
        overrides.roll_step_deg = None;
    }
    if let Some(step) = cli.roll_step_deg {
        overrides.roll_step_deg = Some(step);
    }
    if let Some(step) = cli.search_step {
        overrides.search_step = Some(step);
    }
    if let Some(tolerance) = cli.tolerance {
        overrides.solution_tolerance = Some(tolerance);
    }
    if let Some(max_points) = cli.max_points {
        overrides.max_points = Some(max_points);
    }

    let scenario = config.build()?;
    let request = &scenario.request;
    let context = TerminatorContext::new(&scenario.ephemeris).with_surfaces(&scenario.surfaces);
    info!(scenario = ?scenario.name, "running terminator search");
    let table = find_terminator_points(&context, request)?;

    let method = request.method.to_string();
    let source = request.illumination_source.to_string();
    let target = request.target.to_string();
    let observer = request.observer.to_string();
    let correction = request.aberration_correction.to_string();
    let locus = request.locus.to_string();

    println!();
    if let Some(name) = &scenario.name {
        println!("Scenario:       {name}");
    }
    println!("Method:         {method}");
    println!("Light source:   {source}");
    println!("Observer:       {observer}");
    println!("Target:         {target}");
    println!("Frame:          {}", request.frame);
    println!("Epoch:          {}", format_epoch(request.epoch));
    println!("Correction:     {correction} ({locus})");
    println!();
    println!("Number of cuts: {}", table.len());

    for row in table.rows() {
        println!();
        println!("  Roll angle (deg) = {:21.9}", rad_to_deg(row.roll()));
        println!("     Target epoch  = {:21.9}", row.target_epoch);
        println!(
            "     Number of terminator points at this roll angle: {}",
            row.len()
        );
        println!("      Terminator points");
        for point in &row.points {
            let p = point.position;
            println!("        {:20.9} {:20.9} {:20.9}", p[0], p[1], p[2]);
        }
    }

    if let Some(path) = &cli.csv {
        let mut writer = export_points::writer_for_path(path)?;
        export_points::write_table(writer.as_mut(), &table)?;
    }
    if let Some(path) = &cli.json {
        let meta = export_summary::Metadata {
            scenario: scenario.name.as_deref(),
            method: &method,
            illumination_source: &source,
            target: &target,
            observer: &observer,
            frame: &request.frame,
            epoch: request.epoch,
            aberration_correction: &correction,
            locus: &locus,
        };
        export_summary::write_summary(path, &meta, &table)?;
    }

    Ok(())
}
