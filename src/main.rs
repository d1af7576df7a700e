use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use orbit_predict::catalog::{rank, Catalog, RankKey, Satellite};
use orbit_predict::config::Config;
use orbit_predict::orbit::{propagate, stream, TimeGrid};
use orbit_predict::report::{write_summary, write_trajectory_json};

#[derive(Parser)]
#[command(name = "orbit-predict")]
#[command(about = "Two-body satellite trajectory prediction")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a catalog and print its summary
    Validate { catalog: PathBuf },
    /// Propagate satellites and emit their trajectories
    Predict {
        /// YAML catalog or TLE directory (overrides the config file)
        catalog: Option<PathBuf>,
        #[arg(long)]
        config: Option<String>,
        /// Prediction window, e.g. "24h"
        #[arg(long)]
        duration: Option<String>,
        /// Sample spacing, e.g. "10m"
        #[arg(long)]
        resolution: Option<String>,
        #[arg(long)]
        smooth: Option<u32>,
        /// Only this satellite id
        #[arg(long)]
        satellite: Option<String>,
        /// Write <id>.json files here instead of JSON lines on stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Order satellites by a derived quantity
    Rank {
        catalog: PathBuf,
        #[arg(long, value_enum, default_value_t = RankField::MeanAltitude)]
        by: RankField,
        /// Offset from epoch for altitude-at, e.g. "45m"
        #[arg(long)]
        at: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RankField {
    MeanAltitude,
    PerigeeAltitude,
    ApogeeAltitude,
    Period,
    AltitudeAt,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { catalog } => validate(&catalog),
        Commands::Predict {
            catalog,
            config,
            duration,
            resolution,
            smooth,
            satellite,
            output,
        } => {
            let mut cfg = match config {
                Some(path) => match Config::from_file(&path) {
                    Ok(c) => c,
                    Err(e) => {
                        eprintln!("Config error: {}", e);
                        return ExitCode::FAILURE;
                    }
                },
                None => Config::default(),
            };
            if let Some(d) = duration {
                match humantime::parse_duration(&d) {
                    Ok(d) => cfg.prediction.duration = d,
                    Err(e) => {
                        eprintln!("Invalid duration '{}': {}", d, e);
                        return ExitCode::FAILURE;
                    }
                }
            }
            if let Some(r) = resolution {
                match humantime::parse_duration(&r) {
                    Ok(r) => cfg.prediction.resolution = r,
                    Err(e) => {
                        eprintln!("Invalid resolution '{}': {}", r, e);
                        return ExitCode::FAILURE;
                    }
                }
            }
            if let Some(s) = smooth {
                cfg.prediction.smooth_factor = s;
            }
            if catalog.is_some() {
                cfg.catalog = catalog;
            }
            if output.is_some() {
                cfg.output.directory = output;
            }
            predict(&cfg, satellite.as_deref())
        }
        Commands::Rank { catalog, by, at } => {
            let key = match rank_key(by, at.as_deref()) {
                Ok(k) => k,
                Err(e) => {
                    eprintln!("{}", e);
                    return ExitCode::FAILURE;
                }
            };
            rank_catalog(&catalog, key)
        }
    }
}

fn load(path: &Path) -> Option<Catalog> {
    match Catalog::load(path) {
        Ok(c) => Some(c),
        Err(e) => {
            eprintln!("Error loading catalog {}: {}", path.display(), e);
            None
        }
    }
}

fn validate(path: &Path) -> ExitCode {
    let Some(catalog) = load(path) else {
        return ExitCode::FAILURE;
    };

    println!("Catalog is valid ({} satellites)", catalog.len());
    let mut stdout = io::stdout().lock();
    if let Err(e) = write_summary(&mut stdout, catalog.satellites()) {
        eprintln!("Error writing summary: {}", e);
        return ExitCode::FAILURE;
    }
    for sat in catalog.satellites() {
        if !sat.elements.has_explicit_orientation() {
            log::info!(
                "{} has no RAAN/argument of perigee; perigee placed on the x-axis",
                sat.name
            );
        }
    }
    ExitCode::SUCCESS
}

fn predict(config: &Config, only: Option<&str>) -> ExitCode {
    let Some(path) = config.catalog.as_deref() else {
        eprintln!("No catalog given (argument or 'catalog' in config)");
        return ExitCode::FAILURE;
    };
    let Some(catalog) = load(path) else {
        return ExitCode::FAILURE;
    };

    let grid = match config.prediction.time_grid() {
        Ok(g) => g,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let selected: Vec<&Satellite> = match only {
        Some(id) => match catalog.find(id) {
            Ok(sat) => vec![sat],
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => catalog.satellites().iter().collect(),
    };

    log::info!(
        "Predicting {} satellites: {} samples each",
        selected.len(),
        grid.sample_count()
    );

    let mut failed = false;
    for sat in selected {
        let result = match &config.output.directory {
            Some(dir) => propagate(&sat.elements, grid)
                .map_err(|e| e.to_string())
                .and_then(|t| {
                    write_trajectory_json(dir, sat, &t)
                        .map(|_| ())
                        .map_err(|e| e.to_string())
                }),
            None => emit_json_lines(sat, grid),
        };
        if let Err(e) = result {
            eprintln!("{} ({}): {}", sat.name, sat.id, e);
            failed = true;
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn emit_json_lines(sat: &Satellite, grid: TimeGrid) -> Result<(), String> {
    let mut stdout = io::stdout().lock();
    for point in stream(&sat.elements, grid) {
        let point = point.map_err(|e| e.to_string())?;
        let line = serde_json::json!({ "id": sat.id, "point": point });
        writeln!(stdout, "{}", line).map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn rank_key(field: RankField, at: Option<&str>) -> Result<RankKey, String> {
    Ok(match field {
        RankField::MeanAltitude => RankKey::MeanAltitude,
        RankField::PerigeeAltitude => RankKey::PerigeeAltitude,
        RankField::ApogeeAltitude => RankKey::ApogeeAltitude,
        RankField::Period => RankKey::Period,
        RankField::AltitudeAt => {
            let at = at.ok_or("--at is required for altitude-at")?;
            let offset = humantime::parse_duration(at).map_err(|e| e.to_string())?;
            RankKey::AltitudeAt {
                offset_s: offset.as_secs_f64(),
            }
        }
    })
}

fn rank_catalog(path: &Path, key: RankKey) -> ExitCode {
    let Some(catalog) = load(path) else {
        return ExitCode::FAILURE;
    };

    match rank(catalog.into_satellites(), key) {
        Ok(ranked) => {
            println!("Ranked by {}", key);
            for (i, (sat, value)) in ranked.iter().enumerate() {
                println!("  {}: {} ({}) = {:.2}", i + 1, sat.name, sat.id, value);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Ranking error: {}", e);
            ExitCode::FAILURE
        }
    }
}
