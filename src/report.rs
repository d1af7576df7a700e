use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::catalog::Satellite;
use crate::orbit::{OrbitError, Trajectory};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Orbit(#[from] OrbitError),
}

/// One line of the catalog summary table.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    pub name: String,
    pub id: String,
    pub inclination_deg: f64,
    pub eccentricity: f64,
    pub semi_major_axis_km: f64,
    pub altitude_km: f64,
    pub perigee_altitude_km: f64,
    pub apogee_altitude_km: f64,
    pub period_min: f64,
    pub mean_anomaly_deg: f64,
}

impl SummaryRow {
    pub fn from_satellite(sat: &Satellite) -> Self {
        let el = &sat.elements;
        Self {
            name: sat.name.clone(),
            id: sat.id.clone(),
            inclination_deg: el.inclination_deg(),
            eccentricity: el.eccentricity(),
            semi_major_axis_km: el.semi_major_axis_km(),
            altitude_km: el.mean_altitude_km(),
            perigee_altitude_km: el.perigee_altitude_km(),
            apogee_altitude_km: el.apogee_altitude_km(),
            period_min: el.period_s() / 60.0,
            mean_anomaly_deg: el.mean_anomaly_deg(),
        }
    }
}

pub fn write_summary<W: Write>(out: &mut W, satellites: &[Satellite]) -> std::io::Result<()> {
    writeln!(
        out,
        "{:<20} {:>8} {:>9} {:>10} {:>10} {:>10} {:>10} {:>10} {:>9} {:>8}",
        "Name", "ID", "Inc(deg)", "Ecc", "SMA(km)", "Alt(km)", "Peri(km)", "Apo(km)", "T(min)", "M(deg)"
    )?;
    for sat in satellites {
        let row = SummaryRow::from_satellite(sat);
        writeln!(
            out,
            "{:<20} {:>8} {:>9.4} {:>10.6} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>9.2} {:>8.2}",
            row.name,
            row.id,
            row.inclination_deg,
            row.eccentricity,
            row.semi_major_axis_km,
            row.altitude_km,
            row.perigee_altitude_km,
            row.apogee_altitude_km,
            row.period_min,
            row.mean_anomaly_deg
        )?;
    }
    Ok(())
}

#[derive(Serialize)]
struct TrajectoryDocument<'a> {
    name: &'a str,
    id: &'a str,
    period_s: f64,
    trajectory: &'a Trajectory,
}

pub fn trajectory_json(sat: &Satellite, trajectory: &Trajectory) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(&TrajectoryDocument {
        name: &sat.name,
        id: &sat.id,
        period_s: sat.elements.period_s(),
        trajectory,
    })?)
}

/// Write `<dir>/<id>.json` and return its path.
pub fn write_trajectory_json(
    dir: &Path,
    sat: &Satellite,
    trajectory: &Trajectory,
) -> Result<PathBuf, ReportError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.json", sanitize(&sat.id)));
    fs::write(&path, trajectory_json(sat, trajectory)?)?;
    log::info!("Wrote {} samples for {} to {}", trajectory.len(), sat.name, path.display());
    Ok(path)
}

fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
