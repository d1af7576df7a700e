use std::fs;
use std::path::{Path, PathBuf};

use sgp4::Elements;

use crate::catalog::error::CatalogError;
use crate::catalog::satellite::Satellite;
use crate::orbit::ElementRecord;

/// Reads classical elements out of TLE files.
///
/// Only the mean elements are taken from each set; propagation stays with
/// the two-body engine.
pub struct TleLoader {
    tle_dir: PathBuf,
}

impl TleLoader {
    pub fn new(tle_dir: PathBuf) -> Self {
        Self { tle_dir }
    }

    /// Load every `.tle`/`.txt` file in the directory.
    pub fn load_all(&self) -> Result<Vec<Satellite>, CatalogError> {
        if !self.tle_dir.is_dir() {
            return Err(CatalogError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("TLE directory not found: {}", self.tle_dir.display()),
            )));
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.tle_dir)? {
            let path = entry?.path();
            let is_tle = path
                .extension()
                .map(|ext| ext == "tle" || ext == "txt")
                .unwrap_or(false);
            if path.is_file() && is_tle {
                paths.push(path);
            }
        }
        paths.sort();

        let mut satellites: Vec<Satellite> = Vec::new();
        for path in paths {
            let records = match parse_tle_file(&path) {
                Ok(records) => records,
                Err(e) => {
                    log::warn!("Failed to parse TLE file {}: {}", path.display(), e);
                    continue;
                }
            };
            for record in records {
                match Satellite::from_record(&record) {
                    Ok(sat) if satellites.iter().any(|s| s.same_object(&sat)) => {
                        log::debug!("Replacing elements for NORAD {}", sat.id);
                        satellites.retain(|s| !s.same_object(&sat));
                        satellites.push(sat);
                    }
                    Ok(sat) => satellites.push(sat),
                    Err(e) => log::warn!("Skipping {} from {}: {}", record.name, path.display(), e),
                }
            }
        }

        Ok(satellites)
    }
}

/// Parse a single TLE file (may contain multiple satellites)
pub fn parse_tle_file(path: &Path) -> Result<Vec<ElementRecord>, CatalogError> {
    let content = fs::read_to_string(path)?;
    let filename = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    parse_tle_str(&content, &filename)
}

pub fn parse_tle_str(content: &str, source: &str) -> Result<Vec<ElementRecord>, CatalogError> {
    split_tle_sets(content)
        .into_iter()
        .map(|(name, line1, line2)| {
            Elements::from_tle(name, line1.as_bytes(), line2.as_bytes())
                .map(|elements| record_from_tle(&elements))
                .map_err(|e| CatalogError::InvalidTle {
                    file: source.to_string(),
                    message: e.to_string(),
                })
        })
        .collect()
}

fn record_from_tle(elements: &Elements) -> ElementRecord {
    ElementRecord {
        name: elements
            .object_name
            .clone()
            .unwrap_or_else(|| format!("NORAD {}", elements.norad_id)),
        id: elements.norad_id.to_string(),
        inclination: elements.inclination,
        eccentricity: elements.eccentricity,
        semi_major_axis: None,
        mean_motion: Some(elements.mean_motion),
        mean_anomaly: elements.mean_anomaly,
        raan: Some(elements.right_ascension),
        argument_of_perigee: Some(elements.argument_of_perigee),
        epoch: elements.datetime.and_utc(),
    }
}

/// Group lines into `(name, line1, line2)` sets. Names are optional and may
/// carry the `0 ` prefix of the three-line format; unpaired lines are dropped.
fn split_tle_sets(content: &str) -> Vec<(Option<String>, String, String)> {
    let mut sets = Vec::new();
    let mut name: Option<&str> = None;
    let mut lines = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .peekable();

    while let Some(line) = lines.next() {
        if line.starts_with("2 ") {
            log::debug!("TLE line 2 without matching line 1: {}", line);
            name = None;
            continue;
        }
        if !line.starts_with("1 ") {
            if let Some(stray) = name.replace(line.strip_prefix("0 ").unwrap_or(line)) {
                log::debug!("Ignoring TLE line without elements: {}", stray);
            }
            continue;
        }

        match lines.next_if(|next| next.starts_with("2 ") && same_catalog_number(line, next)) {
            Some(line2) => sets.push((
                name.take().map(str::to_string),
                line.to_string(),
                line2.to_string(),
            )),
            None => {
                log::debug!("TLE line 1 without matching line 2: {}", line);
                name = None;
            }
        }
    }

    sets
}

/// Columns 3-7 of both lines hold the catalog number.
fn same_catalog_number(line1: &str, line2: &str) -> bool {
    line1.get(2..7) == line2.get(2..7)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    const ISS: &str = "ISS (ZARYA)
1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992
2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008
";

    #[test]
    fn split_named_and_unnamed_sets() {
        let text = format!("{}\n{}", ISS, ISS.lines().skip(1).collect::<Vec<_>>().join("\n"));
        let sets = split_tle_sets(&text);
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].0.as_deref(), Some("ISS (ZARYA)"));
        assert_eq!(sets[1].0, None);
    }

    #[test]
    fn three_line_names_and_orphans() {
        let line1 = ISS.lines().nth(1).unwrap();
        let line2 = ISS.lines().nth(2).unwrap();
        let foreign2 = line2.replace("2 25544", "2 43013");
        let text = format!(
            "0 ISS (ZARYA)\n{}\n{}\nheader only\nDEBRIS\n{}\n{}\n{}\n{}\n",
            line1, line2, line1, foreign2, line1, line2
        );

        let sets = split_tle_sets(&text);
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].0.as_deref(), Some("ISS (ZARYA)"));
        // DEBRIS went with the orphaned line 1
        assert_eq!(sets[1].0, None);
        assert_eq!(sets[1].2, line2);
    }

    #[test]
    fn tle_to_elements() {
        let records = parse_tle_str(ISS, "iss.tle").unwrap();
        assert_eq!(records.len(), 1);
        let sat = Satellite::from_record(&records[0]).unwrap();
        assert_eq!(sat.id, "25544");
        assert_eq!(sat.name, "ISS (ZARYA)");
        assert_relative_eq!(sat.elements.inclination_deg(), 51.6461, max_relative = 1e-12);
        assert_relative_eq!(sat.elements.eccentricity(), 0.0001413, max_relative = 1e-12);
        assert_relative_eq!(sat.elements.raan_deg().unwrap(), 221.2784, max_relative = 1e-12);
        assert_relative_eq!(sat.elements.semi_major_axis_km(), 6797.0, max_relative = 1e-3);
        let epoch = sat.elements.epoch();
        assert_eq!(epoch.date_naive(), Utc.with_ymd_and_hms(2020, 7, 12, 0, 0, 0).unwrap().date_naive());
    }

    #[test]
    fn corrupt_tle_is_error() {
        let broken = ISS.replace("51.6461", "5X.6461");
        assert!(matches!(
            parse_tle_str(&broken, "bad.tle"),
            Err(CatalogError::InvalidTle { .. })
        ));
    }

    #[test]
    fn load_directory() {
        let dir = std::env::temp_dir().join(format!("orbit-predict-tle-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("stations.tle"), ISS).unwrap();
        fs::write(dir.join("notes.md"), "not a tle").unwrap();

        let satellites = TleLoader::new(dir.clone()).load_all().unwrap();
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(satellites.len(), 1);
        assert_eq!(satellites[0].id, "25544");
    }
}
