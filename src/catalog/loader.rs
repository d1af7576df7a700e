use std::fs;
use std::path::Path;

use crate::catalog::error::CatalogError;
use crate::catalog::satellite::Satellite;
use crate::catalog::tle_loader::TleLoader;
use crate::orbit::ElementRecord;

/// Satellites loaded from one source.
#[derive(Debug, Clone)]
pub struct Catalog {
    satellites: Vec<Satellite>,
}

impl Catalog {
    pub fn new(satellites: Vec<Satellite>) -> Self {
        Self { satellites }
    }

    /// Load a YAML catalog file, or every TLE file when `path` is a directory.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        if path.is_dir() {
            let satellites = TleLoader::new(path.to_path_buf()).load_all()?;
            return Self::non_empty(satellites, path.display().to_string());
        }
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content, &path.display().to_string())
    }

    /// Parse a YAML document holding a `satellites` list of element records.
    ///
    /// Rows that fail to parse or validate are logged and skipped.
    pub fn from_yaml_str(yaml: &str, source: &str) -> Result<Self, CatalogError> {
        let root: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        let rows = root
            .get("satellites")
            .and_then(|v| v.as_sequence())
            .ok_or_else(|| CatalogError::Empty(format!("{} (missing 'satellites')", source)))?;

        let mut satellites: Vec<Satellite> = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let parsed = serde_yaml::from_value::<ElementRecord>(row.clone())
                .map_err(CatalogError::from)
                .and_then(|record| Satellite::from_record(&record).map_err(CatalogError::from));

            match parsed {
                Ok(sat) => {
                    if satellites.iter().any(|s| s.same_object(&sat)) {
                        log::warn!("{}: row {} repeats satellite id {}, skipping", source, i + 1, sat.id);
                        continue;
                    }
                    satellites.push(sat);
                }
                Err(e) => log::warn!("{}: skipping invalid row {}: {}", source, i + 1, e),
            }
        }

        Self::non_empty(satellites, source.to_string())
    }

    fn non_empty(satellites: Vec<Satellite>, source: String) -> Result<Self, CatalogError> {
        if satellites.is_empty() {
            return Err(CatalogError::Empty(source));
        }
        log::info!("Loaded {} satellites from {}", satellites.len(), source);
        Ok(Self { satellites })
    }

    pub fn satellites(&self) -> &[Satellite] {
        &self.satellites
    }

    pub fn into_satellites(self) -> Vec<Satellite> {
        self.satellites
    }

    pub fn len(&self) -> usize {
        self.satellites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.satellites.is_empty()
    }

    pub fn find(&self, id: &str) -> Result<&Satellite, CatalogError> {
        self.satellites
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }
}
