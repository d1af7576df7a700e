use std::cmp::Ordering;

use serde::Serialize;
use strum_macros::Display;

use crate::orbit::{altitude_at, ElementRecord, OrbitError, OrbitalElements};

/// A tracked object: identity plus the elements it is propagated from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Satellite {
    pub name: String,
    pub id: String,
    pub elements: OrbitalElements,
}

impl Satellite {
    pub fn new(
        name: impl Into<String>,
        id: impl Into<String>,
        elements: OrbitalElements,
    ) -> Result<Self, OrbitError> {
        let name = name.into().trim().to_string();
        let id = id.into().trim().to_string();
        if name.is_empty() {
            return Err(OrbitError::validation("satellite name must be non-empty"));
        }
        if id.is_empty() {
            return Err(OrbitError::validation("satellite id must be non-empty"));
        }
        Ok(Self { name, id, elements })
    }

    pub fn from_record(record: &ElementRecord) -> Result<Self, OrbitError> {
        Self::new(
            record.name.as_str(),
            record.id.as_str(),
            OrbitalElements::from_record(record)?,
        )
    }

    /// Same tracked object, regardless of element set.
    pub fn same_object(&self, other: &Satellite) -> bool {
        self.id == other.id
    }
}

/// Quantity used to order satellites.
#[derive(Debug, Clone, Copy, PartialEq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum RankKey {
    MeanAltitude,
    PerigeeAltitude,
    ApogeeAltitude,
    Period,
    /// Instantaneous altitude `offset_s` seconds after each satellite's own epoch.
    AltitudeAt { offset_s: f64 },
}

impl RankKey {
    pub fn value(&self, elements: &OrbitalElements) -> Result<f64, OrbitError> {
        match *self {
            RankKey::MeanAltitude => Ok(elements.mean_altitude_km()),
            RankKey::PerigeeAltitude => Ok(elements.perigee_altitude_km()),
            RankKey::ApogeeAltitude => Ok(elements.apogee_altitude_km()),
            RankKey::Period => Ok(elements.period_s()),
            RankKey::AltitudeAt { offset_s } => altitude_at(elements, offset_s),
        }
    }
}

pub fn compare_by(a: &Satellite, b: &Satellite, key: RankKey) -> Result<Ordering, OrbitError> {
    Ok(key.value(&a.elements)?.total_cmp(&key.value(&b.elements)?))
}

/// Sort ascending by `key`. Ties keep their input order.
pub fn rank(satellites: Vec<Satellite>, key: RankKey) -> Result<Vec<(Satellite, f64)>, OrbitError> {
    let mut keyed = satellites
        .into_iter()
        .map(|sat| key.value(&sat.elements).map(|v| (sat, v)))
        .collect::<Result<Vec<_>, _>>()?;
    keyed.sort_by(|a, b| a.1.total_cmp(&b.1));
    log::debug!("ranked {} satellites by {}", keyed.len(), key);
    Ok(keyed)
}
