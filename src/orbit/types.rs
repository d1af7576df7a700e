use chrono::{DateTime, Utc};
use serde::Serialize;

use super::frame::norm;

/// Position and velocity of a satellite at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrbitalState {
    pub position_km: [f64; 3],
    pub velocity_km_s: [f64; 3],
    pub radius_km: f64,
    pub mean_anomaly_deg: f64,
    pub eccentric_anomaly_deg: f64,
    pub true_anomaly_deg: f64,
}

impl OrbitalState {
    pub fn speed_km_s(&self) -> f64 {
        norm(self.velocity_km_s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrajectoryPoint {
    /// Seconds since the element epoch.
    pub offset_s: f64,
    pub timestamp: DateTime<Utc>,
    pub state: OrbitalState,
}

/// Time-ordered states from a single propagation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    epoch: DateTime<Utc>,
    points: Vec<TrajectoryPoint>,
}

impl Trajectory {
    pub(crate) fn new(epoch: DateTime<Utc>, points: Vec<TrajectoryPoint>) -> Self {
        Self { epoch, points }
    }

    pub fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrajectoryPoint> {
        self.points.iter()
    }

    pub fn first(&self) -> Option<&TrajectoryPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&TrajectoryPoint> {
        self.points.last()
    }

    pub fn positions(&self) -> impl Iterator<Item = [f64; 3]> + '_ {
        self.points.iter().map(|p| p.state.position_km)
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a TrajectoryPoint;
    type IntoIter = std::slice::Iter<'a, TrajectoryPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
