use std::f64::consts::TAU;

use chrono::{DateTime, Duration, Utc};

use super::constants::EARTH_RADIUS_KM;
use super::derived::vis_viva_speed;
use super::elements::OrbitalElements;
use super::error::OrbitError;
use super::frame::{convert, norm};
use super::kepler::solve_kepler;
use super::types::{OrbitalState, Trajectory, TrajectoryPoint};

/// Timestamps carry microsecond precision; samples closer than this collapse.
const TIMESTAMP_PRECISION_S: f64 = 1e-6;
const MIN_RESOLUTION_S: f64 = 1e-3;

/// Sampling window measured from the element epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeGrid {
    duration_s: f64,
    resolution_s: f64,
    samples: usize,
}

impl TimeGrid {
    pub fn new(duration_s: f64, resolution_s: f64) -> Result<Self, OrbitError> {
        if !(duration_s >= 0.0 && duration_s.is_finite()) {
            return Err(OrbitError::validation(format!(
                "duration must be non-negative, got {} s",
                duration_s
            )));
        }
        if !(resolution_s > 0.0 && resolution_s.is_finite()) {
            return Err(OrbitError::validation(format!(
                "resolution must be positive, got {} s",
                resolution_s
            )));
        }
        if resolution_s < MIN_RESOLUTION_S {
            return Err(OrbitError::validation(format!(
                "resolution must be at least {} s, got {} s",
                MIN_RESOLUTION_S, resolution_s
            )));
        }

        // A remainder below timestamp precision would put the final sample on
        // top of the one before it, so it does not count as another step.
        let steps = ((duration_s - TIMESTAMP_PRECISION_S).max(0.0) / resolution_s).ceil();
        let samples = Some(steps)
            .filter(|s| *s < usize::MAX as f64)
            .and_then(|s| (s as usize).checked_add(1))
            .ok_or_else(|| {
                OrbitError::validation(format!(
                    "{} s at {} s resolution needs more samples than can be addressed",
                    duration_s, resolution_s
                ))
            })?;

        Ok(Self {
            duration_s,
            resolution_s,
            samples,
        })
    }

    pub fn from_durations(
        duration: std::time::Duration,
        resolution: std::time::Duration,
    ) -> Result<Self, OrbitError> {
        Self::new(duration.as_secs_f64(), resolution.as_secs_f64())
    }

    /// Divide the resolution by `factor` for denser sampling.
    pub fn with_smoothing(self, factor: u32) -> Result<Self, OrbitError> {
        if factor == 0 {
            return Err(OrbitError::validation("smooth factor must be at least 1"));
        }
        Self::new(self.duration_s, self.resolution_s / factor as f64)
    }

    pub fn duration_s(&self) -> f64 {
        self.duration_s
    }

    pub fn resolution_s(&self) -> f64 {
        self.resolution_s
    }

    /// `ceil(duration / resolution) + 1`, ignoring sub-microsecond remainders.
    pub fn sample_count(&self) -> usize {
        self.samples
    }

    /// Offset of sample `k`; the last sample is pinned to the full duration.
    pub fn offset(&self, k: usize) -> f64 {
        if k == 0 {
            0.0
        } else if k >= self.samples - 1 {
            self.duration_s
        } else {
            k as f64 * self.resolution_s
        }
    }
}

/// State at `offset_s` seconds after the element epoch.
pub fn state_at(elements: &OrbitalElements, offset_s: f64) -> Result<OrbitalState, OrbitError> {
    if !(offset_s >= 0.0 && offset_s.is_finite()) {
        return Err(OrbitError::validation(format!(
            "time offset must be non-negative, got {} s",
            offset_s
        )));
    }

    let n = elements.mean_motion_rad_s();
    let mean_anomaly = (elements.mean_anomaly_deg().to_radians() + n * offset_s).rem_euclid(TAU);
    let eccentric_anomaly = solve_kepler(mean_anomaly, elements.eccentricity())?;
    let frame = convert(
        eccentric_anomaly,
        elements.eccentricity(),
        elements.semi_major_axis_km(),
        &elements.orientation(),
    )?;

    Ok(OrbitalState {
        position_km: frame.position_km,
        velocity_km_s: frame.velocity_km_s,
        radius_km: frame.radius_km,
        mean_anomaly_deg: mean_anomaly.to_degrees(),
        eccentric_anomaly_deg: eccentric_anomaly.to_degrees(),
        true_anomaly_deg: frame.true_anomaly.to_degrees(),
    })
}

/// Vis-viva speed at the propagated radius.
pub fn speed_at(elements: &OrbitalElements, offset_s: f64) -> Result<f64, OrbitError> {
    let state = state_at(elements, offset_s)?;
    vis_viva_speed(norm(state.position_km), elements.semi_major_axis_km())
}

/// Height above the spherical Earth at `offset_s`.
pub fn altitude_at(elements: &OrbitalElements, offset_s: f64) -> Result<f64, OrbitError> {
    Ok(norm(state_at(elements, offset_s)?.position_km) - EARTH_RADIUS_KM)
}

/// Propagate over the whole grid and collect the trajectory.
pub fn propagate(elements: &OrbitalElements, grid: TimeGrid) -> Result<Trajectory, OrbitError> {
    offset_timestamp(elements.epoch(), grid.duration_s())?;
    let points = stream(elements, grid).collect::<Result<Vec<_>, _>>()?;
    log::debug!(
        "propagated {} samples over {} s at {} s resolution",
        points.len(),
        grid.duration_s(),
        grid.resolution_s()
    );
    Ok(Trajectory::new(elements.epoch(), points))
}

/// Lazy form of [`propagate`]. Each call starts a fresh sequence.
pub fn stream(elements: &OrbitalElements, grid: TimeGrid) -> StateStream<'_> {
    StateStream {
        elements,
        grid,
        next: 0,
        count: grid.sample_count(),
    }
}

#[derive(Debug, Clone)]
pub struct StateStream<'a> {
    elements: &'a OrbitalElements,
    grid: TimeGrid,
    next: usize,
    count: usize,
}

impl StateStream<'_> {
    fn point_at(&self, offset_s: f64) -> Result<TrajectoryPoint, OrbitError> {
        Ok(TrajectoryPoint {
            offset_s,
            timestamp: offset_timestamp(self.elements.epoch(), offset_s)?,
            state: state_at(self.elements, offset_s)?,
        })
    }
}

impl Iterator for StateStream<'_> {
    type Item = Result<TrajectoryPoint, OrbitError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let offset_s = self.grid.offset(self.next);
        self.next += 1;

        Some(self.point_at(offset_s))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for StateStream<'_> {}

fn offset_timestamp(epoch: DateTime<Utc>, offset_s: f64) -> Result<DateTime<Utc>, OrbitError> {
    // `as` saturates, and a saturated delta fails the checked add below.
    let delta = Duration::microseconds((offset_s * 1e6).round() as i64);
    epoch.checked_add_signed(delta).ok_or_else(|| {
        OrbitError::validation(format!(
            "{} s after {} is outside the supported time range",
            offset_s, epoch
        ))
    })
}
