use std::f64::consts::TAU;

use super::derived::vis_viva_speed;
use super::error::OrbitError;

/// Orientation of the orbital plane in the inertial frame (radians).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneOrientation {
    pub inclination: f64,
    pub raan: f64,
    pub argument_of_perigee: f64,
}

/// Result of converting an eccentric anomaly into an inertial state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    pub true_anomaly: f64,
    pub radius_km: f64,
    pub position_km: [f64; 3],
    pub velocity_km_s: [f64; 3],
}

/// True anomaly from eccentric anomaly via the half-angle relation.
///
/// The quadrant is resolved with `atan2` and the result is then shifted by
/// whole turns to stay within half a turn of `E`, so `ν(E)` is continuous and
/// increasing over the whole real line.
pub fn true_anomaly(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    let half = eccentric_anomaly / 2.0;
    let nu = 2.0
        * ((1.0 + eccentricity).sqrt() * half.sin()).atan2((1.0 - eccentricity).sqrt() * half.cos());
    nu + TAU * ((eccentric_anomaly - nu) / TAU).round()
}

/// Conic radius `r = a(1 - e²) / (1 + e*cos ν)`.
pub fn orbital_radius(semi_major_axis_km: f64, eccentricity: f64, true_anomaly: f64) -> f64 {
    semi_major_axis_km * (1.0 - eccentricity * eccentricity)
        / (1.0 + eccentricity * true_anomaly.cos())
}

/// Position and velocity in the perifocal (PQW) frame.
pub fn perifocal_state(
    semi_major_axis_km: f64,
    eccentricity: f64,
    true_anomaly: f64,
) -> Result<([f64; 3], [f64; 3]), OrbitError> {
    let r = orbital_radius(semi_major_axis_km, eccentricity, true_anomaly);
    let (sin_nu, cos_nu) = true_anomaly.sin_cos();

    let speed = vis_viva_speed(r, semi_major_axis_km)?;
    // Flight-path angle splits the speed into radial and transverse parts.
    let gamma = (eccentricity * sin_nu).atan2(1.0 + eccentricity * cos_nu);
    let v_radial = speed * gamma.sin();
    let v_transverse = speed * gamma.cos();

    let position = [r * cos_nu, r * sin_nu, 0.0];
    let velocity = [
        v_radial * cos_nu - v_transverse * sin_nu,
        v_radial * sin_nu + v_transverse * cos_nu,
        0.0,
    ];
    Ok((position, velocity))
}

/// Rotate a perifocal vector into the inertial frame: `Rz(Ω) · Rx(i) · Rz(ω)`.
pub fn perifocal_to_inertial(v: [f64; 3], orientation: &PlaneOrientation) -> [f64; 3] {
    let (sin_w, cos_w) = orientation.argument_of_perigee.sin_cos();
    let (sin_i, cos_i) = orientation.inclination.sin_cos();
    let (sin_o, cos_o) = orientation.raan.sin_cos();

    let x1 = v[0] * cos_w - v[1] * sin_w;
    let y1 = v[0] * sin_w + v[1] * cos_w;
    let z1 = v[2];

    let x2 = x1;
    let y2 = y1 * cos_i - z1 * sin_i;
    let z2 = y1 * sin_i + z1 * cos_i;

    [x2 * cos_o - y2 * sin_o, x2 * sin_o + y2 * cos_o, z2]
}

/// Convert an eccentric anomaly into an inertial position and velocity.
pub fn convert(
    eccentric_anomaly: f64,
    eccentricity: f64,
    semi_major_axis_km: f64,
    orientation: &PlaneOrientation,
) -> Result<FrameState, OrbitError> {
    let nu = true_anomaly(eccentric_anomaly, eccentricity);
    let radius_km = orbital_radius(semi_major_axis_km, eccentricity, nu);
    let (pos_pqw, vel_pqw) = perifocal_state(semi_major_axis_km, eccentricity, nu)?;

    Ok(FrameState {
        true_anomaly: nu,
        radius_km,
        position_km: perifocal_to_inertial(pos_pqw, orientation),
        velocity_km_s: perifocal_to_inertial(vel_pqw, orientation),
    })
}

pub fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

pub fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}
