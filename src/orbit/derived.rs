use std::f64::consts::TAU;

use super::constants::{EARTH_RADIUS_KM, MU_EARTH_KM3_S2, SECONDS_PER_DAY};
use super::error::OrbitError;

fn require_positive_axis(semi_major_axis_km: f64) -> Result<(), OrbitError> {
    if semi_major_axis_km > 0.0 && semi_major_axis_km.is_finite() {
        Ok(())
    } else {
        Err(OrbitError::validation(format!(
            "semi-major axis must be positive, got {} km",
            semi_major_axis_km
        )))
    }
}

/// Orbital period from Kepler's third law, in seconds.
pub fn orbital_period(semi_major_axis_km: f64) -> Result<f64, OrbitError> {
    require_positive_axis(semi_major_axis_km)?;
    Ok(TAU * (semi_major_axis_km.powi(3) / MU_EARTH_KM3_S2).sqrt())
}

/// Mean motion in rad/s.
pub fn mean_motion(semi_major_axis_km: f64) -> Result<f64, OrbitError> {
    Ok(TAU / orbital_period(semi_major_axis_km)?)
}

/// Semi-major axis (km) from a mean motion given in revolutions per day.
pub fn semi_major_axis_from_mean_motion(revs_per_day: f64) -> Result<f64, OrbitError> {
    if !(revs_per_day > 0.0 && revs_per_day.is_finite()) {
        return Err(OrbitError::validation(format!(
            "mean motion must be positive, got {} rev/day",
            revs_per_day
        )));
    }
    let n = revs_per_day * TAU / SECONDS_PER_DAY;
    Ok((MU_EARTH_KM3_S2 / (n * n)).cbrt())
}

/// Vis-viva speed `v = sqrt(μ (2/r - 1/a))` in km/s.
pub fn vis_viva_speed(radius_km: f64, semi_major_axis_km: f64) -> Result<f64, OrbitError> {
    if !(radius_km > 0.0) {
        return Err(OrbitError::arithmetic(format!(
            "vis-viva needs a positive radius, got {} km",
            radius_km
        )));
    }
    require_positive_axis(semi_major_axis_km)?;

    let energy_term = 2.0 / radius_km - 1.0 / semi_major_axis_km;
    if energy_term < 0.0 {
        return Err(OrbitError::arithmetic(format!(
            "radius {} km lies beyond the bound orbit of a = {} km",
            radius_km, semi_major_axis_km
        )));
    }
    Ok((MU_EARTH_KM3_S2 * energy_term).sqrt())
}

pub fn mean_altitude_km(semi_major_axis_km: f64) -> f64 {
    semi_major_axis_km - EARTH_RADIUS_KM
}

pub fn perigee_altitude_km(semi_major_axis_km: f64, eccentricity: f64) -> f64 {
    semi_major_axis_km * (1.0 - eccentricity) - EARTH_RADIUS_KM
}

pub fn apogee_altitude_km(semi_major_axis_km: f64, eccentricity: f64) -> f64 {
    semi_major_axis_km * (1.0 + eccentricity) - EARTH_RADIUS_KM
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn iss_like_period() {
        let period = orbital_period(6771.0).unwrap();
        // ~92.5 minutes
        assert_relative_eq!(period, 5554.0, max_relative = 0.005);
    }

    #[test]
    fn geostationary_period_is_one_sidereal_day() {
        let period = orbital_period(42_164.0).unwrap();
        assert_relative_eq!(period, 86_164.0, max_relative = 1e-3);
    }

    #[test]
    fn mean_motion_round_trip() {
        let a = semi_major_axis_from_mean_motion(15.54).unwrap();
        assert_relative_eq!(a, 6783.2, max_relative = 1e-4);
        let revs = mean_motion(a).unwrap() * SECONDS_PER_DAY / TAU;
        assert_relative_eq!(revs, 15.54, max_relative = 1e-10);
    }

    #[test]
    fn perigee_faster_than_apogee() {
        let a = 10_000.0;
        for e in [0.01, 0.2, 0.6] {
            let v_p = vis_viva_speed(a * (1.0 - e), a).unwrap();
            let v_a = vis_viva_speed(a * (1.0 + e), a).unwrap();
            assert!(v_p > v_a);
        }
    }

    #[test]
    fn circular_speed() {
        let v = vis_viva_speed(7000.0, 7000.0).unwrap();
        assert_relative_eq!(v, (MU_EARTH_KM3_S2 / 7000.0).sqrt(), max_relative = 1e-12);
    }

    #[test]
    fn domain_errors() {
        assert!(matches!(
            vis_viva_speed(0.0, 7000.0),
            Err(OrbitError::Arithmetic(_))
        ));
        assert!(matches!(
            vis_viva_speed(-10.0, 7000.0),
            Err(OrbitError::Arithmetic(_))
        ));
        assert!(matches!(
            vis_viva_speed(20_000.0, 7000.0),
            Err(OrbitError::Arithmetic(_))
        ));
        assert!(matches!(
            vis_viva_speed(7000.0, 0.0),
            Err(OrbitError::Validation(_))
        ));
        assert!(matches!(orbital_period(-1.0), Err(OrbitError::Validation(_))));
        assert!(semi_major_axis_from_mean_motion(0.0).is_err());
    }

    #[test]
    fn altitudes() {
        assert_relative_eq!(mean_altitude_km(6771.0), 400.0);
        assert_relative_eq!(perigee_altitude_km(7000.0, 0.1), 6300.0 - EARTH_RADIUS_KM, max_relative = 1e-9);
        assert_relative_eq!(apogee_altitude_km(7000.0, 0.1), 7700.0 - EARTH_RADIUS_KM, max_relative = 1e-9);
    }
}
