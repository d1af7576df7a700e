use super::error::OrbitError;

pub const KEPLER_TOLERANCE_RAD: f64 = 1e-8;
pub const KEPLER_MAX_ITERATIONS: usize = 50;

/// Solve Kepler's equation `M = E - e*sin(E)` for the eccentric anomaly.
///
/// Newton-Raphson starting from `E = M`. Iterates are held inside
/// `[M - e, M + e]`, which always contains the root because `|E - M| = e|sin E|`.
/// `M` may be any real value; the returned `E` lies in the same revolution.
pub fn solve_kepler(mean_anomaly: f64, eccentricity: f64) -> Result<f64, OrbitError> {
    if !(0.0..1.0).contains(&eccentricity) {
        return Err(OrbitError::validation(format!(
            "eccentricity must be in [0, 1), got {}",
            eccentricity
        )));
    }

    let lower = mean_anomaly - eccentricity;
    let upper = mean_anomaly + eccentricity;
    let mut e_anom = mean_anomaly;

    for iteration in 1..=KEPLER_MAX_ITERATIONS {
        let f = e_anom - eccentricity * e_anom.sin() - mean_anomaly;
        let f_prime = 1.0 - eccentricity * e_anom.cos();
        // max/min rather than clamp: NaN input must fall through to the cap, not panic
        let next = (e_anom - f / f_prime).max(lower).min(upper);

        if (next - e_anom).abs() < KEPLER_TOLERANCE_RAD {
            log::trace!("kepler converged in {} iterations", iteration);
            return Ok(next);
        }
        e_anom = next;
    }

    Err(OrbitError::Convergence {
        mean_anomaly,
        eccentricity,
        iterations: KEPLER_MAX_ITERATIONS,
    })
}

/// Kepler residual `M - (E - e*sin(E))`.
pub fn kepler_residual(mean_anomaly: f64, eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    mean_anomaly - (eccentric_anomaly - eccentricity * eccentric_anomaly.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{PI, TAU};

    #[test]
    fn residual_small_across_grid() {
        for ei in 0..=99 {
            let e = ei as f64 / 100.0;
            for mi in 0..72 {
                let m = mi as f64 * TAU / 72.0;
                let ecc = solve_kepler(m, e).unwrap();
                let residual = kepler_residual(m, ecc, e);
                assert!(
                    residual.abs() < 1e-6,
                    "e = {}, M = {}: residual {}",
                    e,
                    m,
                    residual
                );
            }
        }
    }

    #[test]
    fn circular_orbit_is_identity() {
        for m in [0.0, 0.3, 1.0, PI, 4.2, 6.0] {
            assert_eq!(solve_kepler(m, 0.0).unwrap(), m);
        }
    }

    #[test]
    fn accepts_mean_anomaly_outside_one_revolution() {
        let e = 0.3;
        let base = solve_kepler(1.2, e).unwrap();
        let shifted = solve_kepler(1.2 + 2.0 * TAU, e).unwrap();
        approx::assert_abs_diff_eq!(shifted - base, 2.0 * TAU, epsilon = 1e-9);

        let negative = solve_kepler(-1.2, e).unwrap();
        approx::assert_abs_diff_eq!(negative, -base, epsilon = 1e-9);
    }

    #[test]
    fn known_value() {
        // Vallado example 2-1: M = 235.4 deg, e = 0.4 gives E = 220.512074767522 deg
        let ecc = solve_kepler(235.4_f64.to_radians(), 0.4).unwrap();
        approx::assert_abs_diff_eq!(ecc.to_degrees(), 220.512_074_767_522, epsilon = 1e-6);
    }

    #[test]
    fn nan_input_is_convergence_error() {
        let err = solve_kepler(f64::NAN, 0.5).unwrap_err();
        assert!(matches!(
            err,
            OrbitError::Convergence {
                iterations: KEPLER_MAX_ITERATIONS,
                ..
            }
        ));
    }

    #[test]
    fn rejects_open_orbits() {
        assert!(matches!(
            solve_kepler(1.0, 1.0),
            Err(OrbitError::Validation(_))
        ));
        assert!(matches!(
            solve_kepler(1.0, -0.1),
            Err(OrbitError::Validation(_))
        ));
    }
}
