/// Earth's gravitational parameter (km^3/s^2).
pub const MU_EARTH_KM3_S2: f64 = 398_600.4418;

/// Mean spherical Earth radius used for altitudes (km).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub const SECONDS_PER_DAY: f64 = 86_400.0;
