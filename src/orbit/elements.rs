use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::derived::{
    apogee_altitude_km, mean_altitude_km, mean_motion, orbital_period, perigee_altitude_km,
    semi_major_axis_from_mean_motion,
};
use super::error::OrbitError;
use super::frame::PlaneOrientation;

const EPOCH_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One input row describing a satellite, before validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ElementRecord {
    pub name: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub inclination: f64,
    pub eccentricity: f64,
    #[serde(default)]
    pub semi_major_axis: Option<f64>,
    /// Revolutions per day, used when `semi_major_axis` is absent.
    #[serde(default)]
    pub mean_motion: Option<f64>,
    pub mean_anomaly: f64,
    #[serde(default)]
    pub raan: Option<f64>,
    #[serde(default)]
    pub argument_of_perigee: Option<f64>,
    #[serde(deserialize_with = "deserialize_epoch")]
    pub epoch: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Text(String),
    Number(u64),
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match IdRepr::deserialize(deserializer)? {
        IdRepr::Text(s) => s,
        IdRepr::Number(n) => n.to_string(),
    })
}

fn deserialize_epoch<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_epoch(&s).map_err(serde::de::Error::custom)
}

/// Parse `YYYY-MM-DD HH:MM:SS` (taken as UTC) or RFC 3339.
pub fn parse_epoch(s: &str) -> Result<DateTime<Utc>, OrbitError> {
    let s = s.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, EPOCH_FORMAT) {
        return Ok(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| OrbitError::validation(format!("invalid epoch '{}': {}", s, e)))
}

/// Validated classical elements for one orbit.
///
/// RAAN and argument of perigee are optional. Without them the plane is
/// oriented by inclination alone and perigee lies on the inertial +x axis.
/// That is a convention for simplified element sets, not a general frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrbitalElements {
    inclination_deg: f64,
    eccentricity: f64,
    semi_major_axis_km: f64,
    mean_anomaly_deg: f64,
    epoch: DateTime<Utc>,
    raan_deg: Option<f64>,
    argument_of_perigee_deg: Option<f64>,
}

impl OrbitalElements {
    pub fn new(
        inclination_deg: f64,
        eccentricity: f64,
        semi_major_axis_km: f64,
        mean_anomaly_deg: f64,
        epoch: DateTime<Utc>,
    ) -> Result<Self, OrbitError> {
        if !(0.0..=180.0).contains(&inclination_deg) {
            return Err(OrbitError::validation(format!(
                "inclination must be within [0, 180] deg, got {}",
                inclination_deg
            )));
        }
        if !(0.0..1.0).contains(&eccentricity) {
            return Err(OrbitError::validation(format!(
                "eccentricity must be within [0, 1), got {}",
                eccentricity
            )));
        }
        if !(semi_major_axis_km > 0.0 && semi_major_axis_km.is_finite()) {
            return Err(OrbitError::validation(format!(
                "semi-major axis must be positive, got {} km",
                semi_major_axis_km
            )));
        }
        if !mean_anomaly_deg.is_finite() {
            return Err(OrbitError::validation("mean anomaly must be finite"));
        }

        Ok(Self {
            inclination_deg,
            eccentricity,
            semi_major_axis_km,
            mean_anomaly_deg,
            epoch,
            raan_deg: None,
            argument_of_perigee_deg: None,
        })
    }

    pub fn with_orientation(
        mut self,
        raan_deg: f64,
        argument_of_perigee_deg: f64,
    ) -> Result<Self, OrbitError> {
        check_turn_angle("RAAN", raan_deg)?;
        check_turn_angle("argument of perigee", argument_of_perigee_deg)?;
        self.raan_deg = Some(raan_deg);
        self.argument_of_perigee_deg = Some(argument_of_perigee_deg);
        Ok(self)
    }

    pub fn from_record(record: &ElementRecord) -> Result<Self, OrbitError> {
        let semi_major_axis = match (record.semi_major_axis, record.mean_motion) {
            (Some(a), _) => a,
            (None, Some(n)) => semi_major_axis_from_mean_motion(n)?,
            (None, None) => {
                return Err(OrbitError::validation(
                    "either semi_major_axis or mean_motion must be provided",
                ))
            }
        };

        let mut elements = Self::new(
            record.inclination,
            record.eccentricity,
            semi_major_axis,
            record.mean_anomaly,
            record.epoch,
        )?;

        if let Some(raan) = record.raan {
            check_turn_angle("RAAN", raan)?;
            elements.raan_deg = Some(raan);
        }
        if let Some(argp) = record.argument_of_perigee {
            check_turn_angle("argument of perigee", argp)?;
            elements.argument_of_perigee_deg = Some(argp);
        }
        Ok(elements)
    }

    pub fn inclination_deg(&self) -> f64 {
        self.inclination_deg
    }

    pub fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    pub fn semi_major_axis_km(&self) -> f64 {
        self.semi_major_axis_km
    }

    pub fn mean_anomaly_deg(&self) -> f64 {
        self.mean_anomaly_deg
    }

    pub fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    pub fn raan_deg(&self) -> Option<f64> {
        self.raan_deg
    }

    pub fn argument_of_perigee_deg(&self) -> Option<f64> {
        self.argument_of_perigee_deg
    }

    /// False when the x-axis-at-perigee convention is in effect for either angle.
    pub fn has_explicit_orientation(&self) -> bool {
        self.raan_deg.is_some() && self.argument_of_perigee_deg.is_some()
    }

    pub fn orientation(&self) -> PlaneOrientation {
        PlaneOrientation {
            inclination: self.inclination_deg.to_radians(),
            raan: self.raan_deg.unwrap_or(0.0).to_radians(),
            argument_of_perigee: self.argument_of_perigee_deg.unwrap_or(0.0).to_radians(),
        }
    }

    pub fn period_s(&self) -> f64 {
        // The axis was validated on construction.
        orbital_period(self.semi_major_axis_km).unwrap_or(f64::NAN)
    }

    pub fn mean_motion_rad_s(&self) -> f64 {
        mean_motion(self.semi_major_axis_km).unwrap_or(f64::NAN)
    }

    pub fn mean_altitude_km(&self) -> f64 {
        mean_altitude_km(self.semi_major_axis_km)
    }

    pub fn perigee_altitude_km(&self) -> f64 {
        perigee_altitude_km(self.semi_major_axis_km, self.eccentricity)
    }

    pub fn apogee_altitude_km(&self) -> f64 {
        apogee_altitude_km(self.semi_major_axis_km, self.eccentricity)
    }
}

fn check_turn_angle(label: &str, value: f64) -> Result<(), OrbitError> {
    if (0.0..360.0).contains(&value) {
        Ok(())
    } else {
        Err(OrbitError::validation(format!(
            "{} must be within [0, 360) deg, got {}",
            label, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn record() -> ElementRecord {
        ElementRecord {
            name: "TestSat".into(),
            id: "12345".into(),
            inclination: 51.6,
            eccentricity: 0.001,
            semi_major_axis: Some(6778.0),
            mean_motion: None,
            mean_anomaly: 0.0,
            raan: None,
            argument_of_perigee: None,
            epoch: epoch(),
        }
    }

    #[test]
    fn rejects_out_of_range_elements() {
        assert!(OrbitalElements::new(51.6, 1.0, 7000.0, 0.0, epoch()).is_err());
        assert!(OrbitalElements::new(51.6, 1.5, 7000.0, 0.0, epoch()).is_err());
        assert!(OrbitalElements::new(51.6, -0.1, 7000.0, 0.0, epoch()).is_err());
        assert!(OrbitalElements::new(51.6, 0.1, 0.0, 0.0, epoch()).is_err());
        assert!(OrbitalElements::new(51.6, 0.1, -7000.0, 0.0, epoch()).is_err());
        assert!(OrbitalElements::new(200.0, 0.1, 7000.0, 0.0, epoch()).is_err());
        assert!(OrbitalElements::new(51.6, 0.1, 7000.0, f64::NAN, epoch()).is_err());
        assert!(OrbitalElements::new(51.6, f64::NAN, 7000.0, 0.0, epoch()).is_err());
    }

    #[test]
    fn validation_errors_are_typed() {
        let err = OrbitalElements::new(51.6, 1.0, 7000.0, 0.0, epoch()).unwrap_err();
        assert!(matches!(err, OrbitError::Validation(_)));
    }

    #[test]
    fn orientation_defaults_to_convention() {
        let elements = OrbitalElements::from_record(&record()).unwrap();
        assert!(!elements.has_explicit_orientation());
        let orientation = elements.orientation();
        assert_eq!(orientation.raan, 0.0);
        assert_eq!(orientation.argument_of_perigee, 0.0);
        assert_relative_eq!(orientation.inclination, 51.6_f64.to_radians());
    }

    #[test]
    fn explicit_orientation_is_validated() {
        let elements = OrbitalElements::new(51.6, 0.001, 6778.0, 0.0, epoch()).unwrap();
        assert!(elements.clone().with_orientation(360.0, 0.0).is_err());
        assert!(elements.clone().with_orientation(10.0, -1.0).is_err());
        let oriented = elements.with_orientation(120.0, 45.0).unwrap();
        assert!(oriented.has_explicit_orientation());
        assert_eq!(oriented.raan_deg(), Some(120.0));
    }

    #[test]
    fn semi_major_axis_from_mean_motion_when_absent() {
        let mut rec = record();
        rec.semi_major_axis = None;
        rec.mean_motion = Some(15.54);
        let elements = OrbitalElements::from_record(&rec).unwrap();
        assert_relative_eq!(elements.semi_major_axis_km(), 6783.2, max_relative = 1e-4);

        rec.mean_motion = None;
        assert!(matches!(
            OrbitalElements::from_record(&rec),
            Err(OrbitError::Validation(_))
        ));
    }

    #[test]
    fn record_from_yaml() {
        let yaml = r#"
name: ISS
id: 25544
inclination: 51.6
eccentricity: 0.0003
semi_major_axis: 6771
mean_anomaly: 0
raan: 247.4
argument_of_perigee: 130.5
epoch: "2024-01-01 12:30:00"
"#;
        let rec: ElementRecord = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rec.id, "25544");
        assert_eq!(rec.epoch, Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 0).unwrap());
        let elements = OrbitalElements::from_record(&rec).unwrap();
        assert!(elements.has_explicit_orientation());
    }

    #[test]
    fn epoch_formats() {
        assert_eq!(parse_epoch("2024-01-01 00:00:00").unwrap(), epoch());
        assert_eq!(parse_epoch("2024-01-01T01:00:00+01:00").unwrap(), epoch());
        assert!(parse_epoch("yesterday").is_err());
    }

    #[test]
    fn altitudes_and_period() {
        let elements = OrbitalElements::new(51.6, 0.0003, 6771.0, 0.0, epoch()).unwrap();
        assert_relative_eq!(elements.mean_altitude_km(), 400.0);
        assert!(elements.perigee_altitude_km() < elements.apogee_altitude_km());
        assert_relative_eq!(elements.period_s(), 5544.86, max_relative = 1e-5);
    }
}
