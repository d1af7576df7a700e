//! Two-body orbital mechanics: Kepler's equation, anomaly and frame
//! conversion, and time-sampled propagation from classical elements.

pub mod constants;
pub mod derived;
pub mod elements;
pub mod error;
pub mod frame;
pub mod kepler;
pub mod propagation;
pub mod types;

pub use derived::{orbital_period, vis_viva_speed};
pub use elements::{ElementRecord, OrbitalElements};
pub use error::OrbitError;
pub use propagation::{altitude_at, propagate, speed_at, state_at, stream, StateStream, TimeGrid};
pub use types::{OrbitalState, Trajectory, TrajectoryPoint};
