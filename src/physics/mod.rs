pub mod units;
pub mod atmosphere;
pub mod aerodynamics;
pub mod performance;

pub use atmosphere::{isa, Atmo};
pub use performance::{AeroConfig, PerformanceModel};
