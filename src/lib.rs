pub mod error;
pub mod logging;
pub mod consts;
pub mod physics;
pub mod aircraft;
pub mod route;
mod gnc_mod;
pub mod sim;
pub mod io;

// The gnc module: expose gnc_mod as `gnc` publicly
pub mod gnc {
    pub use crate::gnc_mod::*;
}

pub use error::{Result, SimError};
