pub mod csv;

pub use csv::{write_header, write_tick, TelemetryWriter};
