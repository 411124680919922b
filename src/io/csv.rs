use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::aircraft::AircraftState;
use crate::sim::SeparationReport;

/// Write the telemetry header.
///
/// Columns: time, callsign, type, state, ownership, x_nm, y_nm, altitude_ft,
///          heading_deg, speed_kt, vs_fpm, lateral, vertical, speed_mode,
///          target_altitude_ft, target_speed_kt, separation
pub fn write_header<W: Write>(writer: &mut W) -> io::Result<()> {
    writeln!(
        writer,
        "time,callsign,type,state,ownership,x_nm,y_nm,altitude_ft,\
         heading_deg,speed_kt,vs_fpm,lateral,vertical,speed_mode,\
         target_altitude_ft,target_speed_kt,separation"
    )
}

/// Write one row per aircraft for the given tick.
pub fn write_tick<W: Write>(
    writer: &mut W,
    time: f64,
    aircraft: &[AircraftState],
    separation: &SeparationReport,
) -> io::Result<()> {
    for ac in aircraft {
        let cmd = ac.command();
        writeln!(
            writer,
            "{:.2},{},{},{},{},{:.4},{:.4},{:.1},\
             {:.1},{:.1},{:.0},{},{},{},\
             {:.0},{:.1},{}",
            time,
            ac.callsign,
            ac.type_id,
            ac.flight_state(),
            ac.ownership,
            ac.position().x,
            ac.position().y,
            ac.altitude(),
            ac.heading(),
            ac.speed(),
            ac.airframe.vertical_speed,
            ac.autopilot.lateral_mode(),
            ac.autopilot.vertical_mode(),
            ac.autopilot.speed_mode(),
            cmd.target_altitude,
            cmd.target_speed,
            separation.status_of(&ac.callsign),
        )?;
    }
    Ok(())
}

/// Buffered telemetry file with the header already written.
pub struct TelemetryWriter<W: Write> {
    inner: W,
    rows: usize,
}

impl TelemetryWriter<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::new(BufWriter::new(File::create(path)?))
    }
}

impl<W: Write> TelemetryWriter<W> {
    pub fn new(mut inner: W) -> io::Result<Self> {
        write_header(&mut inner)?;
        Ok(Self { inner, rows: 0 })
    }

    pub fn record(&mut self, time: f64, aircraft: &[AircraftState], separation: &SeparationReport) -> io::Result<()> {
        write_tick(&mut self.inner, time, aircraft, separation)?;
        self.rows += aircraft.len();
        Ok(())
    }

    /// Data rows written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}
