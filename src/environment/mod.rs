//! Environmental monitoring and tamper supervision.
//!
//! Sensor inputs are mapped to readings every tick; any out-of-range
//! reading or tripped tamper sensor arms a sticky alarm.

mod monitor;
mod tamper;

pub use monitor::{
    AveragingSensorModel, EnvironmentalMonitor, EnvironmentalReading, SensorInputs, SensorModel,
    SUPPLY_BAND_FLOOR_CV, THERMAL_SENSORS,
};
pub use tamper::{TamperCause, TamperSupervisor};
