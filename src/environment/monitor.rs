//! Sensor inputs to environmental readings.

use serde::Serialize;

/// Number of on-die thermal sensors.
pub const THERMAL_SENSORS: usize = 4;

/// Lower edge of the nominal supply band (1.50 V), in centivolts.
pub const SUPPLY_BAND_FLOOR_CV: u16 = 150;

/// Raw sensor inputs for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorInputs {
    /// Per-sensor temperature offsets from baseline, in °C.
    pub thermal: [i8; THERMAL_SENSORS],
    /// Supply reading relative to the band floor, in centivolts.
    /// Nominal operation keeps this in 0..=60 (1.50 V to 2.10 V).
    pub supply_offset_cv: i16,
    /// Trip-fuse mesh and enclosure switches; any set bit is a tamper.
    pub tamper_mask: u32,
}

impl SensorInputs {
    /// Mid-band supply, baseline temperature, no tamper sensors tripped.
    pub const NOMINAL: Self = Self {
        thermal: [0; THERMAL_SENSORS],
        supply_offset_cv: 30,
        tamper_mask: 0,
    };

    /// Nominal inputs with every thermal sensor at `offset`.
    pub fn with_temperature_offset(offset: i8) -> Self {
        Self {
            thermal: [offset; THERMAL_SENSORS],
            ..Self::NOMINAL
        }
    }

    /// Nominal inputs with the given supply offset.
    pub fn with_supply_offset(supply_offset_cv: i16) -> Self {
        Self {
            supply_offset_cv,
            ..Self::NOMINAL
        }
    }

    /// Nominal inputs with the given tamper sensor mask.
    pub fn with_tamper_mask(tamper_mask: u32) -> Self {
        Self {
            tamper_mask,
            ..Self::NOMINAL
        }
    }
}

impl Default for SensorInputs {
    fn default() -> Self {
        Self::NOMINAL
    }
}

/// Environmental readings derived each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnvironmentalReading {
    /// Die temperature in °C (signed).
    pub temperature_c: i16,
    /// Supply voltage in centivolts.
    pub voltage_cv: u16,
    /// Tamper sensor bitmask.
    pub tamper_mask: u32,
}

/// Maps raw sensor values to physical quantities.
///
/// Swappable so that a board with different sensor wiring only needs a
/// new model, not a new monitor.
pub trait SensorModel: Send + Sync {
    /// Temperature offset from baseline for the thermal array.
    fn temperature_offset(&self, thermal: &[i8; THERMAL_SENSORS]) -> i16;

    /// Supply voltage in centivolts.
    fn voltage_cv(&self, supply_offset_cv: i16) -> u16;
}

/// Default model: mean of the thermal array, linear supply mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct AveragingSensorModel;

impl SensorModel for AveragingSensorModel {
    fn temperature_offset(&self, thermal: &[i8; THERMAL_SENSORS]) -> i16 {
        let sum: i16 = thermal.iter().map(|&t| i16::from(t)).sum();
        sum / THERMAL_SENSORS as i16
    }

    fn voltage_cv(&self, supply_offset_cv: i16) -> u16 {
        let cv = i32::from(SUPPLY_BAND_FLOOR_CV) + i32::from(supply_offset_cv);
        cv.clamp(0, i32::from(u16::MAX)) as u16
    }
}

/// Derives temperature, voltage and tamper readings from sensor inputs.
///
/// A pure function of the current tick's inputs; holds no state.
pub struct EnvironmentalMonitor {
    baseline_temp_c: i16,
    model: Box<dyn SensorModel>,
}

impl EnvironmentalMonitor {
    /// Creates a monitor with the default sensor model.
    pub fn new(baseline_temp_c: i16) -> Self {
        Self::with_model(baseline_temp_c, Box::new(AveragingSensorModel))
    }

    /// Creates a monitor with a custom sensor model.
    pub fn with_model(baseline_temp_c: i16, model: Box<dyn SensorModel>) -> Self {
        Self {
            baseline_temp_c,
            model,
        }
    }

    /// Temperature reported for a zero thermal offset.
    pub fn baseline_temp_c(&self) -> i16 {
        self.baseline_temp_c
    }

    /// Computes this tick's readings.
    pub fn measure(&self, inputs: &SensorInputs) -> EnvironmentalReading {
        EnvironmentalReading {
            temperature_c: self
                .baseline_temp_c
                .saturating_add(self.model.temperature_offset(&inputs.thermal)),
            voltage_cv: self.model.voltage_cv(inputs.supply_offset_cv),
            tamper_mask: inputs.tamper_mask,
        }
    }
}

impl std::fmt::Debug for EnvironmentalMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentalMonitor")
            .field("baseline_temp_c", &self.baseline_temp_c)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nominal_reading() {
        let monitor = EnvironmentalMonitor::new(25);
        let reading = monitor.measure(&SensorInputs::NOMINAL);

        assert_eq!(reading.temperature_c, 25);
        assert_eq!(reading.voltage_cv, 180);
        assert_eq!(reading.tamper_mask, 0);
    }

    #[test]
    fn test_negative_temperatures_stay_signed() {
        let monitor = EnvironmentalMonitor::new(25);
        let reading = monitor.measure(&SensorInputs::with_temperature_offset(-70));

        assert_eq!(reading.temperature_c, -45);
    }

    #[test]
    fn test_temperature_is_array_mean() {
        let monitor = EnvironmentalMonitor::new(25);
        let inputs = SensorInputs {
            thermal: [10, 20, 30, 40],
            ..SensorInputs::NOMINAL
        };
        assert_eq!(monitor.measure(&inputs).temperature_c, 50);
    }

    #[test]
    fn test_supply_band_mapping() {
        let model = AveragingSensorModel;

        assert_eq!(model.voltage_cv(0), 150);
        assert_eq!(model.voltage_cv(60), 210);
        assert_eq!(model.voltage_cv(-40), 110);
        assert_eq!(model.voltage_cv(-500), 0);
    }

    #[test]
    fn test_custom_model() {
        struct Hot;
        impl SensorModel for Hot {
            fn temperature_offset(&self, _: &[i8; THERMAL_SENSORS]) -> i16 {
                90
            }
            fn voltage_cv(&self, _: i16) -> u16 {
                200
            }
        }

        let monitor = EnvironmentalMonitor::with_model(25, Box::new(Hot));
        let reading = monitor.measure(&SensorInputs::NOMINAL);
        assert_eq!(reading.temperature_c, 115);
        assert_eq!(reading.voltage_cv, 200);
    }
}
