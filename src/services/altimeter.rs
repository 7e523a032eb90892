//! Barometric altitude from pressure samples
//!
//! International barometric formula against a configurable sea-level
//! reference pressure. Stateless apart from the last reading; a device
//! without a pressure sensor simply never produces samples.

/// Exponent and scale of the international barometric formula
const BAROMETRIC_SCALE_M: f64 = 44_330.0;
const BAROMETRIC_EXPONENT: f64 = 1.0 / 5.255;

/// One altitude estimate derived from a pressure sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AltitudeReading {
    pub altitude_m: f64,
    pub pressure_hpa: f64,
}

/// Converts pressure samples to altitude estimates
pub struct Altimeter {
    sea_level_hpa: f64,
    last: Option<AltitudeReading>,
}

impl Altimeter {
    pub fn new(sea_level_hpa: f64) -> Self {
        Self { sea_level_hpa, last: None }
    }

    /// Feed a pressure sample; non-positive pressure is rejected as
    /// degenerate and the previous reading persists
    pub fn update(&mut self, pressure_hpa: f64) -> Option<AltitudeReading> {
        if !(pressure_hpa > 0.0) {
            return None;
        }
        let altitude_m = BAROMETRIC_SCALE_M
            * (1.0 - (pressure_hpa / self.sea_level_hpa).powf(BAROMETRIC_EXPONENT));
        let reading = AltitudeReading { altitude_m, pressure_hpa };
        self.last = Some(reading);
        Some(reading)
    }

    pub fn last(&self) -> Option<AltitudeReading> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEA_LEVEL_HPA: f64 = 1013.25;

    #[test]
    fn test_sea_level_pressure_is_zero_altitude() {
        let mut altimeter = Altimeter::new(SEA_LEVEL_HPA);
        let reading = altimeter.update(SEA_LEVEL_HPA).unwrap();
        assert!(reading.altitude_m.abs() < 1e-9);
    }

    #[test]
    fn test_lower_pressure_is_positive_altitude() {
        let mut altimeter = Altimeter::new(SEA_LEVEL_HPA);
        // Roughly the pressure at 500 m
        let reading = altimeter.update(954.6).unwrap();
        assert!(reading.altitude_m > 450.0 && reading.altitude_m < 550.0, "got {}", reading.altitude_m);
    }

    #[test]
    fn test_higher_pressure_is_negative_altitude() {
        let mut altimeter = Altimeter::new(SEA_LEVEL_HPA);
        let reading = altimeter.update(1030.0).unwrap();
        assert!(reading.altitude_m < 0.0);
    }

    #[test]
    fn test_degenerate_pressure_retains_last_reading() {
        let mut altimeter = Altimeter::new(SEA_LEVEL_HPA);
        let first = altimeter.update(1000.0).unwrap();
        assert!(altimeter.update(0.0).is_none());
        assert!(altimeter.update(-5.0).is_none());
        assert_eq!(altimeter.last(), Some(first));
    }
}
