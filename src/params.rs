//! ### Params
//! Operating parameters of a single thermal unit, one set per scenario.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Ramp rates are MW per sampling interval of the price series they are run
/// against. Nothing checks that the two agree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlantParameters {
    /// Maximum output, MW.
    pub capacity: f64,
    /// Cost per MW of output per time step.
    pub variable_cost: f64,
    pub startup_cost: f64,
    pub shutdown_cost: f64,
    /// Minimum stable output while running, MW.
    pub min_tech: f64,
    pub ramp_up: f64,
    pub ramp_down: f64,
    /// Highest output reachable in the step the unit starts.
    pub startup_ramp: f64,
    /// Highest output the unit may leave from in the step it stops.
    pub shutdown_ramp: f64,
}

impl PlantParameters {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("capacity", self.capacity),
            ("variable_cost", self.variable_cost),
            ("startup_cost", self.startup_cost),
            ("shutdown_cost", self.shutdown_cost),
            ("min_tech", self.min_tech),
            ("ramp_up", self.ramp_up),
            ("ramp_down", self.ramp_down),
            ("startup_ramp", self.startup_ramp),
            ("shutdown_ramp", self.shutdown_ramp),
        ];
        if let Some((name, val)) = fields.iter().find(|(_, val)| !val.is_finite()) {
            return Err(Error::invalid(format!("{name} is not a finite number: {val}")));
        }
        if self.capacity <= 0. {
            return Err(Error::invalid(format!(
                "capacity must be positive, got {}",
                self.capacity
            )));
        }
        if let Some((name, val)) = fields[1..].iter().find(|(_, val)| *val < 0.) {
            return Err(Error::invalid(format!("{name} must not be negative, got {val}")));
        }
        if self.min_tech > self.capacity {
            return Err(Error::invalid(format!(
                "min_tech {} exceeds capacity {}",
                self.min_tech, self.capacity
            )));
        }
        Ok(())
    }

    /// The unit from the thermal-plant post: 10 MW, 90/MWh, 3 MW minimum.
    pub fn reference_unit() -> Self {
        Self {
            capacity: 10.,
            variable_cost: 90.,
            startup_cost: 4000.,
            shutdown_cost: 3000.,
            min_tech: 3.,
            ramp_up: 0.3,
            ramp_down: 0.4,
            startup_ramp: 3.3,
            shutdown_ramp: 3.4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_unit_is_valid() {
        assert!(PlantParameters::reference_unit().validate().is_ok());
    }

    #[test]
    fn rejects_zero_capacity() {
        let params = PlantParameters {
            capacity: 0.,
            min_tech: 0.,
            ..PlantParameters::reference_unit()
        };
        let err = params.validate().unwrap_err();
        assert!(matches!(err, Error::InputValidation(msg) if msg.contains("capacity")));
    }

    #[test]
    fn rejects_negative_costs_and_ramps() {
        let params = PlantParameters {
            startup_cost: -1.,
            ..PlantParameters::reference_unit()
        };
        assert!(params.validate().is_err());

        let params = PlantParameters {
            ramp_down: -0.1,
            ..PlantParameters::reference_unit()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn rejects_negative_variable_cost() {
        let params = PlantParameters {
            variable_cost: -5.,
            ..PlantParameters::reference_unit()
        };
        let err = params.validate().unwrap_err();
        assert!(matches!(err, Error::InputValidation(msg) if msg.contains("variable_cost")));
    }

    #[test]
    fn rejects_min_tech_above_capacity() {
        let params = PlantParameters {
            min_tech: 11.,
            ..PlantParameters::reference_unit()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn rejects_nan() {
        let params = PlantParameters {
            ramp_up: f64::NAN,
            ..PlantParameters::reference_unit()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn missing_field_fails_to_parse() {
        let res: std::result::Result<PlantParameters, _> = toml::from_str(
            "capacity = 10\nvariable_cost = 90\nstartup_cost = 4000\nshutdown_cost = 3000\n",
        );
        assert!(res.is_err());
    }
}
