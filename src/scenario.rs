//! ### Scenario
//! Runs dispatch scenarios against a shared price series and lines the
//! results up in a [`ScenarioTable`].
//!
//! Scenarios run one after another in the order they were declared. The
//! first failure aborts the whole comparison and no table is produced.

use serde::Deserialize;
use std::path::Path;
use tracing::{error, info, instrument};

use crate::engine::DispatchEngine;
use crate::error::{Error, Result, SimulationError};
use crate::params::PlantParameters;
use crate::series::PriceSeries;
use crate::table::ScenarioTable;

/// Dispatch values, one per time step of the input prices.
pub type ScenarioResult = Vec<f64>;

/// Named parameter sets with unique names, kept in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScenarioSet {
    entries: Vec<(String, PlantParameters)>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioFile {
    scenario: Vec<toml::Table>,
}

impl ScenarioSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, params: PlantParameters) -> Result<()> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(Error::invalid(format!("scenario {name:?} declared twice")));
        }
        self.entries.push((name, params));
        Ok(())
    }

    /// Fails on the first repeated name.
    pub fn from_pairs<N: Into<String>>(
        pairs: impl IntoIterator<Item = (N, PlantParameters)>,
    ) -> Result<Self> {
        let mut set = Self::new();
        for (name, params) in pairs {
            set.insert(name, params)?;
        }
        Ok(set)
    }

    pub fn get(&self, name: &str) -> Option<&PlantParameters> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, params)| params)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PlantParameters)> {
        self.entries.iter().map(|(name, params)| (name.as_str(), params))
    }

    /// Parses `[[scenario]]` tables, each a `name` plus every plant parameter.
    pub fn from_toml(text: &str) -> Result<Self> {
        let file: ScenarioFile = toml::from_str(text)
            .map_err(|e| Error::invalid(format!("scenario file: {e}")))?;
        let mut set = Self::new();
        for (idx, mut table) in file.scenario.into_iter().enumerate() {
            let name = match table.remove("name") {
                Some(toml::Value::String(name)) => name,
                _ => return Err(Error::invalid(format!("scenario #{} has no name", idx + 1))),
            };
            let params: PlantParameters = toml::Value::Table(table)
                .try_into()
                .map_err(|e| Error::invalid(format!("scenario {name:?}: {e}")))?;
            set.insert(name, params)?;
        }
        if set.is_empty() {
            return Err(Error::invalid("scenario file declares no scenarios"));
        }
        Ok(set)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    /// The three runs of the thermal-plant post: the reference unit, a lower
    /// minimum output, and much faster ramping.
    pub fn builtin() -> Self {
        let base = PlantParameters::reference_unit();
        Self {
            entries: vec![
                ("base".to_string(), base),
                (
                    "low_min_tech".to_string(),
                    PlantParameters {
                        min_tech: 2.,
                        ..base
                    },
                ),
                (
                    "fast_ramping".to_string(),
                    PlantParameters {
                        ramp_up: 2.,
                        ramp_down: 2.,
                        ..base
                    },
                ),
            ],
        }
    }
}

pub fn run_scenario(
    engine: &impl DispatchEngine,
    prices: &PriceSeries,
    params: &PlantParameters,
) -> Result<ScenarioResult> {
    if prices.is_empty() {
        return Err(Error::invalid("price series is empty"));
    }
    params.validate()?;

    let values = prices.values();
    let dispatch = engine
        .dispatch(&values, params)
        .map_err(SimulationError::Engine)?;

    if dispatch.len() != values.len() {
        return Err(SimulationError::LengthMismatch {
            expected: values.len(),
            actual: dispatch.len(),
        }
        .into());
    }
    if let Some((step, &value)) = dispatch.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(SimulationError::NonFinite { step, value }.into());
    }
    Ok(dispatch)
}

#[instrument(skip_all, fields(steps = prices.len(), scenarios = scenarios.len()))]
pub fn compare_scenarios(
    engine: &impl DispatchEngine,
    prices: &PriceSeries,
    scenarios: &ScenarioSet,
) -> Result<ScenarioTable> {
    if scenarios.is_empty() {
        return Err(Error::invalid("no scenarios given"));
    }

    let mut table = ScenarioTable::new(prices);
    for (name, params) in scenarios.iter() {
        info!(scenario = name, "running scenario");
        let result = run_scenario(engine, prices, params).inspect_err(|e| {
            error!(scenario = name, "scenario failed: {e}");
        })?;
        let dispatched: f64 = result.iter().sum();
        info!(scenario = name, dispatched, "scenario finished");
        table.push_column(name, result)?;
    }
    Ok(table)
}

/// Holds one engine for a run of `run` / `compare` calls.
pub struct ScenarioRunner<E> {
    engine: E,
}

impl<E: DispatchEngine> ScenarioRunner<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn run(&self, prices: &PriceSeries, params: &PlantParameters) -> Result<ScenarioResult> {
        run_scenario(&self.engine, prices, params)
    }

    pub fn compare(&self, prices: &PriceSeries, scenarios: &ScenarioSet) -> Result<ScenarioTable> {
        compare_scenarios(&self.engine, prices, scenarios)
    }
}
