//! ### Thermal
//! In-process unit commitment for a single thermal unit, solved by dynamic
//! programming over a discretised output grid.
//!
//! Each time step the unit is either off (output 0) or on at one of the grid
//! levels between `min_tech` and `capacity`. Transitions are constrained by:
//! - starting: the first output must not exceed `startup_ramp`, and the
//!   unit pays `startup_cost`;
//! - stopping: the last output must not exceed `shutdown_ramp`, and the
//!   unit pays `shutdown_cost`;
//! - running: output moves by at most `ramp_up` / `ramp_down` per step.
//!
//! Every step earns `(price - variable_cost) * output`. The unit starts off
//! and there is no terminal condition.

use tracing::debug;

use crate::engine::{DispatchEngine, EngineError};
use crate::params::PlantParameters;

const EPS: f64 = 1e-9;
const OFF: usize = 0;

#[derive(Debug, Clone, Copy)]
pub struct ThermalPlant {
    /// Spacing of the output grid, MW.
    pub resolution_mw: f64,
}

impl Default for ThermalPlant {
    fn default() -> Self {
        Self { resolution_mw: 0.1 }
    }
}

impl ThermalPlant {
    /// Upper bound on grid levels; the transition table is quadratic in it.
    pub const MAX_LEVELS: usize = 1000;

    pub fn new(resolution_mw: f64) -> Self {
        Self { resolution_mw }
    }

    /// Output of every state. Index 0 is the off state.
    fn states(&self, params: &PlantParameters) -> Result<Vec<f64>, EngineError> {
        if !(self.resolution_mw.is_finite() && self.resolution_mw > 0.) {
            return Err(EngineError::InvalidParameters(format!(
                "grid resolution must be positive, got {}",
                self.resolution_mw
            )));
        }
        let span = params.capacity - params.min_tech;
        if !(span.is_finite() && span >= 0.) || params.min_tech < 0. {
            return Err(EngineError::InvalidParameters(format!(
                "need 0 <= min_tech ({}) <= capacity ({})",
                params.min_tech, params.capacity
            )));
        }
        let steps = (span / self.resolution_mw + EPS).floor();
        if steps >= Self::MAX_LEVELS as f64 {
            return Err(EngineError::InvalidParameters(format!(
                "{steps} output levels at {} MW resolution, at most {} supported",
                self.resolution_mw,
                Self::MAX_LEVELS
            )));
        }

        let mut states = vec![0.];
        states.extend((0..=steps as usize).map(|k| params.min_tech + k as f64 * self.resolution_mw));
        if let Some(&last) = states.last() {
            if params.capacity - last > EPS {
                states.push(params.capacity);
            }
        }
        Ok(states)
    }

    /// `table[from * n + to]`: cost of moving between states, `-inf` if forbidden.
    fn transitions(states: &[f64], params: &PlantParameters) -> Vec<f64> {
        let n = states.len();
        let mut table = vec![f64::NEG_INFINITY; n * n];
        for (from, &q) in states.iter().enumerate() {
            for (to, &p) in states.iter().enumerate() {
                let reward = match (from, to) {
                    (OFF, OFF) => Some(0.),
                    (OFF, _) => (p <= params.startup_ramp + EPS).then_some(-params.startup_cost),
                    (_, OFF) => (q <= params.shutdown_ramp + EPS).then_some(-params.shutdown_cost),
                    _ => (p - q <= params.ramp_up + EPS && q - p <= params.ramp_down + EPS)
                        .then_some(0.),
                };
                if let Some(reward) = reward {
                    table[from * n + to] = reward;
                }
            }
        }
        table
    }
}

impl DispatchEngine for ThermalPlant {
    fn dispatch(
        &self,
        prices: &[f64],
        params: &PlantParameters,
    ) -> Result<Vec<f64>, EngineError> {
        if let Some((step, price)) = prices.iter().enumerate().find(|(_, p)| !p.is_finite()) {
            return Err(EngineError::InvalidParameters(format!(
                "price {price} at step {step} is not finite"
            )));
        }
        let states = self.states(params)?;
        let table = Self::transitions(&states, params);
        let n = states.len();
        debug!(states = n, steps = prices.len(), "solving unit commitment");

        let mut value = vec![f64::NEG_INFINITY; n];
        value[OFF] = 0.;
        let mut next = vec![f64::NEG_INFINITY; n];
        let mut parents = Vec::with_capacity(prices.len() * n);

        for &price in prices {
            let margin = price - params.variable_cost;
            for (to, slot) in next.iter_mut().enumerate() {
                let mut best = f64::NEG_INFINITY;
                let mut parent = OFF;
                for (from, &prev) in value.iter().enumerate() {
                    let cand = prev + table[from * n + to];
                    if cand > best {
                        best = cand;
                        parent = from;
                    }
                }
                *slot = best + margin * states[to];
                parents.push(parent as u32);
            }
            std::mem::swap(&mut value, &mut next);
        }

        let mut state = OFF;
        let mut best = f64::NEG_INFINITY;
        for (idx, &val) in value.iter().enumerate() {
            if val > best {
                best = val;
                state = idx;
            }
        }
        if !best.is_finite() && !prices.is_empty() {
            return Err(EngineError::Infeasible(format!(
                "best schedule value is {best}"
            )));
        }
        debug!(profit = best, "unit commitment solved");

        let mut dispatch = vec![0.; prices.len()];
        for step in (0..prices.len()).rev() {
            dispatch[step] = states[state];
            state = parents[step * n + state] as usize;
        }
        Ok(dispatch)
    }
}
