//! ### Engine
//! The single capability the scenario runner needs from a dispatch solver.
//! Whether it runs in-process, in a subprocess or behind a service is the
//! implementation's business.

use thiserror::Error;

use crate::params::PlantParameters;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid parameter combination: {0}")]
    InvalidParameters(String),

    #[error("no feasible schedule: {0}")]
    Infeasible(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

pub trait DispatchEngine {
    /// Returns one dispatch value per entry of `prices`.
    fn dispatch(
        &self,
        prices: &[f64],
        params: &PlantParameters,
    ) -> Result<Vec<f64>, EngineError>;
}

impl<E: DispatchEngine + ?Sized> DispatchEngine for &E {
    fn dispatch(
        &self,
        prices: &[f64],
        params: &PlantParameters,
    ) -> Result<Vec<f64>, EngineError> {
        (**self).dispatch(prices, params)
    }
}

impl<E: DispatchEngine + ?Sized> DispatchEngine for Box<E> {
    fn dispatch(
        &self,
        prices: &[f64],
        params: &PlantParameters,
    ) -> Result<Vec<f64>, EngineError> {
        (**self).dispatch(prices, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thermal::ThermalPlant;
    use std::error::Error as _;
    use std::io;

    struct Subprocess;

    impl DispatchEngine for Subprocess {
        fn dispatch(
            &self,
            _prices: &[f64],
            _params: &PlantParameters,
        ) -> Result<Vec<f64>, EngineError> {
            let cause = io::Error::new(io::ErrorKind::BrokenPipe, "solver exited");
            Err(EngineError::from(Box::new(cause) as Box<dyn std::error::Error + Send + Sync>))
        }
    }

    #[test]
    fn boxed_engines_dispatch() {
        let engines: Vec<Box<dyn DispatchEngine>> =
            vec![Box::new(ThermalPlant::default()), Box::new(Subprocess)];
        let params = PlantParameters::reference_unit();

        assert_eq!(engines[0].dispatch(&[10., 20.], &params).unwrap(), vec![0., 0.]);
        let err = engines[1].dispatch(&[10.], &params).unwrap_err();
        assert_eq!(err.to_string(), "solver exited");
        assert!(matches!(err, EngineError::Other(_)));
    }

    #[test]
    fn cause_is_kept() {
        let err = Subprocess
            .dispatch(&[1.], &PlantParameters::reference_unit())
            .unwrap_err();
        let wrapped = crate::error::SimulationError::Engine(err);
        assert!(wrapped.source().is_some());
    }
}
