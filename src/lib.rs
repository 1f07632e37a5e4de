pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod graph;
pub mod market;
pub mod params;
pub mod scenario;
pub mod series;
pub mod table;
pub mod thermal;

pub use engine::{DispatchEngine, EngineError};
pub use error::{Error, Result, SimulationError};
pub use params::PlantParameters;
pub use scenario::{compare_scenarios, run_scenario, ScenarioResult, ScenarioRunner, ScenarioSet};
pub use series::{PricePoint, PriceSeries};
pub use table::ScenarioTable;
