pub mod config;
pub mod dataset;
pub mod error;
pub mod factor;
pub mod graph;
pub mod inference;
pub mod initialization;
pub mod model;
pub mod observation;
pub mod registry;

pub use config::{InitConfig, ModelConfig};
pub use error::{ModelErr, Result};
pub use model::{FactorGraphModel, PrimalConstraints, ResultSet};
