pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{cli::CliArgs, EtlConfig};
pub use crate::core::{etl::EtlEngine, pipeline::PersonsPipeline};
pub use domain::model::AnalysisReport;
pub use utils::error::{EtlError, Result};
