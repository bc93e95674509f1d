pub mod analysis;
pub mod anonymize;
pub mod date_range;
pub mod etl;
pub mod extract;
pub mod http;
pub mod pipeline;
pub mod sql_queries;
pub mod table;

pub use crate::domain::model::{AnonymizedRecord, PersonRecord};
pub use crate::domain::ports::{ConfigProvider, Pipeline};
pub use crate::utils::error::Result;
