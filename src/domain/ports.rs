use crate::core::table::AnonymizedTable;
use crate::domain::model::{AnonymizedRecord, PersonRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn import_data_size(&self) -> u64;
    fn date_interval(&self) -> u32;
    fn start_date(&self) -> &str;

    fn persons_url(&self) -> String {
        format!("{}/persons", self.base_url().trim_end_matches('/'))
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<PersonRecord>>;
    async fn transform(&self, data: Vec<PersonRecord>) -> Result<Vec<AnonymizedRecord>>;
    async fn load(&self, records: Vec<AnonymizedRecord>) -> Result<AnonymizedTable>;
}
