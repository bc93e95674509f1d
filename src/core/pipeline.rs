use crate::config::EtlConfig;
use crate::core::anonymize::anonymize_records;
use crate::core::extract::extract_persons;
use crate::core::http::{HttpFetcher, HttpTransport, ReqwestTransport};
use crate::core::table::{AnonymizedTable, COLUMN_SEPARATOR};
use crate::core::{AnonymizedRecord, Pipeline, PersonRecord};
use crate::utils::error::Result;
use chrono::{Local, NaiveDate, Utc};

pub const EXTRACTED_TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Faker persons 的擷取、去識別化與攤平流程
pub struct PersonsPipeline<T: HttpTransport = ReqwestTransport> {
    config: EtlConfig,
    fetcher: HttpFetcher<T>,
    start_date: Option<String>,
    run_date: NaiveDate,
    extracted_ts_utc: String,
}

impl PersonsPipeline<ReqwestTransport> {
    pub fn new(config: EtlConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.request_timeout())?;
        let fetcher = HttpFetcher::new(transport, config.retry_policy(), config.rate_limit());
        Ok(Self::with_fetcher(config, fetcher))
    }
}

impl<T: HttpTransport> PersonsPipeline<T> {
    pub fn with_fetcher(config: EtlConfig, fetcher: HttpFetcher<T>) -> Self {
        Self {
            config,
            fetcher,
            start_date: None,
            run_date: Local::now().date_naive(),
            // 整批共用同一個擷取時間
            extracted_ts_utc: Utc::now().format(EXTRACTED_TS_FORMAT).to_string(),
        }
    }

    /// 覆寫配置中的起始日期
    pub fn with_start_date(mut self, start_date: Option<String>) -> Self {
        self.start_date = start_date;
        self
    }

    /// 固定「今天」，用於切分日期區間與計算年齡
    pub fn with_run_date(mut self, run_date: NaiveDate) -> Self {
        self.run_date = run_date;
        self
    }

    pub fn extracted_ts_utc(&self) -> &str {
        &self.extracted_ts_utc
    }
}

#[async_trait::async_trait]
impl<T: HttpTransport> Pipeline for PersonsPipeline<T> {
    async fn extract(&self) -> Result<Vec<PersonRecord>> {
        extract_persons(
            &self.config,
            &self.fetcher,
            self.start_date.as_deref(),
            self.run_date,
        )
        .await
    }

    async fn transform(&self, data: Vec<PersonRecord>) -> Result<Vec<AnonymizedRecord>> {
        tracing::info!("🔧 Anonymizing PII data of {} persons...", data.len());
        let anonymized = anonymize_records(data, &self.extracted_ts_utc, self.run_date)?;
        tracing::info!("✅ Anonymized {} persons", anonymized.len());
        Ok(anonymized)
    }

    async fn load(&self, records: Vec<AnonymizedRecord>) -> Result<AnonymizedTable> {
        let table = AnonymizedTable::from_records(&records, COLUMN_SEPARATOR);
        tracing::info!(
            "💾 Flattened {} persons into {} columns",
            table.row_count(),
            table.columns().len()
        );
        Ok(table)
    }
}
