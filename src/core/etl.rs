use crate::core::analysis::{QueryEngine, DEFAULT_TABLE_NAME};
use crate::core::Pipeline;
use crate::domain::model::AnalysisReport;
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    table_name: String,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            table_name: DEFAULT_TABLE_NAME.to_string(),
        }
    }

    pub fn with_table_name(mut self, table_name: &str) -> Self {
        self.table_name = table_name.to_string();
        self
    }

    /// 執行一次完整流程；任何錯誤都會記錄後往上拋，不保留部分結果
    pub async fn run(&self) -> Result<AnalysisReport> {
        let started = Instant::now();
        tracing::info!("Starting ETL process...");

        let report = self.run_phases().await.inspect_err(|e| {
            tracing::error!("Unable to run the ETL pipeline because of Error: {}", e);
        })?;

        tracing::info!("✅ ETL process finished in {:?}", started.elapsed());
        Ok(report)
    }

    async fn run_phases(&self) -> Result<AnalysisReport> {
        // Extract
        let raw_data = self.pipeline.extract().await?;
        tracing::info!("Extracted {} records", raw_data.len());

        // Transform
        let anonymized = self.pipeline.transform(raw_data).await?;

        // Load
        let table = self.pipeline.load(anonymized).await?;

        // Analyze
        let engine = QueryEngine::in_memory(&self.table_name)?;
        engine.load(&table)?;
        engine.analyze()
    }
}
