use anyhow::Context;
use clap::Parser;
use persons_etl::utils::error::ErrorSeverity;
use persons_etl::utils::{logger, validation::Validate};
use persons_etl::{CliArgs, EtlConfig, EtlEngine, PersonsPipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting persons-etl");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let config = EtlConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load config file '{}'", args.config))?;

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }
    tracing::debug!("Config: {:?}", config);

    let table_name = config.table_name().to_string();
    let pipeline = PersonsPipeline::new(config)?.with_start_date(args.start_date);
    let engine = EtlEngine::new(pipeline).with_table_name(&table_name);

    match engine.run().await {
        Ok(report) => {
            tracing::info!(
                "✅ ETL process completed successfully ({} rows analyzed)",
                report.total_rows
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2,   // 上游 API 失敗
                ErrorSeverity::High => 1,     // 配置或資料錯誤
                ErrorSeverity::Critical => 3, // 系統錯誤
            };
            std::process::exit(exit_code);
        }
    }
}
