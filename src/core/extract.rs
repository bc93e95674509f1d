use crate::core::date_range::{date_range_from_str, format_date};
use crate::core::http::{HttpFetcher, HttpRequest, HttpTransport};
use crate::core::ConfigProvider;
use crate::domain::model::{PersonRecord, PersonsResponse};
use crate::utils::error::{EtlError, Result};
use chrono::NaiveDate;

/// 每個日期區間要請求的筆數。
///
/// 以整數除法平均分配，餘數直接捨去，最後一個區間不會補上。
pub fn per_window_quantity(import_data_size: u64, window_count: usize) -> u64 {
    import_data_size / window_count.max(1) as u64
}

/// 依生日區間逐段呼叫 `/persons`，把所有結果依序串接。
///
/// API 本身不支援分頁，只能用 `_birthday_start` / `_birthday_end` 切段。
/// 任一區間失敗即中止整次擷取。
pub async fn extract_persons<C: ConfigProvider, T: HttpTransport>(
    config: &C,
    fetcher: &HttpFetcher<T>,
    start_date: Option<&str>,
    today: NaiveDate,
) -> Result<Vec<PersonRecord>> {
    tracing::info!("🚀 Extracting data from Faker Persons API...");

    let start_date = start_date.unwrap_or(config.start_date());
    let windows = date_range_from_str(start_date, None, config.date_interval(), today)?;
    let quantity = per_window_quantity(config.import_data_size(), windows.len());
    let url = config.persons_url();

    tracing::info!(
        "📋 {} date windows from {}, {} persons per window",
        windows.len(),
        start_date,
        quantity
    );

    let mut persons = Vec::new();
    for window in &windows {
        let request = HttpRequest::get(url.as_str())
            .with_param("_quantity", quantity.to_string())
            .with_param("_birthday_start", format_date(window.start))
            .with_param("_birthday_end", format_date(window.end));

        let body = fetcher.fetch(&request).await?;
        let response: PersonsResponse =
            serde_json::from_value(body).map_err(|e| EtlError::FatalExtractionError {
                url: url.clone(),
                message: format!("unexpected response shape: {}", e),
                source: None,
            })?;

        if !response.is_ok() {
            return Err(EtlError::FatalExtractionError {
                url: url.clone(),
                message: format!(
                    "upstream reported status={} code={} for {}..{}",
                    response.status,
                    response.code,
                    format_date(window.start),
                    format_date(window.end)
                ),
                source: None,
            });
        }

        tracing::debug!(
            "Window {}..{} returned {} persons",
            format_date(window.start),
            format_date(window.end),
            response.data.len()
        );
        persons.extend(response.data);
    }

    tracing::info!("📊 Extracted {} persons", persons.len());
    Ok(persons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::http::{ReqwestTransport, RetryPolicy};
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    struct MockConfig {
        base_url: String,
        import_data_size: u64,
        date_interval: u32,
        start_date: String,
    }

    impl MockConfig {
        fn new(base_url: String) -> Self {
            Self {
                base_url,
                import_data_size: 10,
                date_interval: 365,
                start_date: "2024-10-16".to_string(),
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn base_url(&self) -> &str {
            &self.base_url
        }

        fn import_data_size(&self) -> u64 {
            self.import_data_size
        }

        fn date_interval(&self) -> u32 {
            self.date_interval
        }

        fn start_date(&self) -> &str {
            &self.start_date
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(
            ReqwestTransport::new(Duration::from_secs(30)).unwrap(),
            RetryPolicy {
                max_retries: 3,
                delay: Duration::ZERO,
            },
            Duration::ZERO,
        )
    }

    #[test]
    fn test_per_window_quantity_drops_remainder() {
        assert_eq!(per_window_quantity(30000, 127), 236);
        assert_eq!(per_window_quantity(10, 3), 3);
        assert_eq!(per_window_quantity(10, 1), 10);
        assert_eq!(per_window_quantity(10, 0), 10);
    }

    #[tokio::test]
    async fn test_extract_concatenates_windows_in_order() {
        let server = MockServer::start_async().await;

        let first = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/persons")
                    .query_param("_quantity", "5")
                    .query_param("_birthday_start", "2024-10-16")
                    .query_param("_birthday_end", "2025-10-15");
                then.status(200).json_body(json!({
                    "status": "OK",
                    "code": 200,
                    "data": [{"id": 1}, {"id": 2}]
                }));
            })
            .await;
        let second = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/persons")
                    .query_param("_quantity", "5")
                    .query_param("_birthday_start", "2025-10-16")
                    .query_param("_birthday_end", "2026-10-15");
                then.status(200).json_body(json!({
                    "status": "OK",
                    "code": 200,
                    "data": [{"id": 3}]
                }));
            })
            .await;

        let config = MockConfig::new(server.url(""));
        let persons = extract_persons(&config, &fetcher(), None, today()).await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
        let ids: Vec<i64> = persons.iter().map(|p| p["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_start_date_override() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/persons")
                    .query_param("_quantity", "10")
                    .query_param("_birthday_start", "2026-01-01")
                    .query_param("_birthday_end", "2026-10-16");
                then.status(200)
                    .json_body(json!({"status": "OK", "code": 200, "data": [{"id": 7}]}));
            })
            .await;

        let config = MockConfig::new(server.url("/"));
        let persons = extract_persons(&config, &fetcher(), Some("2026-01-01"), today())
            .await
            .unwrap();

        api_mock.assert_async().await;
        assert_eq!(persons.len(), 1);
    }

    #[tokio::test]
    async fn test_logical_error_status_aborts_extraction() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/persons");
                then.status(200)
                    .json_body(json!({"status": "ERROR", "code": 400, "data": []}));
            })
            .await;

        let config = MockConfig::new(server.url(""));
        let err = extract_persons(&config, &fetcher(), None, today())
            .await
            .unwrap_err();

        // 第一個區間就失敗，不會再請求第二個
        api_mock.assert_hits_async(1).await;
        assert!(matches!(err, EtlError::FatalExtractionError { .. }));
        assert!(err.to_string().contains("status=ERROR code=400"));
    }

    #[tokio::test]
    async fn test_exhausted_retries_abort_extraction() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/persons");
                then.status(503).body("maintenance");
            })
            .await;

        let config = MockConfig::new(server.url(""));
        let err = extract_persons(&config, &fetcher(), None, today())
            .await
            .unwrap_err();

        api_mock.assert_hits_async(4).await;
        assert!(matches!(err, EtlError::FatalExtractionError { source: Some(_), .. }));
    }

    #[tokio::test]
    async fn test_invalid_start_date() {
        let config = MockConfig::new("http://localhost:1".to_string());
        let err = extract_persons(&config, &fetcher(), Some("25-03-31"), today())
            .await
            .unwrap_err();
        assert!(matches!(err, EtlError::DateFormatError { .. }));
    }
}
