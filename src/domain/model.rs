use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 上游 API 回傳的原始人員資料（任意巢狀 JSON 物件）
pub type PersonRecord = serde_json::Map<String, serde_json::Value>;

/// 去識別化後的人員資料，結構與原始資料相同
pub type AnonymizedRecord = serde_json::Map<String, serde_json::Value>;

/// 一段閉區間日期 `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }
}

/// `/persons` 端點的回應外殼
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonsResponse {
    pub status: String,
    pub code: i64,
    #[serde(default)]
    pub data: Vec<PersonRecord>,
}

impl PersonsResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "OK" && self.code == 200
    }
}

/// 四項固定分析的結果
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub total_rows: usize,
    pub german_gmail_percentage: i64,
    /// `(country, rank)`，同分者共用名次
    pub top_gmail_countries_ranked: Vec<(Option<String>, i64)>,
    /// `(country, gmail_users_count)`，嚴格取前三筆
    pub top_gmail_countries_limited: Vec<(Option<String>, i64)>,
    pub people_over_60: i64,
}
