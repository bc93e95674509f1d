use crate::domain::model::DateWindow;
use crate::utils::error::{EtlError, Result};
use chrono::{Days, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

// chrono 的 %Y 接受 1~4 位數年份，這裡要求嚴格四位數
static DATE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}$").expect("valid date regex"));

/// 解析 `YYYY-MM-DD` 日期字串
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let format_error = || EtlError::DateFormatError {
        value: value.to_string(),
        format: DATE_FORMAT.to_string(),
    };

    if !DATE_SHAPE.is_match(value) {
        return Err(format_error());
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| format_error())
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// 將 `[start, end]` 切成每段 `interval_days` 天的連續區間。
///
/// 每段的結束日為 `min(end, 段起始 + interval_days - 1)`；起始日等於 `today`
/// 的區間會被略過（當天資料尚未完整）。`start > end` 時回傳空序列。
pub fn generate_date_range(
    start: NaiveDate,
    end: NaiveDate,
    interval_days: u32,
    today: NaiveDate,
) -> Result<Vec<DateWindow>> {
    if interval_days == 0 {
        return Err(EtlError::InvalidConfigValueError {
            field: "date_interval".to_string(),
            value: interval_days.to_string(),
            reason: "Value must be at least 1".to_string(),
        });
    }

    let span = Days::new(u64::from(interval_days - 1));
    let step = Days::new(u64::from(interval_days));

    let mut windows = Vec::new();
    let mut cursor = start;
    while cursor <= end {
        let window_end = cursor.checked_add_days(span).map_or(end, |d| d.min(end));
        if cursor != today {
            windows.push(DateWindow::new(cursor, window_end));
        }

        cursor = match cursor.checked_add_days(step) {
            Some(next) => next,
            None => break,
        };
    }

    Ok(windows)
}

/// 字串版本；`end` 為 `None` 時以 `today` 作為結束日
pub fn date_range_from_str(
    start: &str,
    end: Option<&str>,
    interval_days: u32,
    today: NaiveDate,
) -> Result<Vec<DateWindow>> {
    let start = parse_date(start)?;
    let end = match end {
        Some(end) => parse_date(end)?,
        None => today,
    };
    generate_date_range(start, end, interval_days, today)
}
