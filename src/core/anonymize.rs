use crate::core::date_range::parse_date;
use crate::domain::model::{AnonymizedRecord, PersonRecord};
use crate::utils::error::{EtlError, Result};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

pub const REDACTION_MARKER: &str = "****";

pub const PII_FIELDS: [&str; 9] = [
    "firstname",
    "lastname",
    "phone",
    "street",
    "streetName",
    "buildingNumber",
    "zipcode",
    "latitude",
    "longitude",
];

pub const EXTRACTED_TS_FIELD: &str = "extracted_ts_utc";

static EMAIL_LOCAL_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(".*@").expect("valid email regex"));

/// 依出生日期計算十年級距，例如 25 歲 -> `[21-30]`、30 歲 -> `[21-30]`。
/// 未滿一歲歸在 `[01-10]`。
pub fn get_age_range(dob: &str, today: NaiveDate) -> Result<String> {
    let birth = parse_date(dob)?;

    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    if age < 0 {
        return Err(EtlError::FutureDateError {
            dob: dob.to_string(),
        });
    }

    let decade = age / 10;
    let age_range = if age == 0 {
        "[01-10]".to_string()
    } else if age % 10 == 0 {
        format!("[{}1-{}0]", decade - 1, decade)
    } else {
        format!("[{}1-{}0]", decade, decade + 1)
    };

    Ok(age_range)
}

/// 去掉 `@` 之前（含）的所有字元；貪婪比對，含多個 `@` 時只保留最後一段
pub fn email_domain(email: &str) -> String {
    EMAIL_LOCAL_PART.replace_all(email, "").trim().to_string()
}

/// 對單筆人員資料套用去識別化規則，並遞迴處理巢狀物件
pub fn anonymize_pii(person: &PersonRecord, today: NaiveDate) -> Result<AnonymizedRecord> {
    let mut anonymized = AnonymizedRecord::new();

    for (key, value) in person {
        match value {
            Value::Object(nested) => {
                anonymized.insert(key.clone(), Value::Object(anonymize_pii(nested, today)?));
            }
            _ if PII_FIELDS.contains(&key.as_str()) => {
                anonymized.insert(key.clone(), Value::String(REDACTION_MARKER.to_string()));
            }
            _ if key == "email" => {
                let domain = match value {
                    Value::String(email) => Value::String(email_domain(email)),
                    Value::Null => Value::Null,
                    other => {
                        return Err(EtlError::ProcessingError {
                            message: format!("email must be a string, got {}", other),
                        })
                    }
                };
                anonymized.insert("email_domain".to_string(), domain);
            }
            _ if key == "birthday" => {
                let age_range = match value {
                    Value::String(dob) => Value::String(get_age_range(dob, today)?),
                    Value::Null => Value::Null,
                    other => {
                        return Err(EtlError::DateFormatError {
                            value: other.to_string(),
                            format: crate::core::date_range::DATE_FORMAT.to_string(),
                        })
                    }
                };
                anonymized.insert("age_range".to_string(), age_range);
            }
            Value::Array(items) => {
                anonymized.insert(key.clone(), Value::Array(anonymize_items(items, today)?));
            }
            _ => {
                anonymized.insert(key.clone(), value.clone());
            }
        }
    }

    Ok(anonymized)
}

// 陣列中的物件同樣套用規則，純量原樣保留
fn anonymize_items(items: &[Value], today: NaiveDate) -> Result<Vec<Value>> {
    items
        .iter()
        .map(|item| match item {
            Value::Object(nested) => Ok(Value::Object(anonymize_pii(nested, today)?)),
            Value::Array(inner) => Ok(Value::Array(anonymize_items(inner, today)?)),
            other => Ok(other.clone()),
        })
        .collect()
}

/// 批次去識別化，並在每筆最上層加上擷取時間
pub fn anonymize_records(
    persons: Vec<PersonRecord>,
    extracted_ts_utc: &str,
    today: NaiveDate,
) -> Result<Vec<AnonymizedRecord>> {
    persons
        .iter()
        .map(|person| {
            let mut anonymized = anonymize_pii(person, today)?;
            anonymized.insert(
                EXTRACTED_TS_FIELD.to_string(),
                Value::String(extracted_ts_utc.to_string()),
            );
            Ok(anonymized)
        })
        .collect()
}
