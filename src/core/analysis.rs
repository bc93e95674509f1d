use crate::core::sql_queries::{
    GERMAN_GMAIL_USERS_PERCENTAGE_SQL, PEOPLE_OVER_60_SQL, ROW_COUNT_SQL,
    TOP_3_GMAIL_COUNTRIES_SQL, TOP_3_GMAIL_COUNTRIES_SQL_2,
};
use crate::core::table::AnonymizedTable;
use crate::domain::model::AnalysisReport;
use crate::utils::error::{EtlError, Result};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};
use serde_json::Value;

pub const DEFAULT_TABLE_NAME: &str = "df_anonymized_persons";

/// 分析查詢會用到的欄位；資料中沒有時以全 `null` 欄補上
pub const ANALYSIS_COLUMNS: [&str; 3] = ["address_country", "email_domain", "age_range"];

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(flag) => SqlValue::Integer(i64::from(*flag)),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => SqlValue::Integer(integer),
            None => number.as_f64().map_or(SqlValue::Null, SqlValue::Real),
        },
        Value::String(text) => SqlValue::Text(text.clone()),
        // 陣列（或殘留的物件）以 JSON 文字保存
        nested => SqlValue::Text(nested.to_string()),
    }
}

/// 以記憶體內 SQLite 作為查詢引擎
pub struct QueryEngine {
    conn: Connection,
    table_name: String,
}

impl QueryEngine {
    pub fn in_memory(table_name: &str) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn,
            table_name: table_name.to_string(),
        })
    }

    fn render(&self, sql: &str) -> String {
        sql.replace("{table}", &quote_identifier(&self.table_name))
    }

    /// 建立資料表並寫入所有列
    pub fn load(&self, table: &AnonymizedTable) -> Result<usize> {
        let mut table = table.clone();
        for column in ANALYSIS_COLUMNS {
            table.ensure_column(column);
        }

        let quoted_table = quote_identifier(&self.table_name);
        let column_list = table
            .column_names()
            .iter()
            .map(|name| quote_identifier(name))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=table.columns().len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");

        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS {quoted_table}; CREATE TABLE {quoted_table} ({column_list});"
        ))?;

        let tx = self.conn.unchecked_transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {quoted_table} ({column_list}) VALUES ({placeholders})"
            ))?;
            for row in 0..table.row_count() {
                let values = table.columns().iter().map(|column| to_sql_value(&column.values[row]));
                inserted += stmt.execute(params_from_iter(values))?;
            }
        }
        tx.commit()?;

        tracing::debug!(
            "Loaded {} rows x {} columns into '{}'",
            inserted,
            table.columns().len(),
            self.table_name
        );
        Ok(inserted)
    }

    pub fn row_count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row(&self.render(ROW_COUNT_SQL), [], |row| row.get(0))?;
        Ok(count)
    }

    /// 住在德國且使用 gmail 的比例（整數除法）
    pub fn german_gmail_users_percentage(&self) -> Result<i64> {
        if self.row_count()? == 0 {
            return Err(EtlError::EmptyDatasetError {
                table: self.table_name.clone(),
            });
        }

        let percentage = self.conn.query_row(
            &self.render(GERMAN_GMAIL_USERS_PERCENTAGE_SQL),
            [],
            |row| row.get(0),
        )?;
        Ok(percentage)
    }

    /// 以 `RANK()` 排名取前三名國家，同分者都會列出
    pub fn top_gmail_countries_ranked(&self) -> Result<Vec<(Option<String>, i64)>> {
        self.country_rows(TOP_3_GMAIL_COUNTRIES_SQL)
    }

    /// 依數量排序後嚴格取三筆
    pub fn top_gmail_countries_limited(&self) -> Result<Vec<(Option<String>, i64)>> {
        self.country_rows(TOP_3_GMAIL_COUNTRIES_SQL_2)
    }

    fn country_rows(&self, sql: &str) -> Result<Vec<(Option<String>, i64)>> {
        let mut stmt = self.conn.prepare(&self.render(sql))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn count_people_over_60(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row(&self.render(PEOPLE_OVER_60_SQL), [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn analyze(&self) -> Result<AnalysisReport> {
        let total_rows = usize::try_from(self.row_count()?).unwrap_or_default();
        tracing::info!("Total number of rows extracted from Faker API: {}", total_rows);

        let german_gmail_percentage = self.german_gmail_users_percentage()?;
        tracing::info!(
            "Percentage of users live in Germany and use Gmail = {}",
            german_gmail_percentage
        );

        let top_gmail_countries_ranked = self.top_gmail_countries_ranked()?;
        tracing::info!(
            "Top three countries with their rank (window function) that use Gmail: {:?}",
            top_gmail_countries_ranked
                .iter()
                .map(|(country, rank)| format!("{}. {}", rank, country.as_deref().unwrap_or("unknown")))
                .collect::<Vec<_>>()
        );

        let top_gmail_countries_limited = self.top_gmail_countries_limited()?;
        tracing::info!(
            "Top three countries (as per groupby method) that use Gmail: {:?}",
            top_gmail_countries_limited
                .iter()
                .map(|(country, _)| country.as_deref().unwrap_or("unknown"))
                .collect::<Vec<_>>()
        );

        let people_over_60 = self.count_people_over_60()?;
        tracing::info!("No. of people over 60 years = {}", people_over_60);

        Ok(AnalysisReport {
            total_rows,
            german_gmail_percentage,
            top_gmail_countries_ranked,
            top_gmail_countries_limited,
            people_over_60,
        })
    }
}
