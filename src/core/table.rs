use crate::domain::model::AnonymizedRecord;
use serde_json::Value;
use std::collections::HashMap;

pub const COLUMN_SEPARATOR: &str = "_";

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

/// 攤平後的欄式資料表。巢狀鍵以分隔符串接成欄名（如 `address_country`），
/// 陣列原樣保存在單一儲存格，缺少的鍵以 `null` 補齊。
#[derive(Debug, Clone, Default)]
pub struct AnonymizedTable {
    columns: Vec<Column>,
    index: HashMap<String, usize>,
    rows: usize,
}

impl AnonymizedTable {
    pub fn from_records(records: &[AnonymizedRecord], separator: &str) -> Self {
        let mut table = Self::default();

        for (row, record) in records.iter().enumerate() {
            table.flatten_into(None, record, row, separator);
            table.rows = row + 1;
            for column in &mut table.columns {
                column.values.resize(table.rows, Value::Null);
            }
        }

        table
    }

    fn flatten_into(
        &mut self,
        prefix: Option<&str>,
        record: &serde_json::Map<String, Value>,
        row: usize,
        separator: &str,
    ) {
        for (key, value) in record {
            let name = match prefix {
                Some(prefix) => format!("{}{}{}", prefix, separator, key),
                None => key.clone(),
            };

            match value {
                Value::Object(nested) => self.flatten_into(Some(&name), nested, row, separator),
                other => self.set_cell(name, row, other.clone()),
            }
        }
    }

    fn set_cell(&mut self, name: String, row: usize, value: Value) {
        let position = match self.index.get(&name) {
            Some(&position) => position,
            None => {
                let position = self.columns.len();
                self.columns.push(Column {
                    name: name.clone(),
                    values: vec![Value::Null; row],
                });
                self.index.insert(name, position);
                position
            }
        };

        // 不同巢狀路徑攤平後可能撞名，後寫入者覆蓋
        let values = &mut self.columns[position].values;
        if values.len() > row {
            values[row] = value;
        } else {
            values.push(value);
        }
    }

    /// 若欄位不存在則補上一整欄 `null`
    pub fn ensure_column(&mut self, name: &str) {
        if !self.index.contains_key(name) {
            self.index.insert(name.to_string(), self.columns.len());
            self.columns.push(Column {
                name: name.to_string(),
                values: vec![Value::Null; self.rows],
            });
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.index.get(name).map(|&position| &self.columns[position])
    }

    pub fn cell(&self, row: usize, name: &str) -> Option<&Value> {
        self.column(name).and_then(|column| column.values.get(row))
    }
}
