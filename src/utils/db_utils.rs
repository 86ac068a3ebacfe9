use actix_web::error::ErrorBadRequest;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::MySqlPool;
use std::str::FromStr;

/// SQL bindable value enum
#[derive(Debug)]
pub enum SqlValue {
    String(String),
    I64(i64),
    Decimal(Decimal),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Null,
}

#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Builds a dynamic UPDATE from a JSON payload. Column names come from the
/// payload keys, so every key must appear in `allowed_columns`; anything
/// else is rejected before it reaches the SQL string. Numeric JSON values
/// are bound as decimals so monetary columns never pass through a float.
pub fn build_update_sql(
    table: &str,
    payload: &Value,
    allowed_columns: &[&str],
    id_column: &str,
    id_value: u64,
) -> Result<SqlUpdate, actix_web::Error> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ErrorBadRequest("Payload must be a JSON object"))?;

    if obj.is_empty() {
        return Err(ErrorBadRequest("No fields provided for update"));
    }

    for key in obj.keys() {
        if !allowed_columns.contains(&key.as_str()) {
            return Err(ErrorBadRequest(format!("Unknown field: {}", key)));
        }
    }

    let set_clause = obj
        .keys()
        .map(|k| format!("{} = ?", k))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    let mut values = Vec::with_capacity(obj.len() + 1);

    for value in obj.values() {
        match value {
            Value::String(s) => {
                if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    values.push(SqlValue::Date(d));
                } else if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                    values.push(SqlValue::DateTime(dt));
                } else {
                    values.push(SqlValue::String(s.clone()));
                }
            }
            Value::Number(n) => {
                let d = Decimal::from_str(&n.to_string())
                    .map_err(|_| ErrorBadRequest("Unsupported numeric value"))?;
                values.push(SqlValue::Decimal(d));
            }
            Value::Bool(b) => values.push(SqlValue::Bool(*b)),
            Value::Null => values.push(SqlValue::Null),
            _ => return Err(ErrorBadRequest("Unsupported JSON value type")),
        }
    }

    values.push(SqlValue::I64(id_value as i64));

    Ok(SqlUpdate { sql, values })
}

pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::Decimal(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const COLUMNS: &[&str] = &["first_name", "salary", "hire_date"];

    #[test]
    fn builds_set_clause_from_payload_keys() {
        let payload = json!({ "first_name": "Ada", "salary": 75000.50 });
        let update = build_update_sql("employees", &payload, COLUMNS, "id", 3).unwrap();
        assert!(update.sql.starts_with("UPDATE employees SET "));
        assert!(update.sql.contains("first_name = ?"));
        assert!(update.sql.contains("salary = ?"));
        assert!(update.sql.ends_with("WHERE id = ?"));
        assert_eq!(update.values.len(), 3);
    }

    #[test]
    fn rejects_unknown_columns() {
        let payload = json!({ "salary = 0; DROP TABLE employees; --": 1 });
        assert!(build_update_sql("employees", &payload, COLUMNS, "id", 3).is_err());
    }

    #[test]
    fn rejects_empty_payload() {
        assert!(build_update_sql("employees", &json!({}), COLUMNS, "id", 3).is_err());
    }

    #[test]
    fn date_strings_bind_as_dates() {
        let payload = json!({ "hire_date": "2026-01-15" });
        let update = build_update_sql("employees", &payload, COLUMNS, "id", 3).unwrap();
        assert!(matches!(update.values[0], SqlValue::Date(_)));
    }

    #[test]
    fn numbers_bind_as_decimals() {
        let payload = json!({ "salary": 90000 });
        let update = build_update_sql("employees", &payload, COLUMNS, "id", 3).unwrap();
        assert!(matches!(update.values[0], SqlValue::Decimal(_)));
    }
}
