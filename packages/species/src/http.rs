//! Hosted species catalog client.
//!
//! Talks to a `PostgREST`-style backend: rows live in a table exposed at
//! `{base_url}/rest/v1/{table}` and are filtered with
//! `common_name=ilike.{name}`, which is already case-insensitive.

use async_trait::async_trait;
use serde_json::Value;

use crate::{SpeciesDataSource, SpeciesError};

/// Maximum length of the response body kept in status errors.
const BODY_PREVIEW_LEN: usize = 300;

/// Species catalog backed by a hosted REST table.
pub struct HttpSpeciesSource {
    base_url: String,
    table: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpSpeciesSource {
    /// Creates a new client.
    #[must_use]
    pub fn new(base_url: String, table: String, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            table,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }
}

#[async_trait]
impl SpeciesDataSource for HttpSpeciesSource {
    async fn fetch(&self, common_name: &str) -> Result<Option<Value>, SpeciesError> {
        let filter = format!("ilike.{}", common_name.trim());
        let mut req = self.client.get(self.table_url()).query(&[
            ("select", "*"),
            ("common_name", filter.as_str()),
            ("limit", "1"),
        ]);

        if let Some(key) = &self.api_key {
            req = req.header("apikey", key).bearer_auth(key);
        }

        let resp = req.send().await?;
        let status = resp.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = resp.text().await?;

        if !status.is_success() {
            let preview = if body.len() > BODY_PREVIEW_LEN {
                format!("{}...", body.chars().take(BODY_PREVIEW_LEN).collect::<String>())
            } else {
                body
            };
            return Err(SpeciesError::Status {
                status: status.as_u16(),
                body: preview,
            });
        }

        let value: Value = serde_json::from_str(&body)?;
        Ok(first_record(value))
    }
}

/// Picks the first record out of a backend response.
///
/// Accepts a bare array of rows, a `{"data": ...}` envelope, or a single
/// row object. Returns `None` for empty arrays and `null`.
#[must_use]
pub fn first_record(value: Value) -> Option<Value> {
    match value {
        Value::Array(rows) => rows.into_iter().find(Value::is_object),
        Value::Object(mut map) => match map.remove("data") {
            Some(inner) => first_record(inner),
            None => Some(Value::Object(map)),
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn picks_first_row_of_array() {
        let rows = json!([{ "common_name": "Guppy" }, { "common_name": "Molly" }]);
        assert_eq!(
            first_record(rows),
            Some(json!({ "common_name": "Guppy" }))
        );
    }

    #[test]
    fn empty_array_is_not_found() {
        assert_eq!(first_record(json!([])), None);
        assert_eq!(first_record(json!(null)), None);
    }

    #[test]
    fn unwraps_data_envelope() {
        let body = json!({ "data": [{ "common_name": "Betta" }] });
        assert_eq!(first_record(body), Some(json!({ "common_name": "Betta" })));
    }

    #[test]
    fn single_object_is_a_record() {
        let body = json!({ "common_name": "Betta", "max_size": 7 });
        assert_eq!(first_record(body.clone()), Some(body));
    }

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let source = HttpSpeciesSource::new(
            "https://example.test/".to_string(),
            "fish_species".to_string(),
            None,
        );
        assert_eq!(
            source.table_url(),
            "https://example.test/rest/v1/fish_species"
        );
    }
}
