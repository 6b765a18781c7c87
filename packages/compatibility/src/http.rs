//! Hosted compatibility oracle client.
//!
//! `POST {base_url}/check-group` with `{"fish_names": [...]}`. The
//! service answers with either a bare array of judgments or a
//! `{"results": [...]}` envelope. Each judgment names its pair as
//! `pair: [a, b]` or as `fish1`/`fish2`, and `reasons`/`conditions` may
//! be a single string or a list.

use aquastock_compatibility_models::PairJudgment;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::{CompatibilityError, PairwiseCompatibilityOracle};

/// Maximum length of the response body kept in status errors.
const BODY_PREVIEW_LEN: usize = 300;

#[derive(Serialize)]
struct CheckGroupRequest<'a> {
    fish_names: &'a [String],
}

/// Compatibility oracle reached over HTTP.
pub struct HttpOracle {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpOracle {
    /// Creates a new client.
    #[must_use]
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/check-group", self.base_url)
    }
}

#[async_trait]
impl PairwiseCompatibilityOracle for HttpOracle {
    async fn check_group(
        &self,
        expanded_names: &[String],
    ) -> Result<Vec<PairJudgment>, CompatibilityError> {
        let mut req = self
            .client
            .post(self.endpoint())
            .header("content-type", "application/json")
            .json(&CheckGroupRequest {
                fish_names: expanded_names,
            });

        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let preview = if body.len() > BODY_PREVIEW_LEN {
                format!("{}...", body.chars().take(BODY_PREVIEW_LEN).collect::<String>())
            } else {
                body
            };
            return Err(CompatibilityError::Status {
                status: status.as_u16(),
                body: preview,
            });
        }

        let value: Value = serde_json::from_str(&body)?;
        parse_judgments(value)
    }
}

/// Reads a list of judgments from an oracle response body.
///
/// # Errors
///
/// Returns [`CompatibilityError::MalformedResponse`] if the body is not
/// a judgment list or any judgment lacks a pair or a label.
pub fn parse_judgments(value: Value) -> Result<Vec<PairJudgment>, CompatibilityError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(CompatibilityError::MalformedResponse {
                    message: "expected a judgment array or a \"results\" array".to_string(),
                });
            }
        },
        other => {
            return Err(CompatibilityError::MalformedResponse {
                message: format!("expected a judgment array, got {other}"),
            });
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| parse_judgment(idx, item))
        .collect()
}

fn parse_judgment(idx: usize, item: &Value) -> Result<PairJudgment, CompatibilityError> {
    let malformed = |what: &str| CompatibilityError::MalformedResponse {
        message: format!("judgment {idx}: {what}"),
    };

    let pair = read_pair(item).ok_or_else(|| malformed("missing pair"))?;
    let compatibility = item
        .get("compatibility")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("missing compatibility label"))?
        .to_string();

    Ok(PairJudgment {
        pair,
        compatibility,
        reasons: string_list(item.get("reasons")),
        conditions: string_list(item.get("conditions")),
    })
}

fn read_pair(item: &Value) -> Option<[String; 2]> {
    let name = |v: &Value| v.as_str().map(str::trim).filter(|s| !s.is_empty()).map(String::from);

    if let Some(names) = item.get("pair").and_then(Value::as_array) {
        if let [a, b, ..] = names.as_slice() {
            return Some([name(a)?, name(b)?]);
        }
        return None;
    }

    Some([name(item.get("fish1")?)?, name(item.get("fish2")?)?])
}

/// A single string or a list of strings. Anything else reads as empty.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}
