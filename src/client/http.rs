//! Shared header and response-body utilities.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

use crate::error::Result;

/// Build default headers for a JSON API, attaching a bearer credential when
/// an access token is present.
pub fn bearer_headers(access: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(access) = access {
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {access}")) {
            headers.insert(AUTHORIZATION, value);
        }
    }
    headers
}

/// Read a response into status + body, parsing JSON and falling back to the
/// raw text for non-JSON payloads.
pub(crate) async fn json_body(response: reqwest::Response) -> Result<(u16, Value)> {
    let status = response.status().as_u16();
    let text = response.text().await?;
    let body = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    };
    Ok((status, body))
}
