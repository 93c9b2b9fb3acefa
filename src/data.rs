use crate::error::{Error, Result, EMPTY_RESPONSE};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A response exactly as the API returned it. Non-2xx statuses are data, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl ApiResponse {
    pub(crate) fn read(response: reqwest::blocking::Response) -> Result<Self> {
        let status = response.status().as_u16();
        let headers = extract_headers(response.headers());
        let body = response.text()?;

        Ok(Self {
            status,
            headers,
            body,
        })
    }

    /// Parse the body as JSON.
    ///
    /// A body that is not JSON becomes [`Error::InvalidJson`] carrying the raw
    /// text, or the `empty response` marker when nothing was sent back.
    pub fn json(&self) -> Result<Value> {
        serde_json::from_str(&self.body).map_err(|e| Error::InvalidJson {
            reason: e.to_string(),
            body: if self.is_empty() {
                String::from(EMPTY_RESPONSE)
            } else {
                self.body.clone()
            },
        })
    }

    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn extract_headers(header_map: &HeaderMap) -> HashMap<String, String> {
    // it currently ignores header values with opaque characters
    header_map
        .iter()
        .map(|(k, v)| (String::from(k.as_str()), v.to_str()))
        .filter_map(|(key, value)| value.ok().map(|v| (key, String::from(v))))
        .collect::<HashMap<_, _>>()
}

/// `{userName, password}` body shared by create user, login and token generation.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub user_name: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct IsbnRef {
    pub isbn: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AddBooks {
    pub user_id: String,
    pub collection_of_isbns: Vec<IsbnRef>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoreBookRef {
    pub isbn: String,
    pub user_id: String,
}
