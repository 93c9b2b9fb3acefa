use std::collections::HashMap;

/// A request as received by the stub.
#[derive(Debug, Clone)]
pub struct RequestData {
    pub uri: String,
    pub method: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RequestData {
    /// Path component of the request URI, without the query string.
    pub fn path(&self) -> &str {
        self.uri.split('?').next().unwrap_or_default()
    }

    /// Value of the query parameter `name`, if present.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        let (_, query) = self.uri.split_once('?')?;
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    /// Header lookup; header names are stored lowercase.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.header("authorization")?.strip_prefix("Bearer ")
    }

    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }
}

#[derive(Debug, Clone)]
pub struct ResponseData {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl ResponseData {
    pub fn json(status_code: u16, body: &serde_json::Value) -> Self {
        let mut headers = HashMap::new();
        headers.insert(
            String::from("content-type"),
            String::from("application/json; charset=utf-8"),
        );

        Self {
            status_code,
            headers,
            body: body.to_string(),
        }
    }

    pub fn no_content() -> Self {
        Self {
            status_code: 204,
            headers: HashMap::new(),
            body: String::new(),
        }
    }

    /// Error envelope used by the real service: `{"code": "...", "message": "..."}`.
    pub fn failure(status_code: u16, code: &str, message: &str) -> Self {
        Self::json(
            status_code,
            &serde_json::json!({ "code": code, "message": message }),
        )
    }
}
