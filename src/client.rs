use crate::{
    data::{AddBooks, ApiResponse, Credentials, IsbnRef, StoreBookRef},
    error::Result,
};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

type ReqwestClient = reqwest::blocking::Client;

pub const DEFAULT_BASE_URL: &str = "https://demoqa.com";

const ACCOUNT_BASE: &str = "/Account/v1";
const BOOKSTORE_BASE: &str = "/BookStore/v1";
const AUTHORIZATION: &str = "Authorization";

/// Builder used to build an ApiClient instance
#[derive(Debug, Clone, Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    http_client: Option<ReqwestClient>,
}

impl ApiClientBuilder {
    /// Create a new ApiClientBuilder instance.
    pub fn new() -> Self {
        Self {
            base_url: None,
            http_client: None,
        }
    }

    /// Use the given base URL when building an ApiClient instance.
    ///
    /// # Arguments
    /// `base_url` - scheme and host of the API, e.g. `https://demoqa.com`. A trailing slash is
    ///     dropped so paths can be appended as-is.
    ///
    /// # Returns
    /// This builder.
    pub fn with_base_url<T: Into<String>>(mut self, base_url: T) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Use the given blocking reqwest client when building an ApiClient instance.
    ///
    /// # Arguments
    /// `client` - a pre-configured blocking reqwest client, e.g. one that bypasses proxies.
    ///
    /// # Returns
    /// This builder.
    pub fn with_http_client(mut self, client: ReqwestClient) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Consume the builder and create an ApiClient using all of the previously configured values or
    /// their defaults.
    ///
    /// # Returns
    /// An ApiClient with the default JSON headers and no token.
    pub fn build(mut self) -> ApiClient {
        ApiClient {
            http: self.http_client.take().unwrap_or_default(),
            base_url: self
                .base_url
                .take()
                .map(|url| url.trim_end_matches('/').to_owned())
                .unwrap_or_else(|| String::from(DEFAULT_BASE_URL)),
            headers: default_headers(),
            token: None,
            last_request_body: None,
        }
    }
}

/// Client for the DemoQA account and bookstore API.
///
/// Every call returns the raw [`ApiResponse`]; status codes are never turned
/// into errors, so callers assert on them. Only transport failures surface as
/// `Err`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: ReqwestClient,
    base_url: String,
    headers: BTreeMap<String, String>,
    token: Option<String>,
    last_request_body: Option<Value>,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    /// Create an ApiClient for the public service with the default reqwest client.
    ///
    /// # Returns
    /// An ApiClient pointed at [`DEFAULT_BASE_URL`].
    pub fn new() -> Self {
        ApiClientBuilder::new().build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Headers attached to every request, including `Authorization` while a token is held.
    pub fn default_headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// JSON body of the most recent request that carried one.
    pub fn last_request_body(&self) -> Option<&Value> {
        self.last_request_body.as_ref()
    }

    /// Set or clear the bearer token.
    ///
    /// A new token fully replaces the previous `Authorization` header; `None`
    /// (or an empty token) removes it.
    pub fn set_token(&mut self, token: Option<String>) {
        match token.filter(|token| !token.is_empty()) {
            Some(token) => {
                self.headers
                    .insert(String::from(AUTHORIZATION), format!("Bearer {}", token));
                self.token = Some(token);
            }
            None => {
                self.headers.remove(AUTHORIZATION);
                self.token = None;
            }
        }
    }

    pub fn clear_token(&mut self) {
        self.set_token(None);
    }

    pub fn get(&mut self, path: &str, query: &[(&str, &str)]) -> Result<ApiResponse> {
        self.send(Method::GET, path, query, None)
    }

    pub fn post(&mut self, path: &str, body: Option<Value>) -> Result<ApiResponse> {
        self.send(Method::POST, path, &[], body)
    }

    pub fn delete(&mut self, path: &str, body: Option<Value>) -> Result<ApiResponse> {
        self.send(Method::DELETE, path, &[], body)
    }

    pub fn create_user(&mut self, username: &str, password: &str) -> Result<ApiResponse> {
        let body = json_body(&credentials(username, password))?;
        self.post(&format!("{}/User", ACCOUNT_BASE), body)
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<ApiResponse> {
        let body = json_body(&credentials(username, password))?;
        self.post(&format!("{}/Login", ACCOUNT_BASE), body)
    }

    pub fn generate_token(&mut self, username: &str, password: &str) -> Result<ApiResponse> {
        let body = json_body(&credentials(username, password))?;
        self.post(&format!("{}/GenerateToken", ACCOUNT_BASE), body)
    }

    pub fn get_user(&mut self, user_id: &str) -> Result<ApiResponse> {
        self.get(&format!("{}/User/{}", ACCOUNT_BASE, user_id), &[])
    }

    pub fn delete_user(&mut self, user_id: &str) -> Result<ApiResponse> {
        self.delete(&format!("{}/User/{}", ACCOUNT_BASE, user_id), None)
    }

    pub fn get_user_books(&mut self, user_id: &str) -> Result<ApiResponse> {
        self.get(&format!("{}/User/{}/Books", ACCOUNT_BASE, user_id), &[])
    }

    pub fn get_books(&mut self) -> Result<ApiResponse> {
        self.get(&format!("{}/Books", BOOKSTORE_BASE), &[])
    }

    pub fn get_book(&mut self, isbn: &str) -> Result<ApiResponse> {
        self.get(&format!("{}/Book", BOOKSTORE_BASE), &[("ISBN", isbn)])
    }

    /// Add a single book to the user's collection.
    pub fn add_book(&mut self, user_id: &str, isbn: &str) -> Result<ApiResponse> {
        let body = json_body(&AddBooks {
            user_id: String::from(user_id),
            collection_of_isbns: vec![IsbnRef {
                isbn: String::from(isbn),
            }],
        })?;
        self.post(&format!("{}/Books", BOOKSTORE_BASE), body)
    }

    /// Remove a book from the user's collection.
    pub fn delete_book(&mut self, user_id: &str, isbn: &str) -> Result<ApiResponse> {
        let body = json_body(&IsbnRef {
            isbn: String::from(isbn),
        })?;
        self.delete(&format!("{}/Books?UserId={}", BOOKSTORE_BASE, user_id), body)
    }

    pub fn delete_book_from_store(&mut self, isbn: &str, user_id: &str) -> Result<ApiResponse> {
        let body = json_body(&StoreBookRef {
            isbn: String::from(isbn),
            user_id: String::from(user_id),
        })?;
        self.delete(&format!("{}/Book", BOOKSTORE_BASE), body)
    }

    fn send(
        &mut self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, path);

        tracing::info!("{} {}", method, url);
        tracing::debug!(headers = ?self.headers, "request headers");

        let mut request_builder = self.http.request(method, url.as_str());
        if !query.is_empty() {
            request_builder = request_builder.query(query);
        }
        for (name, value) in &self.headers {
            request_builder = request_builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &body {
            tracing::debug!(%body, "request body");
            request_builder = request_builder.json(body);
        }

        let response = request_builder.send()?;

        if body.is_some() {
            self.last_request_body = body;
        }

        let response = ApiResponse::read(response)?;
        tracing::info!("Response: {}", response.status);
        tracing::debug!(body = %response.body, "response body");

        Ok(response)
    }
}

fn default_headers() -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    headers.insert(String::from("Content-Type"), String::from("application/json"));
    headers.insert(String::from("Accept"), String::from("application/json"));
    headers
}

fn credentials(username: &str, password: &str) -> Credentials {
    Credentials {
        user_name: String::from(username),
        password: String::from(password),
    }
}

fn json_body<T: Serialize>(payload: &T) -> Result<Option<Value>> {
    Ok(Some(serde_json::to_value(payload)?))
}
