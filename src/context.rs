use crate::data::ApiResponse;
use serde_json::Value;

/// Mutable state carried through one scenario.
///
/// Credentials survive [`ScenarioContext::reset`]; identifiers and the last
/// exchange do not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioContext {
    pub username: String,
    pub password: String,
    pub user_id: Option<String>,
    pub isbn: Option<String>,
    pub last_response: Option<ApiResponse>,
    pub last_error: Option<String>,
}

impl ScenarioContext {
    pub fn new<U: Into<String>, P: Into<String>>(username: U, password: P) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    pub fn reset(&mut self) {
        self.user_id = None;
        self.isbn = None;
        self.last_response = None;
        self.last_error = None;
    }

    pub fn set_credentials<U: Into<String>, P: Into<String>>(&mut self, username: U, password: P) {
        self.username = username.into();
        self.password = password.into();
    }

    /// Recorded user id, or an empty string when none has been captured yet.
    pub fn user_id_or_empty(&self) -> &str {
        self.user_id.as_deref().unwrap_or_default()
    }

    /// Record the user id carried by `field` of `body`. Create-user answers with
    /// `userID`, login with `userId`; any other field, or a non-string id,
    /// leaves the recorded id untouched.
    pub fn capture_user_id(&mut self, field: &str, body: &Value) {
        if field != "userId" && field != "userID" {
            return;
        }
        if let Some(user_id) = body.get(field).and_then(Value::as_str) {
            self.user_id = Some(String::from(user_id));
        }
    }

    pub fn isbn_or_empty(&self) -> &str {
        self.isbn.as_deref().unwrap_or_default()
    }
}
