//! Cucumber world for the account and bookstore features.

use bookstore_bdd::{ApiClientBuilder, ApiResponse, Config, Session};
use cucumber::World;
use serde_json::Value;
use std::sync::OnceLock;

pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Configuration resolved once by the runner before any scenario starts.
pub static RUN_CONFIG: OnceLock<Config> = OnceLock::new();

/// Per-scenario view of the run's session. The runner hands the run's client
/// and credentials in before each scenario and takes them back afterwards.
#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct BookstoreWorld {
    pub session: Session,
}

/// A session on its own client, as configured for this run.
pub fn session_for(config: &Config) -> Session {
    let http = if cfg!(feature = "live-api") {
        reqwest::blocking::Client::builder()
    } else {
        reqwest::blocking::Client::builder().no_proxy()
    }
    .build()
    .expect("build HTTP client");

    let client = ApiClientBuilder::new()
        .with_base_url(config.base_url.as_str())
        .with_http_client(http)
        .build();
    Session::new(client, config)
}

impl BookstoreWorld {
    fn new() -> Self {
        let config = RUN_CONFIG
            .get()
            .expect("run configuration is set before scenarios start");
        Self {
            session: session_for(config),
        }
    }

    pub fn remember(&mut self, response: ApiResponse) {
        self.session.record(response);
    }

    pub fn response(&self) -> TestResult<&ApiResponse> {
        Ok(self.session.last_response()?)
    }

    /// Parse the last response as JSON, noting the failure in the context.
    pub fn response_json(&mut self) -> TestResult<Value> {
        let parsed = self.session.last_response().and_then(ApiResponse::json);
        match parsed {
            Ok(body) => Ok(body),
            Err(e) => {
                self.session.context.last_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    pub fn user_id(&self) -> String {
        self.session.context.user_id_or_empty().to_owned()
    }

    pub fn credentials(&self) -> (String, String) {
        (
            self.session.context.username.clone(),
            self.session.context.password.clone(),
        )
    }
}
