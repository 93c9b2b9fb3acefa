//! Scenario-scoped session state and the hooks that run around each scenario.

use crate::{
    client::ApiClient,
    config::Config,
    context::ScenarioContext,
    data::ApiResponse,
    error::{Error, Result},
    validation,
};
use serde_json::Value;
use std::{thread, time::Duration};

/// Scenarios tagged with this create a user that teardown deletes.
pub const USER_CREATION_TAG: &str = "POST_User";
/// Scenarios tagged with this add books that teardown removes from the user's collection.
pub const BOOK_CREATION_TAG: &str = "POST_Books";

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Outcome {
    Passed,
    Failed,
    Skipped,
}

/// What the runner knows about a scenario once its steps have finished.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioEnd<'a> {
    pub name: &'a str,
    pub tags: &'a [String],
    pub outcome: Outcome,
}

impl ScenarioEnd<'_> {
    fn tagged(&self, tag: &str) -> bool {
        self.tags
            .iter()
            .any(|t| t.trim_start_matches('@') == tag)
    }
}

/// Result of best-effort cleanup. Logged by the caller, never propagated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Teardown {
    Skipped,
    Cleaned { users: usize, books: usize },
    Failed(String),
}

/// One API client plus the typed context of the scenario using it.
#[derive(Debug, Clone)]
pub struct Session {
    pub client: ApiClient,
    pub context: ScenarioContext,
    settle_delay: Duration,
}

impl Session {
    pub fn new(client: ApiClient, config: &Config) -> Self {
        Self {
            client,
            context: ScenarioContext::new(config.username.as_str(), config.password.as_str()),
            settle_delay: config.settle_delay(),
        }
    }

    /// Clear identifiers, the last exchange and the client's token. Credentials stay.
    pub fn reset(&mut self) {
        self.context.reset();
        self.client.clear_token();
    }

    /// Pick up where the previous scenario left off: the same client and the
    /// same credentials. Scenario state is not carried.
    pub fn resume(&mut self, previous: &Session) {
        self.client.clone_from(&previous.client);
        self.context.set_credentials(
            previous.context.username.as_str(),
            previous.context.password.as_str(),
        );
        self.settle_delay = previous.settle_delay;
    }

    pub fn before_scenario(&mut self, name: &str) {
        self.reset();
        tracing::info!("Starting scenario: {}", name);
    }

    /// Log the outcome, clean up what the scenario created, then reset
    /// regardless of how cleanup went.
    pub fn after_scenario(&mut self, end: &ScenarioEnd<'_>) -> Teardown {
        self.log_outcome(end);

        let teardown = self.teardown(end);
        match &teardown {
            Teardown::Failed(reason) => tracing::warn!("Cleanup incomplete: {}", reason),
            Teardown::Cleaned { users, books } => {
                tracing::info!(users, books, "Cleanup finished for {}", end.name)
            }
            Teardown::Skipped => (),
        }

        self.reset();
        teardown
    }

    /// Block for the configured settle delay.
    pub fn settle(&self) {
        if !self.settle_delay.is_zero() {
            tracing::debug!(delay_ms = self.settle_delay.as_millis() as u64, "settling");
            thread::sleep(self.settle_delay);
        }
    }

    /// Store `response` as the scenario's last response.
    pub fn record(&mut self, response: ApiResponse) {
        self.context.last_response = Some(response);
    }

    pub fn last_response(&self) -> Result<&ApiResponse> {
        self.context
            .last_response
            .as_ref()
            .ok_or_else(|| Error::assertion("no response has been recorded in this scenario"))
    }

    /// Generate a token from the context credentials, with a settle delay on
    /// either side, then log in to capture the user id.
    pub fn sign_in(&mut self, username: &str, password: &str) -> Result<()> {
        self.context.set_credentials(username, password);

        self.settle();
        let response = self.client.generate_token(username, password)?;
        let token = token_from(&response.json()?)?;
        self.client.set_token(Some(token));
        self.settle();

        let login = self.client.login(username, password)?.json()?;
        self.context.user_id = Some(user_id_from(&login)?);
        Ok(())
    }

    /// Log in with the context credentials, keeping the returned token and user id.
    pub fn login(&mut self) -> Result<()> {
        let (username, password) = (self.context.username.clone(), self.context.password.clone());
        let login = self.client.login(&username, &password)?.json()?;

        self.client.set_token(Some(token_from(&login)?));
        self.context.user_id = Some(user_id_from(&login)?);
        Ok(())
    }

    /// Generate a token from the context credentials unless one is already held.
    pub fn ensure_token(&mut self) -> Result<()> {
        if self.client.token().is_some() {
            return Ok(());
        }
        let (username, password) = (self.context.username.clone(), self.context.password.clone());
        let response = self.client.generate_token(&username, &password)?;
        self.client.set_token(Some(token_from(&response.json()?)?));
        Ok(())
    }

    fn log_outcome(&self, end: &ScenarioEnd<'_>) {
        match end.outcome {
            Outcome::Failed => {
                tracing::error!("Scenario failed: {}", end.name);
                if let Some(error) = &self.context.last_error {
                    tracing::error!("Error: {}", error);
                }
                if let Some(response) = &self.context.last_response {
                    tracing::error!("Last response: {}", response.body);
                }
            }
            Outcome::Skipped => tracing::warn!("Scenario skipped: {}", end.name),
            Outcome::Passed => tracing::info!("Scenario passed: {}", end.name),
        }
    }

    fn teardown(&mut self, end: &ScenarioEnd<'_>) -> Teardown {
        let removes_user = end.tagged(USER_CREATION_TAG);
        let removes_books = end.tagged(BOOK_CREATION_TAG);
        let Some(user_id) = self.context.user_id.clone() else {
            return Teardown::Skipped;
        };
        if !removes_user && !removes_books {
            return Teardown::Skipped;
        }

        let mut failures = Vec::new();
        let mut books = 0;
        let mut users = 0;

        if let Err(e) = self.ensure_token() {
            failures.push(format!("Failed to authenticate for cleanup: {}", e));
        }

        if removes_books {
            match self.remove_collection(&user_id) {
                Ok(removed) => {
                    if removed > 0 {
                        tracing::info!("Cleaned up {} books from collection", removed);
                    }
                    books = removed;
                }
                Err(e) => failures.push(format!("Failed to cleanup books: {}", e)),
            }
        }

        if removes_user {
            match self.client.delete_user(&user_id) {
                Ok(response) if response.is_success() => {
                    tracing::info!("Cleaned up test user {}", user_id);
                    users = 1;
                }
                Ok(response) => failures.push(format!(
                    "Failed to cleanup test user {}: status {}",
                    user_id, response.status
                )),
                Err(e) => failures.push(format!("Failed to cleanup test user: {}", e)),
            }
        }

        if failures.is_empty() {
            Teardown::Cleaned { users, books }
        } else {
            Teardown::Failed(failures.join("; "))
        }
    }

    fn remove_collection(&mut self, user_id: &str) -> Result<usize> {
        let response = self.client.get_user_books(user_id)?;
        if response.status != 200 {
            return Err(Error::assertion(format!(
                "listing books of {} returned status {}",
                user_id, response.status
            )));
        }
        let body = response.json()?;
        let isbns: Vec<String> = validation::book_isbns(&body)?
            .into_iter()
            .map(String::from)
            .collect();

        let mut removed = 0;
        let mut rejected = Vec::new();
        for isbn in &isbns {
            let response = self.client.delete_book(user_id, isbn)?;
            if response.is_success() {
                removed += 1;
            } else {
                rejected.push(format!("{} (status {})", isbn, response.status));
            }
        }

        if rejected.is_empty() {
            Ok(removed)
        } else {
            Err(Error::assertion(format!(
                "removed {} of {} books, rejected {}",
                removed,
                isbns.len(),
                rejected.join(", ")
            )))
        }
    }
}

fn token_from(body: &Value) -> Result<String> {
    body.get("token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(String::from)
        .ok_or_else(|| Error::assertion(format!("expected a token in {}", body)))
}

fn user_id_from(body: &Value) -> Result<String> {
    body.get("userId")
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| Error::assertion(format!("expected a userId in {}", body)))
}

/// Where the run as a whole is in its lifecycle.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RunState {
    NotStarted,
    Active,
    Ended,
}

/// Run-level bookkeeping: session start/end, feature boundaries and scenario tallies.
#[derive(Debug)]
pub struct RunLog {
    state: RunState,
    feature: Option<String>,
    passed: usize,
    failed: usize,
    skipped: usize,
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new()
    }
}

impl RunLog {
    pub fn new() -> Self {
        Self {
            state: RunState::NotStarted,
            feature: None,
            passed: 0,
            failed: 0,
            skipped: 0,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn current_feature(&self) -> Option<&str> {
        self.feature.as_deref()
    }

    pub fn start(&mut self) {
        if self.state == RunState::NotStarted {
            self.state = RunState::Active;
            tracing::info!("Starting test session");
        }
    }

    /// Note that a scenario from `name` is about to run, closing the previous feature if it differs.
    pub fn enter_feature(&mut self, name: &str) {
        if self.feature.as_deref() == Some(name) {
            return;
        }
        self.complete_feature();
        tracing::info!("Starting feature: {}", name);
        self.feature = Some(String::from(name));
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Passed => self.passed += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn finish(&mut self) {
        if self.state != RunState::Active {
            return;
        }
        self.complete_feature();
        self.state = RunState::Ended;
        tracing::info!(
            passed = self.passed,
            failed = self.failed,
            skipped = self.skipped,
            "Completed test session"
        );
    }

    fn complete_feature(&mut self) {
        if let Some(previous) = self.feature.take() {
            tracing::info!("Completed feature: {}", previous);
        }
    }
}
