//! Assertions shared by every feature.

use bookstore_bdd::validation;
use cucumber::then;

use crate::world::{BookstoreWorld, TestResult};

#[then(expr = "the response should contain {string}")]
fn response_contains(world: &mut BookstoreWorld, field: String) -> TestResult {
    let body = world.response_json()?;
    validation::check_field(&body, &field)?;
    world.session.context.capture_user_id(&field, &body);
    Ok(())
}

#[then("the response should be a valid JSON")]
fn response_is_json(world: &mut BookstoreWorld) -> TestResult {
    world
        .response_json()
        .map(|_| ())
        .map_err(|e| format!("Response is not a valid JSON: {}", e).into())
}

#[then(expr = "the response status code should be {int}")]
fn status_code_is(world: &mut BookstoreWorld, status: u16) -> TestResult {
    let actual = world.response()?.status;
    if actual == status {
        Ok(())
    } else {
        Err(format!("expected status {}, got {}", status, actual).into())
    }
}

#[then(expr = "the response field {string} should be {string}")]
fn response_field_equals(world: &mut BookstoreWorld, field: String, expected: String) -> TestResult {
    let body = world.response_json()?;
    match body.get(&field).and_then(|value| value.as_str()) {
        Some(actual) if actual == expected => Ok(()),
        _ => Err(format!("expected '{}' to be \"{}\" in {}", field, expected, body).into()),
    }
}
