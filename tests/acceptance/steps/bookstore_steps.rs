//! Catalogue lookups, collection management and request-body checks.

use bookstore_bdd::validation::{self, Collection};
use cucumber::{given, then, when};
use serde_json::{json, Value};

use crate::world::{BookstoreWorld, TestResult};

#[when("I send a request to get all books")]
fn get_all_books(world: &mut BookstoreWorld) -> TestResult {
    let response = world.session.client.get_books()?;
    world.remember(response);
    Ok(())
}

#[when(expr = "I send a request to get book with ISBN {string}")]
fn get_book(world: &mut BookstoreWorld, isbn: String) -> TestResult {
    let response = world.session.client.get_book(&isbn)?;
    world.remember(response);
    Ok(())
}

#[then(expr = "each book should contain {string}")]
fn each_book_contains(world: &mut BookstoreWorld, field: String) -> TestResult {
    let body = world.response_json()?;
    Ok(validation::check_each_book(&body, &field, Collection::NonEmpty)?)
}

#[then(expr = "each book in collection should contain {string}")]
fn each_collection_book_contains(world: &mut BookstoreWorld, field: String) -> TestResult {
    let body = world.response_json()?;
    Ok(validation::check_each_book(&body, &field, Collection::MayBeEmpty)?)
}

#[given("there are books available in the store")]
fn books_available(world: &mut BookstoreWorld) -> TestResult {
    remember_first_isbn(world)
}

#[given("I have a valid book ISBN")]
fn valid_isbn(world: &mut BookstoreWorld) -> TestResult {
    remember_first_isbn(world)
}

fn remember_first_isbn(world: &mut BookstoreWorld) -> TestResult {
    let body = world.session.client.get_books()?.json()?;
    let books = validation::require_books(&body)?;
    world.session.context.isbn = books[0]
        .get("isbn")
        .and_then(Value::as_str)
        .map(String::from);
    Ok(())
}

#[given(expr = "I send a request to add book with isbn {string} to my collection")]
fn given_book_added(world: &mut BookstoreWorld, isbn: String) -> TestResult {
    add_book(world, isbn)
}

#[when(expr = "I send a request to add book with isbn {string} to my collection")]
fn when_book_added(world: &mut BookstoreWorld, isbn: String) -> TestResult {
    add_book(world, isbn)
}

fn add_book(world: &mut BookstoreWorld, isbn: String) -> TestResult {
    let user_id = world.user_id();
    let response = world.session.client.add_book(&user_id, &isbn)?;
    world.session.context.isbn = Some(isbn);
    world.remember(response);
    Ok(())
}

#[given("I have a book in my collection")]
fn book_in_collection(world: &mut BookstoreWorld) -> TestResult {
    if world.session.context.isbn.is_none() {
        remember_first_isbn(world)?;
    }
    let user_id = world.user_id();
    let isbn = world.session.context.isbn_or_empty().to_owned();
    let status = world.session.client.add_book(&user_id, &isbn)?.status;
    if (200..=201).contains(&status) {
        Ok(())
    } else {
        Err(format!("expected book {} to be added, got status {}", isbn, status).into())
    }
}

#[then("the book should appear in my collection")]
fn book_appears(world: &mut BookstoreWorld) -> TestResult {
    let user_id = world.user_id();
    let body = world.session.client.get_user_books(&user_id)?.json()?;
    let isbn = world.session.context.isbn_or_empty();
    if validation::book_isbns(&body)?.contains(&isbn) {
        Ok(())
    } else {
        Err(format!("expected {} in collection {}", isbn, body).into())
    }
}

#[given(expr = "I remove book with isbn {string} from my collection if exists")]
fn remove_if_exists(world: &mut BookstoreWorld, isbn: String) -> TestResult {
    world.session.ensure_token()?;

    let user_id = world.user_id();
    let account = world.session.client.get_user(&user_id)?;
    if account.status != 200 {
        return Ok(());
    }
    if !validation::book_isbns(&account.json()?)?.contains(&isbn.as_str()) {
        return Ok(());
    }

    let response = world.session.client.delete_book(&user_id, &isbn)?;
    let status = response.status;
    world.remember(response);
    if status == 204 {
        Ok(())
    } else {
        Err(format!("expected book {} to be removed, got status {}", isbn, status).into())
    }
}

#[when(expr = "I remove book with isbn {string} from my collection")]
fn remove_book(world: &mut BookstoreWorld, isbn: String) -> TestResult {
    let user_id = world.user_id();
    let response = world.session.client.delete_book(&user_id, &isbn)?;
    world.session.context.isbn = Some(isbn);
    world.remember(response);
    Ok(())
}

#[when("I remove books from my collection")]
fn remove_books(world: &mut BookstoreWorld) -> TestResult {
    world.session.ensure_token()?;

    let user_id = world.user_id();
    let account = world.session.client.get_user(&user_id)?;
    if account.status != 200 {
        return Ok(());
    }
    let body = account.json()?;
    for isbn in validation::book_isbns(&body)? {
        let response = world.session.client.delete_book(&user_id, isbn)?;
        world.remember(response);
    }
    Ok(())
}

#[then("the book should not be in my collection")]
fn book_removed(world: &mut BookstoreWorld) -> TestResult {
    let user_id = world.user_id();
    let account = world.session.client.get_user(&user_id)?;
    if account.status != 200 {
        return Err(format!("Failed to get user books: {}", account.status).into());
    }
    let body = account.json()?;
    let isbn = world.session.context.isbn_or_empty();
    if validation::book_isbns(&body)?.contains(&isbn) {
        Err(format!("Book {} still exists in collection", isbn).into())
    } else {
        Ok(())
    }
}

#[then(expr = "my collection should contain {int} book(s)")]
fn collection_size(world: &mut BookstoreWorld, expected: usize) -> TestResult {
    let user_id = world.user_id();
    let body = world.session.client.get_user_books(&user_id)?.json()?;
    let actual = validation::books(&body)?.len();
    if actual == expected {
        Ok(())
    } else {
        Err(format!("expected {} book(s) in collection, found {}", expected, actual).into())
    }
}

#[when(expr = "I send a request to delete book with isbn {string} from store")]
fn delete_from_store(world: &mut BookstoreWorld, isbn: String) -> TestResult {
    let user_id = world.user_id();
    let response = world.session.client.delete_book_from_store(&isbn, &user_id)?;
    world.session.context.isbn = Some(isbn);
    world.remember(response);
    Ok(())
}

#[then(expr = "the request should contain only isbn {string}")]
fn request_contains_isbn(world: &mut BookstoreWorld, isbn: String) -> TestResult {
    expect_request_body(world, json!({ "isbn": isbn }))
}

#[then(expr = "the request should contain isbn {string} and userId {string}")]
fn request_contains_isbn_and_user(
    world: &mut BookstoreWorld,
    isbn: String,
    user_id: String,
) -> TestResult {
    expect_request_body(world, json!({ "isbn": isbn, "userId": user_id }))
}

fn expect_request_body(world: &BookstoreWorld, expected: Value) -> TestResult {
    match world.session.client.last_request_body() {
        Some(actual) if *actual == expected => Ok(()),
        Some(actual) => Err(format!("expected request body {}, sent {}", expected, actual).into()),
        None => Err(format!("expected request body {}, none was sent", expected).into()),
    }
}
