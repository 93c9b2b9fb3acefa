use crate::{
    catalogue::{seed_books, Book},
    data::{RequestData, ResponseData},
};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use time::{macros::format_description, Duration, OffsetDateTime};

const ACCOUNT_USER: &str = "/Account/v1/User";
const ACCOUNT_USER_PREFIX: &str = "/Account/v1/User/";
const LOGIN: &str = "/Account/v1/Login";
const GENERATE_TOKEN: &str = "/Account/v1/GenerateToken";
const BOOKS: &str = "/BookStore/v1/Books";
const BOOK: &str = "/BookStore/v1/Book";

const TOKEN_LIFETIME: Duration = Duration::days(7);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Credentials {
    user_name: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IsbnRef {
    isbn: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddBooks {
    user_id: String,
    collection_of_isbns: Vec<IsbnRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreBookRef {
    isbn: String,
    user_id: String,
}

#[derive(Debug, Clone)]
struct User {
    id: String,
    username: String,
    password: String,
    created: OffsetDateTime,
    isbns: Vec<String>,
    token: Option<(String, OffsetDateTime)>,
}

/// In-memory state behind the stub's routes.
#[derive(Debug)]
pub(crate) struct Store {
    books: Vec<Book>,
    users: HashMap<String, User>,
    next_id: u64,
}

enum Auth<'a> {
    Missing,
    Mismatch,
    User(&'a str),
}

impl Store {
    pub(crate) fn new() -> Self {
        Self {
            books: seed_books(),
            users: HashMap::new(),
            next_id: 0,
        }
    }

    pub(crate) fn clear_books(&mut self) {
        self.books.clear();
    }

    pub(crate) fn handle(&mut self, request: &RequestData) -> ResponseData {
        let path = request.path();
        match (request.method.as_str(), path) {
            ("POST", ACCOUNT_USER) => self.create_user(request),
            ("POST", LOGIN) => self.login(request),
            ("POST", GENERATE_TOKEN) => self.generate_token(request),
            ("GET", BOOKS) => self.list_books(),
            ("POST", BOOKS) => self.add_books(request),
            ("DELETE", BOOKS) => self.remove_from_collection(request),
            ("GET", BOOK) => self.get_book(request),
            ("DELETE", BOOK) => self.delete_from_store(request),
            (method, _) => match path.strip_prefix(ACCOUNT_USER_PREFIX) {
                Some(rest) => match (method, rest.split_once('/')) {
                    ("GET", None) => self.get_user(request, rest),
                    ("DELETE", None) => self.delete_user(request, rest),
                    ("GET", Some((user_id, "Books"))) => self.get_user_books(request, user_id),
                    _ => not_found(),
                },
                None => not_found(),
            },
        }
    }

    fn create_user(&mut self, request: &RequestData) -> ResponseData {
        let Some((username, password)) = credentials(request) else {
            return missing_credentials();
        };
        if !is_strong_password(&password) {
            return ResponseData::failure(
                400,
                "1300",
                "Passwords must have at least one non alphanumeric character, one digit ('0'-'9'), \
                 one uppercase ('A'-'Z'), one lowercase ('a'-'z'), one special character and \
                 Password must be eight characters or longer.",
            );
        }
        if self.find_by_name(&username).is_some() {
            return ResponseData::failure(406, "1204", "User exists!");
        }

        self.next_id += 1;
        let id = format!("5f0d2b8e-1c3a-4e7b-9a6d-{:012x}", self.next_id);
        self.users.insert(
            id.clone(),
            User {
                id: id.clone(),
                username: username.clone(),
                password,
                created: OffsetDateTime::now_utc(),
                isbns: Vec::new(),
                token: None,
            },
        );
        tracing::debug!(user_id = %id, %username, "stub created user");

        ResponseData::json(
            201,
            &json!({ "userID": id, "username": username, "books": [] }),
        )
    }

    fn generate_token(&mut self, request: &RequestData) -> ResponseData {
        let Some((username, password)) = credentials(request) else {
            return missing_credentials();
        };
        let Some(user) = self.authenticate(&username, &password) else {
            return ResponseData::json(
                200,
                &json!({
                    "token": null,
                    "expires": null,
                    "status": "Failed",
                    "result": "User authorization failed.",
                }),
            );
        };
        let (token, expires) = self.issue_token(&user);

        ResponseData::json(
            200,
            &json!({
                "token": token,
                "expires": timestamp(expires),
                "status": "Success",
                "result": "User authorized successfully.",
            }),
        )
    }

    fn login(&mut self, request: &RequestData) -> ResponseData {
        let Some((username, password)) = credentials(request) else {
            return missing_credentials();
        };
        let Some(user) = self.authenticate(&username, &password) else {
            return ResponseData::failure(404, "1207", "User not found!");
        };
        let (token, expires) = match &user.token {
            Some(issued) => issued.clone(),
            None => self.issue_token(&user),
        };

        ResponseData::json(
            200,
            &json!({
                "userId": user.id,
                "username": user.username,
                "password": user.password,
                "token": token,
                "expires": timestamp(expires),
                "created_date": timestamp(user.created),
                "isActive": false,
            }),
        )
    }

    fn get_user(&self, request: &RequestData, user_id: &str) -> ResponseData {
        match self.authorize(request, user_id) {
            Auth::Missing => not_authorized(),
            Auth::Mismatch => ResponseData::failure(401, "1207", "User not found!"),
            Auth::User(id) => match self.users.get(id) {
                Some(user) => ResponseData::json(
                    200,
                    &json!({
                        "userId": user.id,
                        "username": user.username,
                        "books": self.books_of(user),
                    }),
                ),
                None => ResponseData::failure(401, "1207", "User not found!"),
            },
        }
    }

    fn get_user_books(&self, request: &RequestData, user_id: &str) -> ResponseData {
        match self.authorize(request, user_id) {
            Auth::Missing => not_authorized(),
            Auth::Mismatch => ResponseData::failure(401, "1207", "User not found!"),
            Auth::User(id) => match self.users.get(id) {
                Some(user) => ResponseData::json(200, &json!({ "books": self.books_of(user) })),
                None => ResponseData::failure(401, "1207", "User not found!"),
            },
        }
    }

    fn delete_user(&mut self, request: &RequestData, user_id: &str) -> ResponseData {
        let id = match self.authorize(request, user_id) {
            Auth::Missing => return not_authorized(),
            Auth::Mismatch => {
                return ResponseData::failure(200, "1207", "User Id not correct!");
            }
            Auth::User(id) => id.to_owned(),
        };
        self.users.remove(&id);
        tracing::debug!(user_id = %id, "stub deleted user");

        ResponseData::no_content()
    }

    fn list_books(&self) -> ResponseData {
        ResponseData::json(200, &json!({ "books": self.books }))
    }

    fn get_book(&self, request: &RequestData) -> ResponseData {
        let isbn = request.query_param("ISBN").unwrap_or_default();
        match self.books.iter().find(|book| book.isbn == isbn) {
            Some(book) => ResponseData::json(200, &json!(book)),
            None => unknown_isbn(),
        }
    }

    fn add_books(&mut self, request: &RequestData) -> ResponseData {
        let Some(payload) = parse::<AddBooks>(request) else {
            return ResponseData::failure(400, "1200", "UserId and collectionOfIsbns required.");
        };
        let id = match self.authorize(request, &payload.user_id) {
            Auth::Missing => return not_authorized(),
            Auth::Mismatch => return ResponseData::failure(401, "1207", "User Id not correct!"),
            Auth::User(id) => id.to_owned(),
        };
        let requested: Vec<String> = payload
            .collection_of_isbns
            .into_iter()
            .map(|entry| entry.isbn)
            .collect();
        if requested
            .iter()
            .any(|isbn| !self.books.iter().any(|book| &book.isbn == isbn))
        {
            return unknown_isbn();
        }
        let Some(user) = self.users.get_mut(&id) else {
            return ResponseData::failure(401, "1207", "User Id not correct!");
        };
        if requested.iter().any(|isbn| user.isbns.contains(isbn)) {
            return ResponseData::failure(400, "1210", "ISBN already present in the User's Collection!");
        }
        user.isbns.extend(requested.iter().cloned());

        let added: Vec<_> = requested.iter().map(|isbn| json!({ "isbn": isbn })).collect();
        ResponseData::json(201, &json!({ "books": added }))
    }

    fn remove_from_collection(&mut self, request: &RequestData) -> ResponseData {
        let user_id = request.query_param("UserId").unwrap_or_default().to_owned();
        let id = match self.authorize(request, &user_id) {
            Auth::Missing => return not_authorized(),
            Auth::Mismatch => return ResponseData::failure(401, "1207", "User Id not correct!"),
            Auth::User(id) => id.to_owned(),
        };
        let isbn = parse::<IsbnRef>(request).map(|entry| entry.isbn);
        let Some(user) = self.users.get_mut(&id) else {
            return ResponseData::failure(401, "1207", "User Id not correct!");
        };

        match isbn {
            Some(isbn) => match user.isbns.iter().position(|owned| *owned == isbn) {
                Some(index) => {
                    user.isbns.remove(index);
                    ResponseData::no_content()
                }
                None => not_in_collection(404),
            },
            None => {
                user.isbns.clear();
                ResponseData::no_content()
            }
        }
    }

    fn delete_from_store(&mut self, request: &RequestData) -> ResponseData {
        let Some(payload) = parse::<StoreBookRef>(request) else {
            return ResponseData::failure(400, "1200", "ISBN and userId required.");
        };
        let id = match self.authorize(request, &payload.user_id) {
            Auth::Missing => return not_authorized(),
            Auth::Mismatch => return ResponseData::failure(401, "1207", "User Id not correct!"),
            Auth::User(id) => id.to_owned(),
        };
        let Some(user) = self.users.get_mut(&id) else {
            return ResponseData::failure(401, "1207", "User Id not correct!");
        };

        match user.isbns.iter().position(|owned| *owned == payload.isbn) {
            Some(index) => {
                user.isbns.remove(index);
                ResponseData::no_content()
            }
            None => not_in_collection(400),
        }
    }

    fn authorize<'a>(&'a self, request: &RequestData, user_id: &'a str) -> Auth<'a> {
        let Some(token) = request.bearer_token() else {
            return Auth::Missing;
        };
        let owner = self.users.values().find(|user| {
            user.token
                .as_ref()
                .is_some_and(|(issued, expires)| issued == token && *expires > OffsetDateTime::now_utc())
        });
        match owner {
            None => Auth::Missing,
            Some(user) if user.id == user_id => Auth::User(user_id),
            Some(_) => Auth::Mismatch,
        }
    }

    fn authenticate(&self, username: &str, password: &str) -> Option<User> {
        self.find_by_name(username)
            .filter(|user| user.password == password)
            .cloned()
    }

    fn find_by_name(&self, username: &str) -> Option<&User> {
        self.users.values().find(|user| user.username == username)
    }

    fn issue_token(&mut self, user: &User) -> (String, OffsetDateTime) {
        self.next_id += 1;
        let issued = (
            format!("stub-token-{:06}", self.next_id),
            OffsetDateTime::now_utc() + TOKEN_LIFETIME,
        );
        if let Some(stored) = self.users.get_mut(&user.id) {
            stored.token = Some(issued.clone());
        }
        issued
    }

    fn books_of(&self, user: &User) -> Vec<&Book> {
        user.isbns
            .iter()
            .filter_map(|isbn| self.books.iter().find(|book| &book.isbn == isbn))
            .collect()
    }
}

fn credentials(request: &RequestData) -> Option<(String, String)> {
    let credentials = parse::<Credentials>(request)?;
    match (credentials.user_name, credentials.password) {
        (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
            Some((username, password))
        }
        _ => None,
    }
}

fn parse<T: serde::de::DeserializeOwned>(request: &RequestData) -> Option<T> {
    serde_json::from_str(&request.body).ok()
}

fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_alphanumeric())
}

fn timestamp(at: OffsetDateTime) -> String {
    at.format(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    ))
    .unwrap_or_default()
}

fn missing_credentials() -> ResponseData {
    ResponseData::failure(400, "1200", "UserName and Password required.")
}

fn not_authorized() -> ResponseData {
    ResponseData::failure(401, "1200", "User not authorized!")
}

fn unknown_isbn() -> ResponseData {
    ResponseData::failure(400, "1205", "ISBN supplied is not available in Books Collection!")
}

fn not_in_collection(status: u16) -> ResponseData {
    ResponseData::failure(status, "1206", "ISBN supplied is not available in User's Collection!")
}

fn not_found() -> ResponseData {
    ResponseData::failure(404, "404", "Not Found")
}
