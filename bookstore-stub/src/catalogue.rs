use serde::Serialize;

/// A bookstore entry, serialized with the field names the service uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    pub isbn: String,
    pub title: String,
    #[serde(rename = "subTitle")]
    pub sub_title: String,
    pub author: String,
    pub publish_date: String,
    pub publisher: String,
    pub pages: u32,
    pub description: String,
    pub website: String,
}

struct Seed(
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    u32,
    &'static str,
    &'static str,
);

const SEEDS: &[Seed] = &[
    Seed(
        "9781449325862",
        "Git Pocket Guide",
        "A Working Introduction",
        "Richard E. Silverman",
        "2020-06-04T08:48:39.000Z",
        "O'Reilly Media",
        234,
        "This pocket guide is the perfect on-the-job companion to Git, the distributed version control system.",
        "http://chimera.labs.oreilly.com/books/1230000000561/index.html",
    ),
    Seed(
        "9781449331818",
        "Learning JavaScript Design Patterns",
        "A JavaScript and jQuery Developer's Guide",
        "Addy Osmani",
        "2020-06-04T09:11:40.000Z",
        "O'Reilly Media",
        254,
        "With Learning JavaScript Design Patterns, you'll learn how to write beautiful, structured, and maintainable JavaScript.",
        "http://www.addyosmani.com/resources/essentialjsdesignpatterns/book/",
    ),
    Seed(
        "9781449337711",
        "Designing Evolvable Web APIs with ASP.NET",
        "Harnessing the Power of the Web",
        "Glenn Block et al.",
        "2020-06-04T09:12:43.000Z",
        "O'Reilly Media",
        238,
        "Design and build Web APIs for a broad range of clients that can evolve without breaking them.",
        "http://chimera.labs.oreilly.com/books/1234000001708/index.html",
    ),
    Seed(
        "9781449365035",
        "Speaking JavaScript",
        "An In-Depth Guide for Programmers",
        "Axel Rauschmayer",
        "2014-02-01T00:00:00.000Z",
        "O'Reilly Media",
        460,
        "Like it or not, JavaScript is everywhere these days, from browser to server to mobile.",
        "http://speakingjs.com/",
    ),
    Seed(
        "9781491904244",
        "You Don't Know JS",
        "ES6 & Beyond",
        "Kyle Simpson",
        "2015-12-27T00:00:00.000Z",
        "O'Reilly Media",
        278,
        "No matter how much experience you have with JavaScript, odds are you don't fully understand the language.",
        "https://github.com/getify/You-Dont-Know-JS/tree/master/es6%20&%20beyond",
    ),
    Seed(
        "9781491950296",
        "Programming JavaScript Applications",
        "Robust Web Architecture with Node, HTML5, and Modern JS Libraries",
        "Eric Elliott",
        "2014-07-01T00:00:00.000Z",
        "O'Reilly Media",
        254,
        "Take advantage of JavaScript's power to build robust web-scale or enterprise applications.",
        "http://chimera.labs.oreilly.com/books/1234000000262/index.html",
    ),
    Seed(
        "9781593275846",
        "Eloquent JavaScript, Second Edition",
        "A Modern Introduction to Programming",
        "Marijn Haverbeke",
        "2014-12-14T00:00:00.000Z",
        "No Starch Press",
        472,
        "JavaScript lies at the heart of almost every modern web application.",
        "http://eloquentjavascript.net/",
    ),
    Seed(
        "9781593277574",
        "Understanding ECMAScript 6",
        "The Definitive Guide for JavaScript Developers",
        "Nicholas C. Zakas",
        "2016-09-03T00:00:00.000Z",
        "No Starch Press",
        352,
        "ECMAScript 6 represents the biggest update to the core of JavaScript in the history of the language.",
        "https://leanpub.com/understandinges6/read",
    ),
];

/// The catalogue the stub starts with.
pub fn seed_books() -> Vec<Book> {
    SEEDS
        .iter()
        .map(
            |Seed(isbn, title, sub_title, author, publish_date, publisher, pages, description, website)| {
                Book {
                    isbn: String::from(*isbn),
                    title: String::from(*title),
                    sub_title: String::from(*sub_title),
                    author: String::from(*author),
                    publish_date: String::from(*publish_date),
                    publisher: String::from(*publisher),
                    pages: *pages,
                    description: String::from(*description),
                    website: String::from(*website),
                }
            },
        )
        .collect()
}
