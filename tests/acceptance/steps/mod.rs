mod bookstore_steps;
mod common_steps;
