//! Example: wrapping errors across the layers of a small service
//!
//! Run with: cargo run --example layered_service

use thiserror::Error;
use wrapped_errors::{fields, find_error, find_generic_error, wrap, GenericError, WrapExt, WrappedError};

#[derive(Error, Debug, PartialEq)]
pub enum DbError {
    #[error("connection refused by {0}")]
    Refused(String),
}

fn connect(host: &str) -> Result<(), DbError> {
    Err(DbError::Refused(host.into()))
}

fn fetch_user(id: u32) -> wrapped_errors::Result<String> {
    connect("db-1:5432").wrap_msg("fetching user", Some(fields! { "user_id" => id }))?;
    Ok(format!("user {}", id))
}

fn profile(id: u32) -> wrapped_errors::Result<String> {
    match fetch_user(id) {
        Ok(user) => Ok(user),
        Err(err) => Err(wrap(
            Some(err),
            Some(GenericError),
            Some(fields! { "request_id" => "abc-123" }),
        )
        .expect("actual error is present")),
    }
}

fn report(err: &WrappedError) {
    println!("chain:\n  {}\n", err);
    println!("all fields:");
    for (key, value) in err.collect_all_fields() {
        println!("  {}: {}", key, value);
    }
    println!("\nroot stack:\n  {}", err.stacktrace().replace(' ', "\n  "));

    if let Some((_, fields)) = find_generic_error(err) {
        println!("\ngeneric error, request {}", fields["request_id"]);
    }
    if let Some((db, fields)) = find_error(Some(&DbError::Refused("db-1:5432".into())), Some(err)) {
        println!("database refused ({}), user {}", db, fields["user_id"]);
    }
}

fn main() {
    if let Err(err) = profile(42) {
        report(&err);
    }
}
