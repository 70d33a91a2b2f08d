pub mod auth;
pub mod blocks;
pub mod health;
pub mod pages;

use serde::Serialize;

/// Plain `{ "message": ... }` acknowledgement.
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

impl Message {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}
