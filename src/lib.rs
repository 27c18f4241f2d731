#![doc = "The `taskshelf` library crate."]
#![doc = ""]
#![doc = "A multi-user task tracker: users register and log in with bearer tokens, manage"]
#![doc = "their own tasks, and attach JPEG/PNG images to them. The binary (`main.rs`) wires"]
#![doc = "a PostgreSQL-backed `AppState` into an actix-web server."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;

pub use error::AppError;
pub use state::AppState;
