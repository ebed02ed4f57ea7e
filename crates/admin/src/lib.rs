//! Shopdesk Admin library.
//!
//! The product admin console as a library, so the router can be exercised
//! from integration tests and the seed command can reuse the repository.
//!
//! # Security
//!
//! Every page under `/admin` requires a session user with the `Admin` role.
//! Sign-in itself belongs to the shared session provider; this crate only
//! reads the identity it leaves behind.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
