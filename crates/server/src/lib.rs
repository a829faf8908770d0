//! Bancarella server library.
//!
//! This crate provides the API server functionality as a library,
//! allowing it to be tested and reused.
//!
//! # Architecture
//!
//! - Axum JSON API consumed by a separate front end
//! - `PostgreSQL` via sqlx for all persistent state
//! - tower-sessions for cookie sessions; identity is resolved once per
//!   request by an extractor and passed explicitly into service calls
//!
//! The one piece with real invariants is order placement: stock is
//! re-checked and decremented under a row lock inside a single transaction
//! so concurrent checkouts can never oversell a variant. See
//! [`services::orders`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
