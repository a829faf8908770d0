//! Integration tests for Bancarella.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bancarella-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `order_lifecycle` - Order state, audit derivation, and checkout shapes
//! - `catalog` - Product input shapes and reconciliation semantics
//!
//! The tests in `tests/` exercise the domain logic and wire shapes without
//! a live database. End-to-end tests against a running server require
//! `BANCARELLA_DATABASE_URL` and are run separately.
