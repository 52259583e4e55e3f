//! Integration tests for the Tricity Commerce backend.
//!
//! The test files under `tests/` exercise the pieces that don't need a live
//! `PostgreSQL`: pricing arithmetic, the one-time-code state machine, token
//! round trips, and the frontend-facing response shapes.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tricity-integration-tests
//! ```
