//! Integration tests for the Shilpkaar marketplace.
//!
//! The tests in `tests/` exercise a running API server over HTTP and are
//! ignored by default.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and apply migrations
//! cargo run -p shilpkaar-cli -- migrate
//! cargo run -p shilpkaar-cli -- seed
//!
//! # Start the API server
//! cargo run -p shilpkaar-api
//!
//! # Run the ignored integration tests against it
//! cargo test -p shilpkaar-integration-tests -- --ignored
//! ```
//!
//! The server address defaults to `http://localhost:4000` and can be
//! overridden with `SHILPKAAR_BASE_URL`.

#![cfg_attr(not(test), forbid(unsafe_code))]
