//! Shilpkaar Client - typed access to the search API.
//!
//! - [`backend`] - the [`SearchBackend`] trait and its HTTP implementation
//! - [`session`] - per-surface state machine with stale-response protection
//! - [`controller`] - glue that settles a session from backend responses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod controller;
pub mod session;

pub use backend::{ClientError, HttpSearchBackend, SearchBackend};
pub use controller::SearchController;
pub use session::{Phase, RequestTicket, SearchSession};
