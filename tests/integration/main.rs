//! Integration test target
//!
//! `router_tests` drive the router in-process and only exercise paths that are
//! decided before any query runs, so they need no database. `api_tests` talk to
//! a running server and are ignored by default (`cargo test -- --ignored`).

mod api_tests;
mod common;
mod router_tests;
