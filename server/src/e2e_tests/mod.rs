//! End-to-end tests at the HTTP request/response level.
//!
//! Each test file covers a specific scenario, driving the full router with
//! deterministic inputs and a manual clock.

#![cfg(test)]

mod helpers;

mod test_full_flow;
mod test_ownership;
mod test_store_failure;
