//! Scenario tests for the application coordinator.
//!
//! These drive `App` end to end with mock servers and a manual signal
//! source: start, stop, signal delivery and shutdown failures.

mod cases_lifecycle_test;

pub mod support;
