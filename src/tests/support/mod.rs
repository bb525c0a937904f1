// Shared test support code for lifecycle scenario tests.

pub mod common;
pub mod server;

pub use common::*;
pub use server::{MockServer, StopBehavior};
