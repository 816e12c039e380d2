//! Tests for the client against an in-memory transport.

mod common;
mod session;
