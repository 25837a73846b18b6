//! Domains module containing business logic organized by bounded contexts.
//!
//! The server currently exposes a single capability, tools.

pub mod tools;
