//! Shared core: wire codes, connection state, balance formatting, errors.
//!
//! Everything here is pure and compiles on every target.

pub mod balance;
pub mod codes;
pub mod error;
pub mod state;
