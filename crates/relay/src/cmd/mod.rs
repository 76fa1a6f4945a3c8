//! Command implementations for the Relay CLI

pub mod check;
pub mod serve;
pub mod status;
