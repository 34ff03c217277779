//! Core library components.

pub mod bootstrap;
pub mod command;
pub mod constants;
pub mod django;
pub mod phase;
pub mod secrets;
pub mod server;
pub mod settings;
pub mod startup;
