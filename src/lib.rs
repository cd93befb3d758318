pub mod commutator;
pub mod config;
pub mod messages;
pub mod runtime;
