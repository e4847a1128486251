pub mod catalog;
pub mod cli;
pub mod config;
pub mod model;
pub mod naming;
pub mod redact;
pub mod store;
pub mod wizard;
