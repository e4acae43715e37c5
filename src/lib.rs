pub mod config;
pub mod models;
pub mod monitor;
pub mod processor;
pub mod runner;
pub mod source;
