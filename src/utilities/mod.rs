//! Configuration, errors and console/file helpers.

pub mod config;
pub mod errors;
pub mod file_handler;
pub mod printer;
