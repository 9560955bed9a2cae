#![forbid(unsafe_code)]

pub mod batch;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod formats;
pub mod logging;
pub mod prepare;
pub mod report;
pub mod rows;
