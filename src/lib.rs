pub mod batch;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod quiz_session;
pub mod report;
