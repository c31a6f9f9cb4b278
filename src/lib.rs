pub mod capture;
pub mod cli;
pub mod config;
pub mod daemon;
pub mod error;
pub mod history;
pub mod platform;
pub mod report;
pub mod service;
pub mod store;
pub mod util;

pub use error::{Error, Result};
