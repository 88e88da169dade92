pub mod config;
pub mod domain;
pub mod error;
pub mod flow;
pub mod git;
pub mod hosting;
pub mod ui;
pub mod warning;

pub use error::{FlowError, Result};
