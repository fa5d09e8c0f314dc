pub mod classifier;
pub mod command;
pub mod config;
pub mod diagnose;
pub mod error;
pub mod fs;
pub mod io;
pub mod manager;
pub mod paths;
pub mod pipeline;
pub mod playbook;
pub mod profile;
pub mod report;
pub mod responses;
pub mod state;
pub mod types;

pub use error::{Result, WaypointError};
