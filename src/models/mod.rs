pub mod artifact;
pub mod config;
pub mod config_validator;
pub mod dump_result;
pub mod error;
pub mod run_summary;
