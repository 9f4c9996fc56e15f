pub mod cli;
pub mod error;
pub mod export;
pub mod metrics;
pub mod plot;
pub mod run_info;
