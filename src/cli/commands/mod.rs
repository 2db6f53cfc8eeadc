//! CLI command implementations.

mod config;
mod doctor;
mod models;
mod serve;
mod summarize;

pub use config::run_config;
pub use doctor::run_doctor;
pub use models::run_models;
pub use serve::run_serve;
pub use summarize::{infer_content_type, run_summarize};
