//! CLI command implementations.

mod clip;
mod config;
mod doctor;
mod forget;
mod jq;
mod wisdom;
mod yt;

pub use clip::run_clip;
pub use config::run_config;
pub use doctor::run_doctor;
pub use forget::run_forget;
pub use jq::run_jq;
pub use wisdom::run_wisdom;
pub use yt::run_yt;
