pub mod charts;
pub mod client;
pub mod quote;
pub mod search;

pub use client::{client, init, missing_required_env, print_config_guide, ApiError};
