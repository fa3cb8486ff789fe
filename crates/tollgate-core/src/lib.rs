pub mod algorithm;
pub mod audit;
pub mod config;
pub mod error;
pub mod escape;
pub mod token;
pub mod validity;

pub use algorithm::Algorithm;
pub use config::{load_params, TokenConfig, TokenConfigBuilder, TokenFileParams};
pub use error::TokenError;
pub use token::TokenSigner;
pub use validity::{parse_start_time, parse_window_seconds, StartTime};
