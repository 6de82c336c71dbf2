// Core modules
pub mod env;
pub mod error;
pub mod os;

// Re-export commonly used types
pub use env::RunnerEnv;
pub use error::{FluttercacheError, Result};
pub use os::HostOs;
