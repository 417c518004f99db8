// psi-common/src/lib.rs
pub mod config;
pub mod error;
pub mod model;

// Re-export key types
pub use config::Config;
pub use error::{PsiError, Result};
pub use model::{BuildMode, InstallRequest, Source};
