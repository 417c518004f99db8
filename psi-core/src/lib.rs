// psi-core/src/lib.rs
pub mod build;
pub mod install;
pub mod process;

pub use build::devtools::{Platform, SystemProbe, ToolchainProbe};
pub use build::env::SearchPaths;
pub use build::patch::ConfigureFlags;
pub use install::python::PythonInfo;
