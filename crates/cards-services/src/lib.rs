//! Companion services: the remote version check and the lifecycle trigger
//! that drives weather refreshes.

pub mod companion;
pub mod error;
pub mod version;

pub use companion::{Companion, LifecycleEvent};
pub use error::CompanionError;
pub use version::{VersionChecker, VersionDescriptor, VersionError, VersionStatus};
