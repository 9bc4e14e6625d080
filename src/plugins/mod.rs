//! Runtime-loaded plugins
//!
//! - [`abi`]: the C entry points every plugin exports
//! - [`loader`]: opening libraries and resolving entry points (libloading)
//! - [`registry`]: the name-keyed set of loaded plugins
//!
//! Plugins are trusted in-process code. A fault inside a runner is not
//! isolated and takes the shell down with it.

pub mod abi;
pub mod loader;
pub mod registry;

pub use loader::{DylibLoader, LoaderError, PluginLibrary, PluginLoader};
pub use registry::PluginRegistry;
