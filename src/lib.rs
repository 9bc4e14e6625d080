//! msh - a minimal shell with runtime-loadable plugins
//!
//! This library provides the pieces of the `msh` binary: reading and
//! tokenizing lines, the plugin registry, and external command execution.
//!
//! # Modules
//!
//! - [`config`]: Configuration management and serialization
//! - [`error`]: Errors reported at the shell boundary
//! - [`tokenizer`]: Whitespace tokenizer and command form
//! - [`plugins`]: Plugin ABI, dynamic library loading and the registry
//! - [`process`]: External command spawning
//! - [`shell`]: The read-classify-execute loop and line sources

pub mod config;
pub mod error;
pub mod plugins;
pub mod process;
pub mod shell;
pub mod tokenizer;
