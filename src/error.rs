//! Error types surfaced at the shell boundary.

use std::error::Error as StdError;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Boxed error used where the concrete cause depends on the loader or OS.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Every failure a single command line can produce.
///
/// None of these end the read loop: the shell reports them as one diagnostic
/// line and prompts again.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("usage: {usage}")]
    Usage { usage: &'static str },

    #[error("plugin {name} already loaded")]
    PluginAlreadyLoaded { name: String },

    #[error("plugin {name} failed to load")]
    PluginOpenFailed {
        name: String,
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("plugin {name} failed to initialize")]
    PluginInitFailed {
        name: String,
        #[source]
        source: InitFailure,
    },

    #[error("plugin {name} is not loaded")]
    PluginNotLoaded { name: String },

    #[error("plugin {name} could not be invoked")]
    PluginInvokeFailed {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("{name}: command not found")]
    CommandNotFound { name: String },

    #[error("{name}: failed to start")]
    SpawnFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read input")]
    Input {
        #[source]
        source: BoxError,
    },
}

/// Why a plugin that opened successfully was rejected.
#[derive(Debug, thiserror::Error)]
pub enum InitFailure {
    #[error("missing entry point `{symbol}`")]
    MissingSymbol {
        symbol: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("initializer returned status {0}")]
    Status(i32),
}

impl ShellError {
    /// Render the error and its whole source chain on one line.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        let mut line = self.to_string();
        let mut cause = self.source();
        while let Some(err) = cause {
            let _ = write!(line, ": {err}");
            cause = err.source();
        }
        line
    }
}
