//! The read-classify-execute loop
//!
//! Each line is tokenized and routed, first match wins:
//!
//! 1. a built-in (`exit`, `load`)
//! 2. a loaded plugin of that name
//! 3. an external program on `PATH`
//!
//! Errors from any route are reported as one diagnostic line and the loop
//! prompts again. Only `exit` and the end of input stop it.

mod builtin;
pub mod input;

use std::io::Write;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::ShellError;
use crate::plugins::{DylibLoader, PluginLoader, PluginRegistry};
use crate::process::{CommandStatus, ProcessExecutor};
use crate::tokenizer::Command;

pub use builtin::Builtin;
pub use input::{EditorSource, LineSource, StreamSource};

/// Exit code for `exit` and end of input
pub const EXIT_OK: u8 = 0;
/// Exit code when the shell could not start
pub const EXIT_STARTUP_FAILURE: u8 = 1;
/// Exit code when the line source failed while running
pub const EXIT_INPUT_FAILURE: u8 = 2;

/// What the loop does after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// The `exit` built-in
    Exit,
    /// The line source reached end of input
    EndOfInput,
    /// The line source failed
    InputFailed,
}

impl Shutdown {
    /// Process exit code for this shutdown reason
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Exit | Self::EndOfInput => EXIT_OK,
            Self::InputFailed => EXIT_INPUT_FAILURE,
        }
    }
}

/// Where a command is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Builtin(Builtin),
    Plugin,
    External,
}

/// Interactive shell session
pub struct Shell<L: PluginLoader = DylibLoader> {
    prompt: String,
    registry: PluginRegistry<L>,
    executor: ProcessExecutor,
    last_status: CommandStatus,
}

impl Shell<DylibLoader> {
    /// Create a shell that loads real dynamic libraries
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config, DylibLoader)
    }
}

impl<L: PluginLoader> Shell<L> {
    #[must_use]
    pub fn new(config: &Config, loader: L) -> Self {
        Self {
            prompt: config.prompt.clone(),
            registry: PluginRegistry::new(loader, config.plugins.dir.clone()),
            executor: ProcessExecutor::new(),
            last_status: CommandStatus::SUCCESS,
        }
    }

    /// Load each plugin in `names`, reporting failures without stopping
    pub fn autoload<W: Write>(&mut self, names: &[String], diagnostics: &mut W) {
        for name in names {
            if let Err(e) = self.registry.load(name) {
                report(diagnostics, &e);
            }
        }
    }

    /// Decide where `command` goes
    #[must_use]
    pub fn classify(&self, command: &Command) -> Route {
        if let Some(builtin) = Builtin::lookup(command.verb()) {
            Route::Builtin(builtin)
        } else if self.registry.is_loaded(command.verb()) {
            Route::Plugin
        } else {
            Route::External
        }
    }

    /// Tokenize, classify and execute one input line
    ///
    /// Blank lines are a no-op.
    ///
    /// # Errors
    /// Returns the error of whichever route handled the command
    pub fn execute_line(&mut self, line: &str) -> Result<Flow, ShellError> {
        let Some(command) = Command::parse(line) else {
            return Ok(Flow::Continue);
        };

        let route = self.classify(&command);
        debug!("{} -> {:?}", command.verb(), route);

        match route {
            Route::Builtin(builtin) => builtin.run(&command, &mut self.registry),
            Route::Plugin => {
                let status = self.registry.invoke(command.verb(), command.args())?;
                self.record_status(&command, CommandStatus::from_code(status));
                Ok(Flow::Continue)
            }
            Route::External => {
                let status = self.executor.execute(&command)?;
                self.record_status(&command, status);
                Ok(Flow::Continue)
            }
        }
    }

    /// Run the loop until `exit` or end of input, then release every plugin
    pub fn run<S: LineSource, W: Write>(&mut self, source: &mut S, diagnostics: &mut W) -> Shutdown {
        let shutdown = loop {
            let line = match source.read_line(&self.prompt) {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!("End of input");
                    break Shutdown::EndOfInput;
                }
                Err(e) => {
                    error!("Input failed: {}", e.diagnostic());
                    report(diagnostics, &e);
                    break Shutdown::InputFailed;
                }
            };

            match self.execute_line(&line) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break Shutdown::Exit,
                Err(e) => report(diagnostics, &e),
            }
        };

        source.finish();
        self.shutdown();
        info!("Shell stopped: {:?}", shutdown);
        shutdown
    }

    /// Release every loaded plugin
    pub fn shutdown(&mut self) {
        self.registry.unload_all();
    }

    #[must_use]
    pub fn registry(&self) -> &PluginRegistry<L> {
        &self.registry
    }

    /// Status of the most recent plugin or external command
    #[must_use]
    pub fn last_status(&self) -> CommandStatus {
        self.last_status
    }

    fn record_status(&mut self, command: &Command, status: CommandStatus) {
        if !status.success() {
            debug!("{} finished with status {}", command.verb(), status.code());
        }
        self.last_status = status;
    }
}

fn report<W: Write>(diagnostics: &mut W, err: &ShellError) {
    if let Err(e) = writeln!(diagnostics, "msh: {}", err.diagnostic()) {
        warn!("Failed to write diagnostic: {}", e);
    }
}
