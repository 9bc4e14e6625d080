//! External command execution
//!
//! Commands that are neither built-ins nor loaded plugins run as child
//! processes found on `PATH`. The shell blocks until the child exits.

use std::io;
use std::path::PathBuf;
use std::process::{Command as StdCommand, ExitStatus};
use tracing::debug;

use crate::error::ShellError;
use crate::tokenizer::Command;

/// How an external command or plugin finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus(i32);

impl CommandStatus {
    pub const SUCCESS: Self = Self(0);

    #[must_use]
    pub fn from_code(code: i32) -> Self {
        Self(code)
    }

    /// Exit code, using the `128 + signal` convention for signal deaths
    #[must_use]
    pub fn code(self) -> i32 {
        self.0
    }

    #[must_use]
    pub fn success(self) -> bool {
        self.0 == 0
    }
}

impl From<ExitStatus> for CommandStatus {
    fn from(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => Self(code),
            None => Self(terminated_by_signal(status)),
        }
    }
}

#[cfg(unix)]
fn terminated_by_signal(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    match status.signal() {
        Some(signal) => 128 + signal,
        None => -1,
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_status: ExitStatus) -> i32 {
    -1
}

/// Spawns external programs with inherited standard streams
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Resolve a program name on `PATH`
    ///
    /// # Errors
    /// Returns `CommandNotFound` if no executable matches
    pub fn resolve(&self, program: &str) -> Result<PathBuf, ShellError> {
        which::which(program).map_err(|e| {
            debug!("Lookup of {} failed: {}", program, e);
            ShellError::CommandNotFound {
                name: program.to_string(),
            }
        })
    }

    /// Run `command` to completion
    ///
    /// # Errors
    /// Returns `CommandNotFound` if the program is not on `PATH`, or
    /// `SpawnFailed` if it exists but cannot be started or waited on
    pub fn execute(&self, command: &Command) -> Result<CommandStatus, ShellError> {
        let program = self.resolve(command.verb())?;
        debug!("Spawning {} {:?}", program.display(), command.args());

        let spawn_failed = |source: io::Error| {
            if source.kind() == io::ErrorKind::NotFound {
                ShellError::CommandNotFound {
                    name: command.verb().to_string(),
                }
            } else {
                ShellError::SpawnFailed {
                    name: command.verb().to_string(),
                    source,
                }
            }
        };

        let _interrupts = signals::ForwardInterrupts::install();

        let mut process = StdCommand::new(&program);
        process.args(command.args());
        #[cfg(unix)]
        {
            // Keep argv[0] as typed, not the resolved path
            use std::os::unix::process::CommandExt;
            process.arg0(command.verb());
        }

        let mut child = process.spawn().map_err(spawn_failed)?;

        let status = child.wait().map_err(spawn_failed)?;
        let status = CommandStatus::from(status);
        debug!("{} exited with status {}", command.verb(), status.code());
        Ok(status)
    }
}

#[cfg(unix)]
mod signals {
    use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
    use std::ffi::c_int;
    use tracing::warn;

    const FORWARDED: [Signal; 2] = [Signal::SIGINT, Signal::SIGQUIT];

    extern "C" fn ignore_in_shell(_signal: c_int) {}

    /// While alive, terminal interrupts reach only the foreground child.
    ///
    /// A caught signal resets to its default action across `exec`, so the
    /// child still dies on Ctrl-C while the shell keeps running.
    pub struct ForwardInterrupts {
        previous: Vec<(Signal, SigAction)>,
    }

    impl ForwardInterrupts {
        pub fn install() -> Self {
            let action = SigAction::new(
                SigHandler::Handler(ignore_in_shell),
                SaFlags::SA_RESTART,
                SigSet::empty(),
            );
            let mut previous = Vec::with_capacity(FORWARDED.len());
            for signal in FORWARDED {
                // Safety: the handler is async-signal-safe (it does nothing)
                match unsafe { sigaction(signal, &action) } {
                    Ok(old) => previous.push((signal, old)),
                    Err(e) => warn!("Failed to install {:?} handler: {}", signal, e),
                }
            }
            Self { previous }
        }
    }

    impl Drop for ForwardInterrupts {
        fn drop(&mut self) {
            for (signal, old) in self.previous.drain(..) {
                // Safety: restores the disposition that was active before install
                if let Err(e) = unsafe { sigaction(signal, &old) } {
                    warn!("Failed to restore {:?} handler: {}", signal, e);
                }
            }
        }
    }
}

#[cfg(not(unix))]
mod signals {
    pub struct ForwardInterrupts;

    impl ForwardInterrupts {
        pub fn install() -> Self {
            Self
        }
    }
}
