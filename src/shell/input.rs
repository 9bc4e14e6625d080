//! Line sources feeding the read loop
//!
//! [`EditorSource`] is used when stdin is a terminal; [`StreamSource`] reads
//! any byte stream (pipes, files, test buffers).

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::fs;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ShellError;

/// Something that yields one input line per prompt
pub trait LineSource {
    /// Show `prompt` and read the next line, without its line terminator
    ///
    /// Returns `Ok(None)` at end of input.
    ///
    /// # Errors
    /// Returns `ShellError::Input` if the source fails unrecoverably
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, ShellError>;

    /// Called once when the shell stops reading
    fn finish(&mut self) {}
}

/// Interactive line editor with history
pub struct EditorSource {
    editor: DefaultEditor,
    history: Option<PathBuf>,
}

impl EditorSource {
    /// Create an editor configured from `config.history`
    ///
    /// # Errors
    /// Returns an error if the terminal editor cannot be initialized
    pub fn new(config: &Config) -> Result<Self> {
        let editor_config = rustyline::Config::builder()
            .max_history_size(config.history.max_entries)
            .context("Invalid history size")?
            .auto_add_history(false)
            .build();

        let mut editor =
            DefaultEditor::with_config(editor_config).context("Failed to initialize line editor")?;

        let history = if config.history.enabled {
            let path = config.history_path()?;
            if path.exists() {
                if let Err(e) = editor.load_history(&path) {
                    warn!("Failed to load history from {}: {}", path.display(), e);
                }
            }
            Some(path)
        } else {
            None
        };

        Ok(Self { editor, history })
    }
}

impl LineSource for EditorSource {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, ShellError> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if self.history.is_some() && !line.trim().is_empty() {
                    if let Err(e) = self.editor.add_history_entry(line.as_str()) {
                        debug!("Failed to add history entry: {}", e);
                    }
                }
                Ok(Some(line))
            }
            // Ctrl-C discards the line being edited
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(ShellError::Input {
                source: Box::new(e),
            }),
        }
    }

    fn finish(&mut self) {
        let Some(path) = &self.history else {
            return;
        };

        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("Failed to create history directory: {}", e);
                return;
            }
        }
        match self.editor.save_history(path) {
            Ok(()) => debug!("Saved history to {}", path.display()),
            Err(e) => warn!("Failed to save history to {}: {}", path.display(), e),
        }
    }
}

/// Reads newline-terminated lines from a byte stream, echoing the prompt to
/// `prompt_out`
pub struct StreamSource<R, W> {
    reader: R,
    prompt_out: W,
    buffer: Vec<u8>,
}

impl<R: BufRead, W: Write> StreamSource<R, W> {
    pub fn new(reader: R, prompt_out: W) -> Self {
        Self {
            reader,
            prompt_out,
            buffer: Vec::new(),
        }
    }
}

impl<R: BufRead, W: Write> LineSource for StreamSource<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, ShellError> {
        let input_error = |e: std::io::Error| ShellError::Input {
            source: Box::new(e),
        };

        self.prompt_out
            .write_all(prompt.as_bytes())
            .and_then(|()| self.prompt_out.flush())
            .map_err(input_error)?;

        self.buffer.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.buffer)
            .map_err(input_error)?;
        if read == 0 {
            return Ok(None);
        }

        if self.buffer.last() == Some(&b'\n') {
            self.buffer.pop();
            if self.buffer.last() == Some(&b'\r') {
                self.buffer.pop();
            }
        }

        Ok(Some(String::from_utf8_lossy(&self.buffer).into_owned()))
    }
}
