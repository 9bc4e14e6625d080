use std::collections::HashMap;
use std::env::consts::DLL_SUFFIX;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::loader::{LoaderError, PluginLibrary, PluginLoader};
use crate::error::{InitFailure, ShellError};

/// Registry of loaded plugins, keyed by the name they were loaded under
pub struct PluginRegistry<L> {
    loader: L,
    dir: PathBuf,
    plugins: HashMap<String, LoadedPlugin>,
}

/// A loaded plugin
struct LoadedPlugin {
    path: PathBuf,
    library: Box<dyn PluginLibrary>,
}

impl<L: PluginLoader> PluginRegistry<L> {
    /// Create an empty registry that resolves plugin names inside `dir`
    #[must_use]
    pub fn new(loader: L, dir: impl Into<PathBuf>) -> Self {
        Self {
            loader,
            dir: dir.into(),
            plugins: HashMap::new(),
        }
    }

    /// Library path for a plugin name, e.g. `./demo.so`
    ///
    /// The name is appended to the plugin directory as text, so a name that
    /// starts with `/` still resolves below it.
    #[must_use]
    pub fn library_path(&self, name: &str) -> PathBuf {
        let mut path = self.dir.clone().into_os_string();
        path.push("/");
        path.push(name);
        path.push(DLL_SUFFIX);
        PathBuf::from(path)
    }

    /// Open, validate and initialize the plugin `name`
    ///
    /// # Errors
    /// - `PluginAlreadyLoaded` if `name` is registered; nothing is opened
    /// - `PluginOpenFailed` if the library cannot be opened
    /// - `PluginInitFailed` if an entry point is missing or the initializer
    ///   returns nonzero
    ///
    /// On error the registry is unchanged and any opened handle is closed.
    pub fn load(&mut self, name: &str) -> Result<(), ShellError> {
        if self.is_loaded(name) {
            return Err(ShellError::PluginAlreadyLoaded {
                name: name.to_string(),
            });
        }

        let path = self.library_path(name);
        debug!("Loading plugin {} from {}", name, path.display());

        let library = self.loader.open(&path).map_err(|e| match e {
            LoaderError::Open { path, source } => ShellError::PluginOpenFailed {
                name: name.to_string(),
                path,
                source,
            },
            LoaderError::MissingSymbol { symbol, source } => ShellError::PluginInitFailed {
                name: name.to_string(),
                source: InitFailure::MissingSymbol { symbol, source },
            },
        })?;

        let status = library.initialize();
        if status != 0 {
            warn!("Plugin {} initializer returned {}", name, status);
            drop(library);
            return Err(ShellError::PluginInitFailed {
                name: name.to_string(),
                source: InitFailure::Status(status),
            });
        }

        info!("Loaded plugin {} ({})", name, path.display());
        self.plugins
            .insert(name.to_string(), LoadedPlugin { path, library });
        Ok(())
    }

    /// Check if plugin is loaded
    #[must_use]
    pub fn is_loaded(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// Run plugin `name` with `args`; returns the runner's status
    ///
    /// The runner receives `[name, args..., NULL]` and executes on the
    /// calling thread until it returns.
    ///
    /// # Errors
    /// Returns `PluginNotLoaded` if `name` is not registered, or
    /// `PluginInvokeFailed` if the arguments cannot cross the ABI
    pub fn invoke(&self, name: &str, args: &[String]) -> Result<i32, ShellError> {
        let plugin = self
            .plugins
            .get(name)
            .ok_or_else(|| ShellError::PluginNotLoaded {
                name: name.to_string(),
            })?;

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push(name.to_string());
        argv.extend_from_slice(args);

        plugin
            .library
            .run(&argv)
            .map_err(|source| ShellError::PluginInvokeFailed {
                name: name.to_string(),
                source,
            })
    }

    /// Close every loaded library exactly once, leaving the registry empty
    pub fn unload_all(&mut self) {
        for (name, plugin) in self.plugins.drain() {
            info!("Unloading plugin {} ({})", name, plugin.path.display());
            drop(plugin);
        }
    }

    /// Get list of loaded plugins, sorted by name
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.plugins.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Path a loaded plugin was opened from
    #[must_use]
    pub fn path_of(&self, name: &str) -> Option<&Path> {
        self.plugins.get(name).map(|p| p.path.as_path())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
