use libloading::Library;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::abi::{ArgVector, InitializeFn, RunFn, INITIALIZE_SYMBOLS, RUN_SYMBOLS};
use crate::error::BoxError;

/// An opened plugin with both entry points resolved.
///
/// Implementors own the underlying library handle and release it on drop.
pub trait PluginLibrary {
    /// Run the plugin initializer and return its status (0 = success)
    fn initialize(&self) -> i32;

    /// Run the plugin with `argv`, whose first element is the plugin name
    ///
    /// # Errors
    /// Returns an error if `argv` cannot be passed across the plugin boundary
    fn run(&self, argv: &[String]) -> Result<i32, BoxError>;
}

/// Opens plugin libraries from disk
pub trait PluginLoader {
    /// Open the library at `path` and resolve its entry points
    ///
    /// # Errors
    /// Returns an error if the library cannot be opened or an entry point is
    /// missing; any handle opened along the way is released first
    fn open(&self, path: &Path) -> Result<Box<dyn PluginLibrary>, LoaderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("cannot open {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("missing entry point `{symbol}`")]
    MissingSymbol {
        symbol: &'static str,
        #[source]
        source: BoxError,
    },
}

/// Loader backed by the platform dynamic linker
#[derive(Debug, Default, Clone, Copy)]
pub struct DylibLoader;

impl PluginLoader for DylibLoader {
    fn open(&self, path: &Path) -> Result<Box<dyn PluginLibrary>, LoaderError> {
        // Safety: loading a library runs its constructors. Plugins are trusted
        // in-process code, the same as the runner itself.
        let library = unsafe { Library::new(path) }.map_err(|e| LoaderError::Open {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

        // Safety: the symbol types match the plugin ABI; the copied function
        // pointers are stored next to `library`, which keeps them valid.
        let initialize = unsafe { resolve::<InitializeFn>(&library, INITIALIZE_SYMBOLS)? };
        let run = unsafe { resolve::<RunFn>(&library, RUN_SYMBOLS)? };

        debug!("Resolved plugin entry points in {}", path.display());

        Ok(Box::new(DylibPlugin {
            initialize,
            run,
            library,
        }))
    }
}

/// Look up the first of `names` exported by `library`.
unsafe fn resolve<T: Copy>(
    library: &Library,
    names: &'static [&'static str],
) -> Result<T, LoaderError> {
    let mut last_error: Option<libloading::Error> = None;
    for name in names {
        match library.get::<T>(name.as_bytes()) {
            Ok(symbol) => return Ok(*symbol),
            Err(e) => last_error = Some(e),
        }
    }

    let source: BoxError = match last_error {
        Some(e) => Box::new(e),
        None => "no symbol names to try".into(),
    };
    Err(LoaderError::MissingSymbol {
        symbol: names.first().copied().unwrap_or("?"),
        source,
    })
}

/// A dynamic library with its resolved entry points
struct DylibPlugin {
    initialize: InitializeFn,
    run: RunFn,
    /// Keeps `initialize` and `run` valid; closed when the plugin is dropped
    #[allow(dead_code)]
    library: Library,
}

impl PluginLibrary for DylibPlugin {
    fn initialize(&self) -> i32 {
        // Safety: resolved from the library this struct owns
        unsafe { (self.initialize)() }
    }

    fn run(&self, argv: &[String]) -> Result<i32, BoxError> {
        let (name, args) = argv.split_first().ok_or("empty argument vector")?;
        let argv = ArgVector::new(name, args)?;

        // Safety: `argv` outlives the call and is NULL-terminated
        Ok(unsafe { (self.run)(argv.as_ptr()) })
    }
}
