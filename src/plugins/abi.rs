//! Plugin ABI definitions
//!
//! A plugin is a C-ABI dynamic library exporting two functions:
//!
//! ```c
//! int initialize(void);              /* 0 on success */
//! int run(char **argv);              /* argv[0] is the plugin name, NULL-terminated */
//! ```
//!
//! `initializer` and `runner` are accepted as alternate symbol names.

use std::ffi::{c_char, c_int, CString, NulError};
use std::ptr;

/// Signature of the plugin initializer
pub type InitializeFn = unsafe extern "C" fn() -> c_int;

/// Signature of the plugin runner
pub type RunFn = unsafe extern "C" fn(argv: *const *const c_char) -> c_int;

/// Exported names tried, in order, for the initializer
pub const INITIALIZE_SYMBOLS: &[&str] = &["initialize", "initializer"];

/// Exported names tried, in order, for the runner
pub const RUN_SYMBOLS: &[&str] = &["run", "runner"];

/// NULL-terminated `argv` built from owned strings.
///
/// The pointers borrow from `strings`, so the vector must stay alive for the
/// whole runner call.
pub struct ArgVector {
    #[allow(dead_code)] // Backing storage for `ptrs`
    strings: Vec<CString>,
    ptrs: Vec<*const c_char>,
}

impl ArgVector {
    /// Build `[name, args..., NULL]`.
    ///
    /// # Errors
    /// Returns an error if any argument contains an interior NUL byte
    pub fn new(name: &str, args: &[String]) -> Result<Self, NulError> {
        let mut strings = Vec::with_capacity(args.len() + 1);
        strings.push(CString::new(name)?);
        for arg in args {
            strings.push(CString::new(arg.as_str())?);
        }

        let mut ptrs: Vec<*const c_char> = strings.iter().map(|s| s.as_ptr()).collect();
        ptrs.push(ptr::null());

        Ok(Self { strings, ptrs })
    }

    /// Pointer to the first element, suitable for `RunFn`
    #[must_use]
    pub fn as_ptr(&self) -> *const *const c_char {
        self.ptrs.as_ptr()
    }

    /// Number of arguments, excluding the terminator
    #[must_use]
    pub fn len(&self) -> usize {
        self.ptrs.len() - 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
