//! Recorder plugin used by the plugin loading tests
//!
//! Invoked as `<name> <log-dir> [args...]`. Each call appends
//! `<call-number> <name>,<args...>` to `<log-dir>/<name>.log` and returns the
//! call number, counted per loaded copy of the library.

use std::ffi::CStr;
use std::fs::OpenOptions;
use std::io::Write;
use std::os::raw::{c_char, c_int};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

static INITIALIZED: AtomicBool = AtomicBool::new(false);
static CALLS: AtomicI32 = AtomicI32::new(0);

/// # Safety
/// `argv` must be NULL or point to a NULL-terminated array of C strings
unsafe fn collect_args(argv: *const *const c_char) -> Vec<String> {
    let mut args = Vec::new();
    if argv.is_null() {
        return args;
    }
    let mut cursor = argv;
    while !(*cursor).is_null() {
        args.push(CStr::from_ptr(*cursor).to_string_lossy().into_owned());
        cursor = cursor.add(1);
    }
    args
}

#[no_mangle]
pub extern "C" fn initialize() -> c_int {
    INITIALIZED.store(true, Ordering::SeqCst);
    0
}

/// # Safety
/// Called by msh with a NULL-terminated argument vector
#[no_mangle]
pub unsafe extern "C" fn run(argv: *const *const c_char) -> c_int {
    if !INITIALIZED.load(Ordering::SeqCst) {
        return -1;
    }

    let args = collect_args(argv);
    let (Some(name), Some(dir)) = (args.first(), args.get(1)) else {
        return -2;
    };

    let call = CALLS.fetch_add(1, Ordering::SeqCst) + 1;
    let mut recorded = vec![name.as_str()];
    recorded.extend(args[2..].iter().map(String::as_str));

    let log = Path::new(dir).join(format!("{name}.log"));
    let written = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log)
        .and_then(|mut file| writeln!(file, "{call} {}", recorded.join(",")));

    match written {
        Ok(()) => call,
        Err(_) => -3,
    }
}
