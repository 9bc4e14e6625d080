//! Hello Plugin - the smallest useful msh plugin

use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

static INITIALIZED: AtomicBool = AtomicBool::new(false);
static CALLS: AtomicUsize = AtomicUsize::new(0);

/// Collect a NULL-terminated argv into owned strings
///
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

/// Plugin initializer
#[no_mangle]
pub extern "C" fn initialize() -> c_int {
    INITIALIZED.store(true, Ordering::SeqCst);
    println!("[hello] Initialized!");
    0
}

/// Plugin runner
///
/// # Safety
/// Called by msh with a NULL-terminated argument vector
#[no_mangle]
pub unsafe extern "C" fn run(argv: *const *const c_char) -> c_int {
    if !INITIALIZED.load(Ordering::SeqCst) {
        eprintln!("[hello] Plugin not initialized");
        return 1;
    }

    let args = collect_args(argv);
    let calls = CALLS.fetch_add(1, Ordering::SeqCst) + 1;
    match args.get(1).map(String::as_str) {
        None => println!("Hello from msh plugin! (call #{calls})"),
        Some("help") => println!("usage: {} [name...]", args[0]),
        Some(_) => println!("Hello, {}! (call #{calls})", args[1..].join(" ")),
    }
    0
}
