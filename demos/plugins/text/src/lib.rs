//! Text Plugin - text manipulation utilities
//!
//! usage: text <upper|lower|reverse|count|title|rot13> <words...>

use std::ffi::CStr;
use std::os::raw::{c_char, c_int};

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

fn to_title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn rot13(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'a'..='z' => (((c as u8 - b'a' + 13) % 26) + b'a') as char,
            'A'..='Z' => (((c as u8 - b'A' + 13) % 26) + b'A') as char,
            _ => c,
        })
        .collect()
}

fn process(operation: &str, text: &str) -> Option<String> {
    match operation {
        "upper" => Some(text.to_uppercase()),
        "lower" => Some(text.to_lowercase()),
        "reverse" => Some(text.chars().rev().collect()),
        "count" => Some(format!(
            "Characters: {}, Words: {}",
            text.chars().count(),
            text.split_whitespace().count()
        )),
        "title" => Some(to_title_case(text)),
        "rot13" => Some(rot13(text)),
        _ => None,
    }
}

/// Plugin initializer
#[no_mangle]
pub extern "C" fn initialize() -> c_int {
    0
}

/// Plugin runner
///
/// # Safety
/// Called by msh with a NULL-terminated argument vector
#[no_mangle]
pub unsafe extern "C" fn run(argv: *const *const c_char) -> c_int {
    let args = collect_args(argv);
    let Some(operation) = args.get(1) else {
        eprintln!("usage: text <upper|lower|reverse|count|title|rot13> <words...>");
        return 2;
    };

    let text = args[2..].join(" ");
    match process(operation, &text) {
        Some(result) => {
            println!("{result}");
            0
        }
        None => {
            eprintln!("text: unknown operation `{operation}`");
            2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operations() {
        assert_eq!(process("upper", "abc def").unwrap(), "ABC DEF");
        assert_eq!(process("title", "hello WORLD").unwrap(), "Hello World");
        assert_eq!(process("rot13", "Hello").unwrap(), "Uryyb");
        assert_eq!(process("count", "a bb").unwrap(), "Characters: 4, Words: 2");
        assert!(process("explode", "x").is_none());
    }
}
