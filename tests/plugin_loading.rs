//! Loading real plugin libraries built from `tests/fixtures/recorder`.
//!
//! The recorder appends each argv it receives to `<log-dir>/<name>.log` and
//! returns a call number counted per loaded library, so the logs show both
//! the argument vector that crossed the ABI and which runner handled it.

use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

/// Build the recorder fixture once per test run and return its library path
fn recorder_library() -> &'static Path {
    static LIBRARY: OnceLock<PathBuf> = OnceLock::new();
    LIBRARY.get_or_init(|| {
        let manifest =
            Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/recorder/Cargo.toml");
        let target_dir = Path::new(env!("CARGO_TARGET_TMPDIR")).join("recorder");

        let status = Command::new(env!("CARGO"))
            .args(["build", "--quiet", "--offline", "--manifest-path"])
            .arg(&manifest)
            .arg("--target-dir")
            .arg(&target_dir)
            .env_remove("CARGO_TARGET_DIR")
            .status()
            .expect("failed to run cargo for the recorder fixture");
        assert!(status.success(), "building the recorder fixture failed");

        target_dir
            .join("debug")
            .join(format!("{DLL_PREFIX}msh_recorder{DLL_SUFFIX}"))
    })
}

/// Install a fresh copy of the recorder as `<dir>/<name><DLL_SUFFIX>`
fn install_plugin(dir: &Path, name: &str) {
    fs::copy(recorder_library(), dir.join(format!("{name}{DLL_SUFFIX}")))
        .expect("failed to install recorder plugin");
}

fn read_log(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(format!("{name}.log"))).unwrap_or_default()
}

#[cfg(test)]
mod registry_tests {
    use super::*;
    use msh::error::ShellError;
    use msh::plugins::{DylibLoader, PluginRegistry};
    use tempfile::tempdir;

    #[test]
    fn test_two_plugins_each_reach_their_own_runner() {
        let plugins = tempdir().unwrap();
        let logs = tempdir().unwrap();
        install_plugin(plugins.path(), "alpha");
        install_plugin(plugins.path(), "beta");
        let log_dir = logs.path().to_str().unwrap().to_string();

        let mut registry = PluginRegistry::new(DylibLoader, plugins.path());
        registry.load("alpha").unwrap();
        registry.load("beta").unwrap();
        assert_eq!(registry.names(), vec!["alpha", "beta"]);

        let args = |rest: &[&str]| {
            let mut args = vec![log_dir.clone()];
            args.extend(rest.iter().map(|s| s.to_string()));
            args
        };
        assert_eq!(registry.invoke("alpha", &args(&["x", "y"])).unwrap(), 1);
        assert_eq!(registry.invoke("beta", &args(&["z"])).unwrap(), 1);
        assert_eq!(registry.invoke("alpha", &args(&[])).unwrap(), 2);

        assert_eq!(read_log(logs.path(), "alpha"), "1 alpha,x,y\n2 alpha\n");
        assert_eq!(read_log(logs.path(), "beta"), "1 beta,z\n");

        registry.unload_all();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_load_of_real_plugin_is_rejected() {
        let plugins = tempdir().unwrap();
        let logs = tempdir().unwrap();
        install_plugin(plugins.path(), "demo");
        let log_dir = logs.path().to_str().unwrap().to_string();

        let mut registry = PluginRegistry::new(DylibLoader, plugins.path());
        registry.load("demo").unwrap();

        let err = registry.load("demo").unwrap_err();
        assert!(matches!(err, ShellError::PluginAlreadyLoaded { ref name } if name == "demo"));
        assert_eq!(registry.len(), 1);

        // The original handle is still the one that runs
        let args = vec![log_dir, "x".to_string(), "y".to_string()];
        assert_eq!(registry.invoke("demo", &args).unwrap(), 1);
        assert_eq!(read_log(logs.path(), "demo"), "1 demo,x,y\n");
    }
}

#[cfg(unix)]
mod shell_binary_tests {
    use super::*;
    use std::io::Write;
    use std::process::Stdio;
    use tempfile::tempdir;

    #[test]
    fn test_loaded_plugins_receive_their_arguments() {
        let plugins = tempdir().unwrap();
        let logs = tempdir().unwrap();
        install_plugin(plugins.path(), "alpha");
        install_plugin(plugins.path(), "beta");
        let log_dir = logs.path().to_str().unwrap();

        let script = format!(
            "load alpha\nload beta\nload alpha\nalpha {log_dir} x y\nbeta {log_dir}   z\nexit\n"
        );
        let mut child = Command::new(env!("CARGO_BIN_EXE_msh"))
            .arg("--plugin-dir")
            .arg(plugins.path())
            .env("HOME", plugins.path())
            .env_remove("RUST_LOG")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("failed to start msh");
        let _ = child.stdin.take().unwrap().write_all(script.as_bytes());
        let output = child.wait_with_output().unwrap();

        let stderr = String::from_utf8_lossy(&output.stderr);
        assert_eq!(stderr, "msh: plugin alpha already loaded\n");
        assert_eq!(read_log(logs.path(), "alpha"), "1 alpha,x,y\n");
        assert_eq!(read_log(logs.path(), "beta"), "1 beta,z\n");
        assert_eq!(output.status.code(), Some(0));
    }
}
