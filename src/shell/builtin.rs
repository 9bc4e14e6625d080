use super::Flow;
use crate::error::ShellError;
use crate::plugins::{PluginLoader, PluginRegistry};
use crate::tokenizer::Command;

const LOAD_USAGE: &str = "load <plugin-name>";

/// Commands implemented by the shell itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Exit,
    Load,
}

impl Builtin {
    pub const NAMES: [&'static str; 2] = ["exit", "load"];

    /// Match a verb against the built-in names
    #[must_use]
    pub fn lookup(verb: &str) -> Option<Self> {
        match verb {
            "exit" => Some(Self::Exit),
            "load" => Some(Self::Load),
            _ => None,
        }
    }

    /// Run the built-in
    ///
    /// `exit` only signals the loop; plugins are released by the shell's
    /// shutdown path.
    pub(crate) fn run<L: PluginLoader>(
        self,
        command: &Command,
        registry: &mut PluginRegistry<L>,
    ) -> Result<Flow, ShellError> {
        match self {
            Self::Exit => Ok(Flow::Exit),
            Self::Load => match command.args() {
                [name] => {
                    registry.load(name)?;
                    Ok(Flow::Continue)
                }
                _ => Err(ShellError::Usage { usage: LOAD_USAGE }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::testing::{MockLoader, MockPlugin};

    #[test]
    fn test_lookup() {
        assert_eq!(Builtin::lookup("exit"), Some(Builtin::Exit));
        assert_eq!(Builtin::lookup("load"), Some(Builtin::Load));
        assert_eq!(Builtin::lookup("Load"), None);
        assert_eq!(Builtin::lookup("ls"), None);
        for name in Builtin::NAMES {
            assert!(Builtin::lookup(name).is_some());
        }
    }

    #[test]
    fn test_load_without_name_is_usage_error() {
        let mut registry = PluginRegistry::new(MockLoader::new(), ".");
        let cmd = Command::parse("load").unwrap();

        let err = Builtin::Load.run(&cmd, &mut registry).unwrap_err();

        assert!(matches!(err, ShellError::Usage { .. }));
        assert_eq!(err.to_string(), "usage: load <plugin-name>");
    }

    #[test]
    fn test_load_with_extra_arguments_is_usage_error() {
        let loader = MockLoader::new().with_plugin("demo", MockPlugin::ok());
        let mut registry = PluginRegistry::new(loader.clone(), ".");
        let cmd = Command::parse("load demo extra").unwrap();

        let err = Builtin::Load.run(&cmd, &mut registry).unwrap_err();

        assert!(matches!(err, ShellError::Usage { .. }));
        assert_eq!(loader.opens("demo"), 0);
    }

    #[test]
    fn test_load_delegates_to_registry() {
        let loader = MockLoader::new().with_plugin("demo", MockPlugin::ok());
        let mut registry = PluginRegistry::new(loader, ".");
        let cmd = Command::parse("load demo").unwrap();

        let flow = Builtin::Load.run(&cmd, &mut registry).unwrap();

        assert_eq!(flow, Flow::Continue);
        assert!(registry.is_loaded("demo"));
    }

    #[test]
    fn test_exit_ignores_arguments() {
        let mut registry = PluginRegistry::new(MockLoader::new(), ".");
        let cmd = Command::parse("exit now please").unwrap();
        assert_eq!(Builtin::Exit.run(&cmd, &mut registry).unwrap(), Flow::Exit);
    }
}
