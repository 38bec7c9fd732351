use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "sentinel")]
#[command(about = "Keyboard-first habit tracker for the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run against the configured data service
    Run,
    /// Run with seeded in-memory data, no login needed
    Dev,
    /// Log in with a one-time code sent by email
    Login,
    /// Revoke and remove the local session
    Logout,
    /// Print config path and create default file if missing
    ConfigPath,
}

impl Commands {
    /// Everything but `config-path` talks to a service and logs to the file.
    pub fn writes_log(&self) -> bool {
        !matches!(self, Commands::ConfigPath)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kebab_case_subcommands() {
        let cli = Cli::try_parse_from(["sentinel", "config-path"]).expect("parse");
        assert!(matches!(cli.command, Commands::ConfigPath));
        assert!(Cli::try_parse_from(["sentinel"]).is_err());
    }

    #[test]
    fn service_commands_write_the_log() {
        for args in [["sentinel", "login"], ["sentinel", "logout"], ["sentinel", "run"], ["sentinel", "dev"]] {
            let cli = Cli::try_parse_from(args).expect("parse");
            assert!(cli.command.writes_log(), "{args:?} should log");
        }
        let cli = Cli::try_parse_from(["sentinel", "config-path"]).expect("parse");
        assert!(!cli.command.writes_log());
    }
}
