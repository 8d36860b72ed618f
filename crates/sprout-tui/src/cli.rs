//! Command-line argument parsing.

use clap::Parser;

use crate::routes::Route;

#[derive(Parser, Debug)]
#[command(name = "sprout")]
#[command(version)]
#[command(about = "Terminal starter app with a welcome screen and sign-in")]
pub struct Cli {
    /// Start on a route (/, /login, /home)
    #[arg(long, value_name = "PATH", default_value = "/", value_parser = parse_route)]
    open: Route,

    /// Sign in from the terminal prompt, without the UI
    #[arg(long, conflicts_with_all = ["logout", "whoami"])]
    login: bool,

    /// Clear the saved session and exit
    #[arg(long, conflicts_with = "whoami")]
    logout: bool,

    /// Print the signed-in user and exit
    #[arg(long)]
    whoami: bool,

    /// Keep the session in memory only
    #[arg(long)]
    pub ephemeral: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Tui { start: Route },
    Login,
    Logout,
    Whoami,
}

impl Cli {
    pub fn command(&self) -> Command {
        if self.login {
            Command::Login
        } else if self.logout {
            Command::Logout
        } else if self.whoami {
            Command::Whoami
        } else {
            Command::Tui { start: self.open }
        }
    }
}

fn parse_route(path: &str) -> Result<Route, String> {
    Route::from_path(path).ok_or_else(|| format!("unknown route '{}'", path))
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;

    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("sprout").chain(args.iter().copied()))
    }

    #[test]
    fn test_no_args_starts_tui_on_welcome() {
        let cli = parse(&[]).unwrap();
        assert_eq!(cli.command(), Command::Tui { start: Route::Index });
        assert!(!cli.ephemeral);
    }

    #[test]
    fn test_open_route() {
        let cli = parse(&["--open", "/home", "--ephemeral"]).unwrap();
        assert_eq!(cli.command(), Command::Tui { start: Route::Home });
        assert!(cli.ephemeral);
    }

    #[test]
    fn test_subcommands() {
        assert_eq!(parse(&["--login"]).unwrap().command(), Command::Login);
        assert_eq!(parse(&["--logout"]).unwrap().command(), Command::Logout);
        assert_eq!(parse(&["--whoami"]).unwrap().command(), Command::Whoami);
    }

    #[test]
    fn test_help() {
        let err = parse(&["-h"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_errors() {
        assert!(parse(&["--open"]).is_err());
        assert_eq!(
            parse(&["--open", "/nowhere"]).unwrap_err().kind(),
            ErrorKind::ValueValidation
        );
        assert_eq!(
            parse(&["--bogus"]).unwrap_err().kind(),
            ErrorKind::UnknownArgument
        );
        assert_eq!(
            parse(&["--login", "--logout"]).unwrap_err().kind(),
            ErrorKind::ArgumentConflict
        );
    }
}
