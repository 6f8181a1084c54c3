use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "minicpp",
    about = "Mini C++: tokenize, parse, check and run .cpp sources",
    version,
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct MiniCppCli {
    /// Global: path to config (TOML); default: ~/.minicpp/config.toml
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Global: plain diagnostics without color
    #[arg(long = "no-color", action = ArgAction::SetTrue, global = true)]
    pub no_color: bool,

    /// Global: debug-level logging on stderr
    #[arg(short = 'v', long = "verbose", action = ArgAction::SetTrue, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the token stream as a table.
    Tokens {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Print the parsed syntax tree.
    Ast {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Print the checker's scope tree.
    Symbols {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Emit JSON instead of the indented listing
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// Lex, parse and check; report every diagnostic.
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Check, then interpret the program.
    Run {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_after_subcommand() {
        let cli = MiniCppCli::try_parse_from(["minicpp", "run", "a.cpp", "--no-color", "-v"]).unwrap();
        assert!(cli.no_color && cli.verbose);
        assert!(matches!(cli.cmd, Command::Run { ref file } if file == &PathBuf::from("a.cpp")));
    }

    #[test]
    fn symbols_json_flag() {
        let cli = MiniCppCli::try_parse_from(["minicpp", "symbols", "--json", "a.cpp"]).unwrap();
        assert!(matches!(cli.cmd, Command::Symbols { json: true, .. }));
    }

    #[test]
    fn subcommand_required() {
        assert!(MiniCppCli::try_parse_from(["minicpp"]).is_err());
    }
}
