use clap::Parser; // trait import enables MiniCppCli::parse()
use std::process::exit;

use tracing_subscriber::EnvFilter;

use minicpp::cli::{Command, MiniCppCli};
use minicpp::commands;
use minicpp::config::{self, resolve_config_path};

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("MINICPP_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = MiniCppCli::parse();
    init_logging(args.verbose);

    let cfg_path = resolve_config_path(&args.config);
    let cfg = config::load(cfg_path.as_deref())?;
    if args.no_color || !cfg.color {
        colored::control::set_override(false);
    }

    let clean = match &args.cmd {
        Command::Tokens { file } => commands::tokens::main(file)?,
        Command::Ast { file } => commands::ast::main(file)?,
        Command::Symbols { file, json } => commands::symbols::main(file, *json)?,
        Command::Check { file } => commands::check::main(file)?,
        Command::Run { file } => commands::run::main(file, cfg.max_call_depth)?,
    };

    if !clean {
        exit(1);
    }
    Ok(())
}
