mod commands;
mod config;
mod document;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    init, outline, paginate, render, InitArgs, OutlineArgs, PaginateArgs, RenderArgs,
};
use tracing::Level;

/// Quire CLI - paginate, outline and render paged documents
#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log editor activity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new Quire project
    Init(InitArgs),

    /// Settle pagination of documents and write them back
    Paginate(PaginateArgs),

    /// Print the heading outline of a document
    Outline(OutlineArgs),

    /// Render documents to HTML
    Render(RenderArgs),
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Paginate(args) => paginate(args, &cwd),
        Command::Outline(args) => outline(args, &cwd),
        Command::Render(args) => render(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
