use crate::config::Config;
use crate::document;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use quire_editor::SettleReport;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct PaginateArgs {
    /// Document file or directory (defaults to the configured source directory)
    pub input: Option<PathBuf>,

    /// Print the paginated document instead of rewriting the file
    #[arg(long)]
    pub stdout: bool,

    /// Print settle reports as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn paginate(args: PaginateArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let input = args.input.clone().unwrap_or_else(|| config.get_src_dir(cwd));
    let files = document::find_documents(&input)?;

    if files.is_empty() {
        println!("{}", "⚠️  No documents found".yellow());
        return Ok(());
    }
    if !args.stdout && !args.json {
        println!("{}", "📄 Paginating documents...".bright_blue().bold());
    }

    let mut error_count = 0;
    for file in &files {
        match paginate_file(file, &args, &config) {
            Ok(report) => {
                if args.json {
                    println!("{}", serde_json::to_string(&report)?);
                } else if !args.stdout {
                    print_report(file, &report);
                }
            }
            Err(e) => {
                error_count += 1;
                eprintln!("  {} {} - {}", "✗".red(), file.display(), e.to_string().red());
            }
        }
    }

    if error_count > 0 {
        return Err(anyhow::anyhow!("{} of {} documents failed", error_count, files.len()));
    }
    Ok(())
}

fn paginate_file(file: &Path, args: &PaginateArgs, config: &Config) -> Result<SettleReport> {
    let doc = document::load(file)?;
    let (view, report) = document::settle(doc, &document::document_name(file), &config.editor)?;
    if args.stdout {
        println!("{}", serde_json::to_string_pretty(view.doc())?);
    } else {
        document::save(file, view.doc())?;
    }
    Ok(report)
}

fn print_report(file: &Path, report: &SettleReport) {
    let moved: usize = report.corrections.iter().map(|c| c.moved).sum();
    let created = report.corrections.iter().filter(|c| c.created_page).count();
    let status = if report.converged { "✓".green() } else { "⚠️".yellow() };
    println!(
        "  {} {} ({} cycles, {} blocks moved, {} pages added)",
        status,
        file.display(),
        report.cycles,
        moved,
        created
    );
    if !report.skipped.is_empty() {
        println!("    {} unmeasured pages: {:?}", "⚠️".yellow(), report.skipped);
    }
    if !report.converged {
        println!("    {}", "pagination stopped before the document settled".yellow());
    }
}
