use crate::config::Config;
use crate::document;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use quire_editor::model::to_html;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Document file or directory (defaults to the configured source directory)
    pub input: Option<PathBuf>,

    /// Output to stdout instead of files
    #[arg(long)]
    pub stdout: bool,

    /// Output directory (overrides config)
    #[arg(short, long)]
    pub out_dir: Option<String>,

    /// Render without paginating first
    #[arg(long)]
    pub raw: bool,
}

pub fn render(args: RenderArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let input = args.input.clone().unwrap_or_else(|| config.get_src_dir(cwd));
    let files = document::find_documents(&input)?;
    let out_dir = match &args.out_dir {
        Some(out) => PathBuf::from(cwd).join(out),
        None => config.get_out_dir(cwd),
    };

    if !args.stdout {
        println!("{}", "🖨️  Rendering documents...".bright_blue().bold());
    }

    for file in &files {
        let name = document::document_name(file);
        let mut doc = document::load(file)?;
        if !args.raw {
            doc = document::settle(doc, &name, &config.editor)?.0.doc().clone();
        }
        let html = to_html(&doc);

        if args.stdout {
            println!("{}", html);
            continue;
        }
        let output_file = out_dir.join(&name).with_extension("html");
        if let Some(parent) = output_file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_file, html)?;
        println!(
            "  {} {} → {}",
            "✓".green(),
            file.display(),
            output_file.display()
        );
    }
    Ok(())
}
