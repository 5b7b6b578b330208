use crate::config::{Config, DEFAULT_CONFIG_NAME};
use crate::document;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use quire_editor::model::builders::*;
use quire_editor::model::Node;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Document directory
    #[arg(short, long, default_value = "docs")]
    pub src_dir: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Quire project...".bright_blue().bold());

    let src_dir = PathBuf::from(cwd).join(&args.src_dir);
    if !src_dir.exists() {
        fs::create_dir_all(&src_dir)?;
        println!("  {} Created {}/", "✓".green(), args.src_dir);
    }

    let example_file = src_dir.join("example.json");
    if !example_file.exists() {
        document::save(&example_file, &example_document())?;
        println!("  {} Created example.json", "✓".green());
    }

    let config = Config {
        src_dir: args.src_dir.clone(),
        ..Config::default()
    };
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit {}/example.json", args.src_dir);
    println!("  2. Run: quire paginate {}", args.src_dir);
    println!("  3. Run: quire render {}", args.src_dir);

    Ok(())
}

/// A one-page starter document long enough to need a second page.
fn example_document() -> Node {
    let mut content = vec![
        heading(1, "Quarterly Report"),
        paragraph("Every block below is measured and moved onto the next page once the first one is full."),
        heading(2, "Highlights"),
        bullet_list(vec!["Revenue grew", "Churn fell", "Two new regions launched"]),
        table(2, 3),
    ];
    content.extend((1..=6).map(|i| paragraph(&format!("Section {} notes.", i))));
    doc(vec![page(
        vec![paragraph("ACME Corp.")],
        content,
        vec![paragraph("Confidential")],
    )])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_document_is_valid() {
        let doc = example_document();
        assert!(doc.check().is_ok());
        assert_eq!(doc.page_count(), 1);
    }
}
