use crate::config::Config;
use crate::document;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use quire_editor::model::Node;
use quire_editor::OutlineEntry;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct OutlineArgs {
    /// Document file
    pub input: PathBuf,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub fn outline(args: OutlineArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let doc = document::load(&args.input)?;
    let (view, _) = document::settle(doc, &document::document_name(&args.input), &config.editor)?;
    let entries = view.snapshot().outline;

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&entries)?),
        "text" => {
            if entries.is_empty() {
                println!("{}", "No headings".dimmed());
            }
            for line in format_outline(view.doc(), &entries) {
                println!("{}", line);
            }
        }
        other => return Err(anyhow::anyhow!("Unknown format: {}", other)),
    }
    Ok(())
}

/// One indented line per heading, with the page it sits on.
fn format_outline(doc: &Node, entries: &[OutlineEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            let page = doc
                .resolve(entry.pos)
                .ok()
                .and_then(|r| r.page_index())
                .map_or(0, |i| i + 1);
            let indent = "  ".repeat(usize::from(entry.level.saturating_sub(1)));
            format!("{}{} {}", indent, entry.text, format!("p.{}", page).dimmed())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_editor::model::builders::*;
    use quire_editor::outline as collect_outline;

    #[test]
    fn test_format_outline_indents_by_level() {
        colored::control::set_override(false);
        let d = doc(vec![
            page(vec![], vec![heading(1, "Intro"), heading(2, "Scope")], vec![]),
            page(vec![], vec![heading(1, "Terms")], vec![]),
        ]);
        let lines = format_outline(&d, &collect_outline(&d, None));
        assert_eq!(lines, vec!["Intro p.1", "  Scope p.1", "Terms p.2"]);
    }
}
