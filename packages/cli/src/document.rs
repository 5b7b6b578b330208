//! Loading, settling and saving document files.

use anyhow::{anyhow, Context, Result};
use quire_editor::model::{Node, SequentialIds};
use quire_editor::{EditorConfig, EditorView, EstimatingLayout, PostEffectEngine, SettleReport};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub fn load(path: &Path) -> Result<Node> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    parse(&source).with_context(|| format!("Invalid document {}", path.display()))
}

pub fn parse(source: &str) -> Result<Node> {
    Ok(serde_json::from_str(source)?)
}

pub fn save(path: &Path, doc: &Node) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(doc)?)?;
    Ok(())
}

/// A headless view over `doc`. Ids are seeded from `name` so the same file
/// always gets the same ids.
pub fn open_view(doc: Node, name: &str, config: &EditorConfig) -> Result<EditorView> {
    let oracle = EstimatingLayout::new(&config.page, config.layout);
    let effects = PostEffectEngine::with_ids(SequentialIds::for_document(name));
    Ok(EditorView::with_parts(doc, config.clone(), Box::new(oracle), effects)?)
}

/// Open and fully paginate a document.
pub fn settle(doc: Node, name: &str, config: &EditorConfig) -> Result<(EditorView, SettleReport)> {
    let mut view = open_view(doc, name, config)?;
    let report = view.settle()?;
    Ok((view, report))
}

/// Document files under `input`: the file itself, or every `.json` file
/// below a directory.
pub fn find_documents(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(anyhow!("Input path does not exist: {}", input.display()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(input)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    files.sort();
    Ok(files)
}

pub fn document_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document")
        .to_string()
}
