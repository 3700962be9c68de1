use std::fs;

use anyhow::{Context, Result, bail};
use camino::Utf8Path;
use serde::Deserialize;

/// Parsed form of a scaffold description file (`chapter.json` by
/// convention).
#[derive(Debug, Deserialize)]
pub struct TemplateDescription {
    pub chapters: Vec<NodeSpec>,
}

/// One directory in the scaffold tree. Children nest directly under their
/// parent, so the same shape serves chapters, sections and subsections;
/// `subsections` is accepted as a spelling of `sections` so descriptions
/// can use the level's natural word.
#[derive(Debug, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    #[serde(default)]
    pub assets: Vec<String>,
    #[serde(default, alias = "subsections")]
    pub sections: Vec<NodeSpec>,
}

impl TemplateDescription {
    /// Read and validate a description. Malformed JSON and unsafe names are
    /// both fatal; nothing may be created from a description that could
    /// escape the output directory.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading scaffold description {}", path))?;
        let description: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parsing scaffold description {}", path))?;
        description.validate()?;
        Ok(description)
    }

    fn validate(&self) -> Result<()> {
        for node in &self.chapters {
            node.validate()?;
        }
        Ok(())
    }
}

impl NodeSpec {
    fn validate(&self) -> Result<()> {
        validate_component(&self.name, "entry")?;
        for asset in &self.assets {
            validate_component(asset, "asset")?;
        }
        for child in &self.sections {
            child.validate()?;
        }
        Ok(())
    }
}

// Every name becomes a single path component under the output directory.
fn validate_component(name: &str, kind: &str) -> Result<()> {
    if name.is_empty() {
        bail!("{kind} name is empty");
    }
    if name == "." || name == ".." {
        bail!("{kind} name {name:?} is not allowed");
    }
    if name.contains(['/', '\\']) {
        bail!("{kind} name {name:?} contains a path separator");
    }
    Ok(())
}
