//! add-md command - Import an XML record as a metadata fragment

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use super::create_workspace;
use crate::cli::Context;
use crate::core::types::{LogicalTarget, MetadataCategory, ObjectPath};
use crate::mets::fragment;
use crate::structmap::properties::{self, FileProperties};
use crate::xml;

/// Arguments of `add-md`.
#[derive(Debug)]
pub struct AddMdArgs {
    pub record: PathBuf,
    pub section: MetadataCategory,
    pub md_type: String,
    pub target_file: Option<String>,
    pub stream: Option<u32>,
    pub directory: Option<String>,
    pub order: Option<u32>,
    pub workspace: Option<PathBuf>,
}

/// Wrap the record into a fragment and register its reference.
pub fn add_md(ctx: &Context, args: AddMdArgs) -> Result<()> {
    let verbosity = ctx.verbosity();
    let (dir, _config) = ctx.load_workspace(args.workspace.as_deref())?;
    let ws = create_workspace(&dir)?;

    let record = read_record(&ctx.resolve(&args.record))?;
    let target = target(&args)?;

    let imported = fragment::import_record(&ws, record, args.section, &args.md_type, target)
        .context("Failed to import metadata record")?;

    if let (Some(order), LogicalTarget::File(path) | LogicalTarget::FileStream(path, _)) =
        (args.order, &imported.target)
    {
        properties::write(&ws, path, &FileProperties { order: Some(order) })?;
        verbosity.detail(format!("order of {} set to {}", path, order));
    }

    verbosity.status(format!(
        "Created {} with {} for {}",
        imported.fragment, imported.id, imported.target
    ));
    Ok(())
}

fn target(args: &AddMdArgs) -> Result<Option<LogicalTarget>> {
    let target = match (&args.target_file, args.stream, &args.directory) {
        (Some(file), Some(stream), _) => {
            Some(LogicalTarget::FileStream(ObjectPath::new(file)?, stream))
        }
        (Some(file), None, _) => Some(LogicalTarget::File(ObjectPath::new(file)?)),
        (None, _, Some(dir)) => Some(LogicalTarget::Directory(ObjectPath::new(dir)?)),
        (None, _, None) => None,
    };
    Ok(target)
}

fn read_record(path: &Path) -> Result<xml::Document> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read record '{}'", path.display()))?;
    xml::parse(&contents).with_context(|| format!("Failed to parse record '{}'", path.display()))
}
