//! compile-structmap command - Build the fileSec and structMap fragments

use std::fs;
use std::path::Path;

use anyhow::{bail, Context as _, Result};

use super::open_workspace;
use crate::cli::Context;
use crate::core::references::ReferenceIndex;
use crate::core::types::StructmapType;
use crate::mets::fragment;
use crate::structmap::{ead3, filesystem, StructmapOptions};
use crate::ui::output;
use crate::xml::{self, NamespaceMap};

/// structMap TYPE used when neither the flag nor the configuration sets one.
const DEFAULT_STRUCTMAP_TYPE: &str = "PHYSICAL";

/// Build the structural map of the workspace and store both fragments.
pub fn compile_structmap(
    ctx: &Context,
    workspace: Option<&Path>,
    structmap_type: Option<&str>,
    root_type: Option<&str>,
    dmdsec_loc: Option<&Path>,
    stdout: bool,
) -> Result<()> {
    let verbosity = ctx.verbosity();
    let (dir, config) = ctx.load_workspace(workspace)?;
    let ws = open_workspace(&dir)?;

    let structmap_type = structmap_type
        .or_else(|| config.structmap_type())
        .unwrap_or(DEFAULT_STRUCTMAP_TYPE);
    let structmap_type = StructmapType::new(structmap_type)?;
    let root_type = root_type.or_else(|| config.root_type()).map(str::to_string);
    let options = StructmapOptions::new(structmap_type).with_root_type(root_type);

    let index = ReferenceIndex::load(&ws).context("Failed to read reference tables")?;
    let objects = index.objects();
    verbosity.detail(format!("{} objects in {} references", objects.len(), index.len()));
    if objects.is_empty() {
        verbosity.warn("no objects are referenced in the workspace");
    }

    let built = if options.structmap_type.is_ead3_logical() {
        let Some(location) = dmdsec_loc else {
            bail!(
                "--dmdsec-loc is required for structmap type {}",
                StructmapType::EAD3_LOGICAL
            );
        };
        let finding_aid = read_finding_aid(&ctx.resolve(location))?;
        ead3::build(&finding_aid.root, &objects, &ws, &index, &options)?
    } else {
        filesystem::build(&objects, &ws, &index, &options)?
    };

    built.write(&ws).context("Failed to write structural map fragments")?;

    if stdout {
        for section in [&built.filesec, &built.structmap] {
            let doc = fragment::wrap(section.clone(), NamespaceMap::new());
            output::document(&doc.to_xml_string()?);
        }
    }

    verbosity.status(format!(
        "Created filesec.xml and structmap.xml in {} ({} files)",
        dir.display(),
        built.file_count()
    ));
    Ok(())
}

fn read_finding_aid(path: &Path) -> Result<xml::Document> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read finding aid '{}'", path.display()))?;
    xml::parse(&contents)
        .with_context(|| format!("Failed to parse finding aid '{}'", path.display()))
}
