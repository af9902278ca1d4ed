//! compile-mets command - Merge all fragments into mets.xml

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use super::open_workspace;
use crate::cli::Context;
use crate::compile::{self, housekeeping, Agents, HeaderAttributes, MetsAttributes};
use crate::core::paths::WorkspacePaths;
use crate::core::references::ReferenceIndex;
use crate::core::types::{ContractId, MetsDate, MetsProfile, ObjectPath, RecordStatus};
use crate::ui::output;

/// Arguments of `compile-mets`.
#[derive(Debug)]
pub struct CompileMetsArgs {
    pub profile: MetsProfile,
    pub organization: String,
    pub contractid: ContractId,
    pub workspace: Option<PathBuf>,
    pub base_path: PathBuf,
    pub objid: Option<String>,
    pub label: Option<String>,
    pub contentid: Option<String>,
    pub create_date: Option<MetsDate>,
    pub last_moddate: Option<MetsDate>,
    pub record_status: Option<RecordStatus>,
    pub clean: bool,
    pub copy_files: bool,
    pub stdout: bool,
    pub packaging_service: Option<String>,
}

/// Compile the METS document of the workspace.
pub fn compile_mets(ctx: &Context, args: CompileMetsArgs) -> Result<()> {
    let verbosity = ctx.verbosity();
    let (dir, config) = ctx.load_workspace(args.workspace.as_deref())?;
    let ws = open_workspace(&dir)?;

    let mut mets = MetsAttributes::new(args.profile, args.contractid);
    if let Some(objid) = args.objid {
        mets.objid = objid;
    }
    mets.label = args.label;
    mets.contentid = args.contentid;
    mets.catalog_version = config.catalog_version().to_string();
    mets.specification_version = config.specification_version().to_string();

    let header = HeaderAttributes {
        create_date: args.create_date.unwrap_or_else(MetsDate::now),
        last_mod_date: args.last_moddate,
        record_status: args.record_status.unwrap_or_else(|| config.record_status()),
    };
    let agents = Agents {
        organization: args.organization,
        packaging_service: args
            .packaging_service
            .or_else(|| config.packaging_service().map(str::to_string)),
    };

    let doc = compile::compile(&ws, &mets, &header, &agents).context("Failed to compile METS")?;
    let xml = compile::write_document(&ws, &doc)?;
    let document_path = WorkspacePaths::new(dir.clone()).mets_document_path();
    verbosity.status(format!("Compiled {}", document_path.display()));

    if args.copy_files {
        let objects = ReferenceIndex::load(&ws)
            .context("Failed to read reference tables")?
            .objects();
        let base = ctx.resolve(&args.base_path);
        let copied = copy_objects(&base, &dir, &objects)?;
        verbosity.status(format!("Copied {} objects into the workspace", copied));
    }

    if args.clean {
        let removed = housekeeping::clean_workspace(&ws)?;
        verbosity.status(format!("Removed {} intermediate files", removed.len()));
        verbosity.detail(output::format_list(&removed, "  - "));
    }

    if args.stdout {
        output::document(&xml);
    }
    Ok(())
}

fn copy_objects(base: &Path, dir: &Path, objects: &[ObjectPath]) -> Result<usize> {
    housekeeping::copy_objects(base, &WorkspacePaths::new(dir.to_path_buf()), objects)
        .with_context(|| format!("Failed to copy objects from '{}'", base.display()))
}
