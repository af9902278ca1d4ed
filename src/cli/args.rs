//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//!
//! Enumerated values (profile, record status, section, dates, contract
//! id) are parsed through their `FromStr` impls, so invalid values are
//! rejected by clap before any command runs.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::types::{ContractId, MetadataCategory, MetsDate, MetsProfile, RecordStatus};

/// sipweave - Assemble METS submission information packages
#[derive(Parser, Debug)]
#[command(name = "sipweave")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if sipweave was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the fileSec and structMap fragments
    #[command(
        name = "compile-structmap",
        long_about = "Build the fileSec and structMap fragments of the package.\n\n\
            The object list comes from the reference tables in the workspace. \
            By default the structural map mirrors the directory layout; with \
            --structmap-type EAD3-logical it follows the finding aid given \
            with --dmdsec-loc.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Directory-based structural map
    sipweave compile-structmap --structmap-type Directory-physical

    # Structural map from a finding aid
    sipweave compile-structmap --structmap-type EAD3-logical --dmdsec-loc ead3.xml"
    )]
    CompileStructmap {
        /// Workspace directory (default: ./workspace)
        #[arg(long)]
        workspace: Option<PathBuf>,

        /// structMap TYPE, e.g. Directory-physical or EAD3-logical
        #[arg(long)]
        structmap_type: Option<String>,

        /// TYPE of the root div
        #[arg(long)]
        root_type: Option<String>,

        /// Finding aid for the EAD3-logical structural map
        #[arg(long, value_name = "FILE")]
        dmdsec_loc: Option<PathBuf>,

        /// Also print the fragments to stdout
        #[arg(long)]
        stdout: bool,
    },

    /// Merge all fragments into mets.xml
    #[command(
        name = "compile-mets",
        long_about = "Merge every fragment in the workspace into a single METS document.\n\n\
            The document is written to <workspace>/mets.xml. Record status, \
            packaging service and schema versions fall back to the workspace \
            and global configuration when not given.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Compile a cultural heritage package
    sipweave compile-mets ch \"Example Archive\" 12345678-1234-1234-1234-123456789abc

    # Copy the objects in and remove intermediate files
    sipweave compile-mets ch \"Example Archive\" <contract> --copy-files --clean"
    )]
    CompileMets {
        /// METS profile (ch or tpas)
        profile: MetsProfile,

        /// Name of the organization creating the package
        organization: String,

        /// Contract identifier (UUID)
        contractid: ContractId,

        /// Workspace directory (default: ./workspace)
        #[arg(long)]
        workspace: Option<PathBuf>,

        /// Directory the object paths are relative to
        #[arg(long, default_value = ".")]
        base_path: PathBuf,

        /// OBJID of the package (default: random UUID)
        #[arg(long)]
        objid: Option<String>,

        /// LABEL of the package
        #[arg(long)]
        label: Option<String>,

        /// fi:CONTENTID of the package
        #[arg(long)]
        contentid: Option<String>,

        /// CREATEDATE of the header (default: now)
        #[arg(long)]
        create_date: Option<MetsDate>,

        /// LASTMODDATE of the header
        #[arg(long)]
        last_moddate: Option<MetsDate>,

        /// RECORDSTATUS of the header
        #[arg(long)]
        record_status: Option<RecordStatus>,

        /// Remove intermediate files after compiling
        #[arg(long)]
        clean: bool,

        /// Copy the objects from the base path into the workspace
        #[arg(long)]
        copy_files: bool,

        /// Also print the document to stdout
        #[arg(long)]
        stdout: bool,

        /// Name of the packaging service software agent
        #[arg(long)]
        packaging_service: Option<String>,
    },

    /// Import an XML record as a metadata fragment
    #[command(
        name = "add-md",
        long_about = "Wrap an existing XML record into a metadata fragment.\n\n\
            The record gets a deterministic identifier derived from its section, \
            type and target, and the reference is registered for later stages. \
            Without --file or --directory the record describes the package root.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Technical metadata of one file
    sipweave add-md mix.xml --section tech --md-type NISOIMG --file data/img.tif

    # Descriptive metadata of the package
    sipweave add-md dc.xml --section dmd --md-type DC"
    )]
    AddMd {
        /// The XML record to import
        #[arg(value_name = "FILE")]
        record: PathBuf,

        /// Metadata section (dmd, tech, rights, source, digiprov)
        #[arg(long)]
        section: MetadataCategory,

        /// MDTYPE of the wrapped record
        #[arg(long, default_value = "OTHER")]
        md_type: String,

        /// Object the record describes
        #[arg(long = "file", value_name = "PATH")]
        target_file: Option<String>,

        /// Stream of the object the record describes
        #[arg(long, requires = "target_file")]
        stream: Option<u32>,

        /// Directory the record describes
        #[arg(long, value_name = "PATH", conflicts_with = "target_file")]
        directory: Option<String>,

        /// Explicit position of the object among its siblings
        #[arg(long, requires = "target_file")]
        order: Option<u32>,

        /// Workspace directory (default: ./workspace)
        #[arg(long)]
        workspace: Option<PathBuf>,
    },

    /// Remove fragments, reference tables and property files
    Clean {
        /// Workspace directory (default: ./workspace)
        #[arg(long)]
        workspace: Option<PathBuf>,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
INSTALLATION:
    # Bash
    sipweave completion bash > ~/.local/share/bash-completion/completions/sipweave

    # Zsh
    sipweave completion zsh > ~/.zfunc/_sipweave"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_compile_mets() {
        let cli = Cli::try_parse_from([
            "sipweave",
            "compile-mets",
            "tpas",
            "Org",
            "12345678-1234-1234-1234-123456789abc",
            "--record-status",
            "update",
            "--clean",
        ])
        .unwrap();

        match cli.command {
            Command::CompileMets {
                profile,
                record_status,
                clean,
                base_path,
                ..
            } => {
                assert_eq!(profile, MetsProfile::ResearchData);
                assert_eq!(record_status, Some(RecordStatus::Update));
                assert!(clean);
                assert_eq!(base_path, PathBuf::from("."));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_profile() {
        let result = Cli::try_parse_from([
            "sipweave",
            "compile-mets",
            "nope",
            "Org",
            "12345678-1234-1234-1234-123456789abc",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn stream_requires_file() {
        let result =
            Cli::try_parse_from(["sipweave", "add-md", "r.xml", "--section", "tech", "--stream", "1"]);
        assert!(result.is_err());
    }

    #[test]
    fn file_and_directory_conflict() {
        let result = Cli::try_parse_from([
            "sipweave",
            "add-md",
            "r.xml",
            "--section",
            "tech",
            "--file",
            "a.txt",
            "--directory",
            "d",
        ]);
        assert!(result.is_err());
    }
}
