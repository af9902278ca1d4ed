//! sipweave - Assemble METS submission information packages
//!
//! Independent pipeline stages each write one XML fragment (technical,
//! rights or provenance metadata, descriptive metadata, file and
//! structure maps) into a shared workspace directory. sipweave ties these
//! fragments together into one consistent, cross-referenced METS document.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates)
//! - [`core`] - Domain types, identifiers, references, tree, config
//! - [`xml`] - Namespace-aware element tree, parser and serializer
//! - [`workspace`] - Workspace storage abstraction
//! - [`mets`] - METS element builders and fragment files
//! - [`structmap`] - fileSec / structMap synthesis strategies
//! - [`compile`] - Fragment merger and document compiler
//! - [`ui`] - User-facing output
//!
//! # Correctness Invariants
//!
//! 1. Metadata record ids are a pure function of section tag and target
//! 2. Every file pointer resolves to exactly one fileSec entry
//! 3. amdSec fragments sharing an id merge into one amdSec
//! 4. A logical path is either a file or a directory, never both

pub mod cli;
pub mod compile;
pub mod core;
pub mod mets;
pub mod structmap;
pub mod ui;
pub mod workspace;
pub mod xml;
