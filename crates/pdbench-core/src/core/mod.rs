//! # Core Module
//!
//! Stateless building blocks shared by every benchmark workflow.
//!
//! - **Identifiers** ([`chains`]) - Canonical PDB chain identifiers and chain-list parsing
//! - **Alphabet** ([`residues`]) - The 20 standard amino acids and residue-name lookup
//! - **Geometry** ([`geometry`]) - Backbone dihedral angles
//! - **File I/O** ([`io`]) - PDB structures, prediction matrices and domain boundaries

pub mod chains;
pub mod geometry;
pub mod io;
pub mod residues;
