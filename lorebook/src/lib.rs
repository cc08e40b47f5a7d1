//! # Lorebook
//!
//! The "World Bible" crate - the data model for keyword-triggered world
//! knowledge. This crate is the single source of truth for lorebook
//! documents and contains no activation logic.
//!
//! ## Core Components
//!
//! - **entry**: `LorebookEntry` - a single triggerable knowledge snippet
//!   with its matching and timing configuration
//! - **book**: `Lorebook` - an ordered collection of entries plus scan
//!   configuration, loaded from the JSON document the persistence layer
//!   produces

pub mod book;
pub mod entry;

pub use book::*;
pub use entry::*;
