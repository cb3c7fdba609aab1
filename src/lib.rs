//! Rename Tatort episode files in a uniform way.
//!
//! Files downloaded from different sites are named in all kinds of ways. Each
//! base name is fuzzy-matched against the episode catalog, ambiguous matches
//! are put to the operator, and the file is renamed to
//! `Tatort <absolute> - <season>x<episode> - <title>`.

pub mod catalog;
pub mod config;
pub mod error;
pub mod formatter;
pub mod fuzzy;
pub mod matcher;
pub mod rename_engine;
pub mod resolver;
pub mod source;
