//! Generated documents: body splicing for manual edits and format tagging.

pub mod body;
pub mod format;
