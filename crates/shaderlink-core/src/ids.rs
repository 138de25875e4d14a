//! Handle types shared by every compiler pass.
//!
//! Variables live in an arena owned by the bundle and are addressed by
//! [`VarId`]; modules are identified by [`SourceId`] inside spans.

use std::fmt;

/// Identifies one source module.
///
/// Assigned by whoever builds the module AST; the bundle keeps the mapping
/// back to the module path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SourceId(u32);

impl SourceId {
    /// Create a new source ID with the given index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the underlying index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "src_{}", self.0)
    }
}

impl From<u32> for SourceId {
    fn from(index: u32) -> Self {
        Self::new(index)
    }
}

/// Handle of a variable record in the variable arena.
///
/// Identity is stable for the lifetime of a bundle build: renaming and value
/// updates happen on the record, never on the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(u32);

impl VarId {
    /// Create a new variable ID with the given index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the underlying index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "var_{}", self.0)
    }
}

impl From<u32> for VarId {
    fn from(index: u32) -> Self {
        Self::new(index)
    }
}

impl From<VarId> for u32 {
    fn from(id: VarId) -> Self {
        id.0
    }
}
