//! Stable identifiers for the elements of an arm.
//!
//! Joints and linkages are addressed by their declaration position inside an
//! arm. Linkages hold these ids rather than owning the joints they connect.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// JointId
// ---------------------------------------------------------------------------

/// Declaration-order index of a joint within its arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JointId(pub usize);

impl JointId {
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "joint#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// LinkageId
// ---------------------------------------------------------------------------

/// Declaration-order index of a linkage within its arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LinkageId(pub usize);

impl LinkageId {
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for LinkageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "linkage#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_with_prefix() {
        assert_eq!(JointId(3).to_string(), "joint#3");
        assert_eq!(LinkageId(0).to_string(), "linkage#0");
    }

    #[test]
    fn ids_order_by_declaration() {
        assert!(JointId(1) < JointId(2));
        assert_eq!(LinkageId(4).index(), 4);
    }
}
