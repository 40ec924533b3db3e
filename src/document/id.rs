//! Hierarchical node identifiers
//!
//! An id is a sequence of 2-digit groups, each in `01..=99`, where every group
//! is the node's 1-based index among its siblings at that depth. A child id is
//! its parent's id plus one more group, so `0102` is the second child of root
//! `01`. The synthetic viewport uses the reserved id `00`.

use std::fmt;

use thiserror::Error;

/// Width of one id group in characters
const GROUP_WIDTH: usize = 2;

/// Largest sibling index representable in one group
pub const MAX_SIBLINGS: u8 = 99;

const VIEWPORT_ID: &str = "00";

/// Errors produced by the id scheme
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// Id is empty, has an odd length, or contains non-digits
    #[error("malformed node id '{id}'")]
    Malformed { id: String },

    /// A group is `00` somewhere other than the viewport id
    #[error("node id '{id}' has group {group} out of range 01..=99")]
    GroupOutOfRange { id: String, group: usize },

    /// No room for another sibling under a parent
    #[error("node '{parent}' already has 99 children")]
    Overflow { parent: String },
}

/// Identifier of a node in the design tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
    /// Parse and validate an id
    pub fn parse(id: impl Into<String>) -> Result<Self, IdError> {
        let id = id.into();
        if id == VIEWPORT_ID {
            return Ok(Self(id));
        }
        if id.is_empty() || id.len() % GROUP_WIDTH != 0 || !id.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(IdError::Malformed { id });
        }
        if let Some(group) = id
            .as_bytes()
            .chunks(GROUP_WIDTH)
            .position(|chunk| chunk == b"00")
        {
            return Err(IdError::GroupOutOfRange { id, group });
        }
        Ok(Self(id))
    }

    /// The synthetic viewport id
    pub fn viewport() -> Self {
        Self(VIEWPORT_ID.to_string())
    }

    /// Id of the `index`-th (1-based) root component
    pub fn root(index: usize) -> Result<Self, IdError> {
        if index == 0 || index > MAX_SIBLINGS as usize {
            return Err(IdError::Overflow {
                parent: VIEWPORT_ID.to_string(),
            });
        }
        Ok(Self(format!("{:02}", index)))
    }

    /// Id of this node's `index`-th (1-based) child
    pub fn child(&self, index: usize) -> Result<Self, IdError> {
        if index == 0 || index > MAX_SIBLINGS as usize {
            return Err(IdError::Overflow {
                parent: self.0.clone(),
            });
        }
        if self.is_viewport() {
            return Self::root(index);
        }
        Ok(Self(format!("{}{:02}", self.0, index)))
    }

    /// Parent id, or `None` for root ids and the viewport
    pub fn parent(&self) -> Option<Self> {
        if self.depth() <= 1 {
            return None;
        }
        Some(Self(self.0[..self.0.len() - GROUP_WIDTH].to_string()))
    }

    /// Number of groups; the viewport has depth 0
    pub fn depth(&self) -> usize {
        if self.is_viewport() {
            0
        } else {
            self.0.len() / GROUP_WIDTH
        }
    }

    /// Sibling index encoded in the last group
    pub fn last_index(&self) -> usize {
        if self.is_viewport() {
            return 0;
        }
        self.0[self.0.len() - GROUP_WIDTH..].parse().unwrap_or(0)
    }

    /// Whether `other` lies strictly below this node
    pub fn is_ancestor_of(&self, other: &NodeId) -> bool {
        if self.is_viewport() {
            return !other.is_viewport();
        }
        other.0.len() > self.0.len() && other.0.starts_with(&self.0)
    }

    /// Whether this is a strict one-group extension of `parent`
    pub fn is_child_of(&self, parent: &NodeId) -> bool {
        parent.is_ancestor_of(self) && self.depth() == parent.depth() + 1
    }

    pub fn is_viewport(&self) -> bool {
        self.0 == VIEWPORT_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for NodeId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
