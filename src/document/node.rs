//! Node, constraint, and constraint-package types
//!
//! These are the shapes the layout core consumes. The persisted document
//! schema is mapped onto them by [`super::load`].

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use super::id::NodeId;

/// A typed attribute value
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// String-keyed attribute map, ordered for stable output
pub type Attributes = BTreeMap<String, AttributeValue>;

/// The kind of rule a constraint expresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConstraintType {
    Size,
    Edge,
    Center,
    Baseline,
    AspectRatio,
}

impl ConstraintType {
    /// Whether `attribute` is meaningful for this constraint type
    pub fn accepts(self, attribute: Attribute) -> bool {
        use Attribute::*;
        match self {
            ConstraintType::Size => matches!(attribute, Width | Height),
            ConstraintType::Edge => {
                matches!(attribute, Top | Left | Right | Bottom | Leading | Trailing)
            }
            ConstraintType::Center => matches!(attribute, CenterX | CenterY | Center),
            ConstraintType::Baseline => {
                matches!(attribute, FirstBaseline | LastBaseline | Baseline)
            }
            ConstraintType::AspectRatio => matches!(attribute, AspectRatio),
        }
    }
}

/// Attribute a constraint sets, or reads from a referenced node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Attribute {
    Width,
    Height,
    Top,
    Left,
    Right,
    Bottom,
    Leading,
    Trailing,
    CenterX,
    CenterY,
    Center,
    FirstBaseline,
    LastBaseline,
    Baseline,
    AspectRatio,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Attribute::Width => "width",
            Attribute::Height => "height",
            Attribute::Top => "top",
            Attribute::Left => "left",
            Attribute::Right => "right",
            Attribute::Bottom => "bottom",
            Attribute::Leading => "leading",
            Attribute::Trailing => "trailing",
            Attribute::CenterX => "centerX",
            Attribute::CenterY => "centerY",
            Attribute::Center => "center",
            Attribute::FirstBaseline => "firstBaseline",
            Attribute::LastBaseline => "lastBaseline",
            Attribute::Baseline => "baseline",
            Attribute::AspectRatio => "aspectRatio",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Relation {
    #[default]
    EqualTo,
    GreaterThanOrEqualTo,
    LessThanOrEqualTo,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::EqualTo => f.write_str("equalTo"),
            Relation::GreaterThanOrEqualTo => f.write_str("greaterThanOrEqualTo"),
            Relation::LessThanOrEqualTo => f.write_str("lessThanOrEqualTo"),
        }
    }
}

/// How a referenced position is described; both kinds apply as `position + value`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReferenceKind {
    #[default]
    Offset,
    Inset,
}

/// Pointer from a constraint to another node's attribute
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub node_id: NodeId,
    pub attribute: Attribute,
    pub kind: ReferenceKind,
}

/// A single declarative layout rule
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub id: String,
    pub constraint_type: ConstraintType,
    pub attribute: Attribute,
    pub relation: Relation,
    pub value: f64,
    /// `None` means relative to the parent container
    pub reference: Option<Reference>,
}

impl Constraint {
    /// Constraint relative to the parent container
    pub fn new(
        id: impl Into<String>,
        constraint_type: ConstraintType,
        attribute: Attribute,
        relation: Relation,
        value: f64,
    ) -> Self {
        Self {
            id: id.into(),
            constraint_type,
            attribute,
            relation,
            value,
            reference: None,
        }
    }

    /// Attach a reference to another node's attribute
    pub fn with_reference(mut self, node_id: NodeId, attribute: Attribute) -> Self {
        self.reference = Some(Reference {
            node_id,
            attribute,
            kind: ReferenceKind::Offset,
        });
        self
    }

    pub fn referenced_node(&self) -> Option<&NodeId> {
        self.reference.as_ref().map(|r| &r.node_id)
    }
}

/// Named, selectable bundle of constraints
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintPackage {
    pub id: String,
    pub name: String,
    pub is_default: bool,
    pub constraints: Vec<Constraint>,
}

impl ConstraintPackage {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_default: false,
            constraints: Vec::new(),
        }
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }
}

/// Where a virtual node points
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentRef {
    /// Id of the component root being mirrored
    pub referenced_root_id: NodeId,
    /// Display name of the referenced component
    pub reference_type: String,
}

/// Plain node, or a reference that embeds a copy of another component
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Plain,
    Virtual(ComponentRef),
}

/// One UI element in the design tree
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub node_type: String,
    pub attributes: Attributes,
    pub constraint_packages: Vec<ConstraintPackage>,
    pub children: Vec<Node>,
    pub kind: NodeKind,
    /// Set on every descendant of an expanded virtual node; read-only in editors
    pub is_virtual_child: bool,
}

impl Node {
    pub fn new(id: NodeId, node_type: impl Into<String>) -> Self {
        Self {
            id,
            node_type: node_type.into(),
            attributes: Attributes::new(),
            constraint_packages: Vec::new(),
            children: Vec::new(),
            kind: NodeKind::Plain,
            is_virtual_child: false,
        }
    }

    /// A virtual node mirroring the component rooted at `referenced_root_id`
    pub fn component_reference(
        id: NodeId,
        referenced_root_id: NodeId,
        reference_type: impl Into<String>,
    ) -> Self {
        let reference_type = reference_type.into();
        let mut node = Self::new(id, reference_type.clone());
        node.kind = NodeKind::Virtual(ComponentRef {
            referenced_root_id,
            reference_type,
        });
        node
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn with_package(mut self, package: ConstraintPackage) -> Self {
        self.constraint_packages.push(package);
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self.kind, NodeKind::Virtual(_))
    }

    pub fn component_ref(&self) -> Option<&ComponentRef> {
        match &self.kind {
            NodeKind::Virtual(r) => Some(r),
            NodeKind::Plain => None,
        }
    }

    /// Depth-first search for a node by id, including `self`
    pub fn find(&self, id: &NodeId) -> Option<&Node> {
        if &self.id == id {
            return Some(self);
        }
        if !self.id.is_ancestor_of(id) {
            return None;
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        if &self.id == id {
            return Some(self);
        }
        if !self.id.is_ancestor_of(id) {
            return None;
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// Pre-order walk over this node and all descendants
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Every constraint in every package, mutably
    pub fn constraints_mut(&mut self) -> impl Iterator<Item = &mut Constraint> {
        self.constraint_packages
            .iter_mut()
            .flat_map(|p| p.constraints.iter_mut())
    }
}
