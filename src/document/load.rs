//! TOML document loading
//!
//! The persisted schema mirrors the node model loosely; records are read with
//! serde and then converted and validated into [`Document`].
//!
//! ```toml
//! [[nodes]]
//! id = "01"
//! type = "Screen"
//!
//! [[nodes.constraint_packages]]
//! id = "main"
//! name = "Main"
//! is_default = true
//!
//! [[nodes.constraint_packages.constraints]]
//! id = "w"
//! type = "size"
//! attribute = "width"
//! value = 320
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::error::DocumentError;

use super::id::NodeId;
use super::node::{
    Attribute, Attributes, ComponentRef, Constraint, ConstraintPackage, ConstraintType, Node,
    NodeKind, Reference, ReferenceKind, Relation,
};
use super::Document;

#[derive(Deserialize)]
struct TomlDocument {
    #[serde(default)]
    nodes: Vec<TomlNode>,
}

#[derive(Deserialize)]
struct TomlNode {
    id: String,
    #[serde(rename = "type")]
    node_type: String,
    #[serde(default)]
    attributes: Attributes,
    #[serde(default)]
    constraint_packages: Vec<TomlPackage>,
    #[serde(default)]
    children: Vec<TomlNode>,
    referenced_root_id: Option<String>,
    reference_type: Option<String>,
}

#[derive(Deserialize)]
struct TomlPackage {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    is_default: bool,
    #[serde(default)]
    constraints: Vec<TomlConstraint>,
}

#[derive(Deserialize)]
struct TomlConstraint {
    id: String,
    #[serde(rename = "type")]
    constraint_type: ConstraintType,
    attribute: Attribute,
    #[serde(default)]
    relation: Relation,
    #[serde(default)]
    value: f64,
    reference: Option<TomlReference>,
}

#[derive(Deserialize)]
struct TomlReference {
    node_id: String,
    attribute: Attribute,
    #[serde(default)]
    reference_kind: ReferenceKind,
}

impl Document {
    /// Parse and validate a document from TOML source
    pub fn from_toml_str(source: &str) -> Result<Self, DocumentError> {
        let raw: TomlDocument = toml::from_str(source)?;
        let mut seen = HashSet::new();
        let roots = raw
            .nodes
            .into_iter()
            .map(|node| convert_node(node, None, &mut seen))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Document { roots })
    }

    /// Load a document from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

fn parse_id(raw: String) -> Result<NodeId, DocumentError> {
    NodeId::parse(raw.clone()).map_err(|source| DocumentError::InvalidId { id: raw, source })
}

fn convert_node(
    raw: TomlNode,
    parent: Option<&NodeId>,
    seen: &mut HashSet<NodeId>,
) -> Result<Node, DocumentError> {
    let id = parse_id(raw.id)?;
    let expected_parent = parent.cloned().unwrap_or_else(NodeId::viewport);
    if !id.is_child_of(&expected_parent) {
        return Err(DocumentError::MisplacedId {
            id: id.to_string(),
            parent: expected_parent.to_string(),
        });
    }
    if !seen.insert(id.clone()) {
        return Err(DocumentError::DuplicateId { id: id.to_string() });
    }

    let kind = match raw.referenced_root_id {
        Some(root) => NodeKind::Virtual(ComponentRef {
            referenced_root_id: parse_id(root)?,
            reference_type: raw.reference_type.unwrap_or_else(|| raw.node_type.clone()),
        }),
        None => NodeKind::Plain,
    };

    let constraint_packages = raw
        .constraint_packages
        .into_iter()
        .map(|p| convert_package(p, &id))
        .collect::<Result<Vec<_>, _>>()?;

    let children = raw
        .children
        .into_iter()
        .map(|child| convert_node(child, Some(&id), seen))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Node {
        id,
        node_type: raw.node_type,
        attributes: raw.attributes,
        constraint_packages,
        children,
        kind,
        is_virtual_child: false,
    })
}

fn convert_package(raw: TomlPackage, node_id: &NodeId) -> Result<ConstraintPackage, DocumentError> {
    let constraints = raw
        .constraints
        .into_iter()
        .map(|c| convert_constraint(c, node_id))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ConstraintPackage {
        name: if raw.name.is_empty() {
            raw.id.clone()
        } else {
            raw.name
        },
        id: raw.id,
        is_default: raw.is_default,
        constraints,
    })
}

fn convert_constraint(raw: TomlConstraint, node_id: &NodeId) -> Result<Constraint, DocumentError> {
    if !raw.constraint_type.accepts(raw.attribute) {
        return Err(DocumentError::InvalidConstraint {
            node_id: node_id.to_string(),
            constraint_id: raw.id,
            reason: format!(
                "attribute '{}' does not apply to a {:?} constraint",
                raw.attribute, raw.constraint_type
            ),
        });
    }
    let reference = raw
        .reference
        .map(|r| -> Result<Reference, DocumentError> {
            Ok(Reference {
                node_id: parse_id(r.node_id)?,
                attribute: r.attribute,
                kind: r.reference_kind,
            })
        })
        .transpose()?;
    Ok(Constraint {
        id: raw.id,
        constraint_type: raw.constraint_type,
        attribute: raw.attribute,
        relation: raw.relation,
        value: raw.value,
        reference,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::AttributeValue;

    const SAMPLE: &str = r#"
[[nodes]]
id = "01"
type = "Screen"

[nodes.attributes]
title = "Home"
scrollable = true
opacity = 1

[[nodes.constraint_packages]]
id = "main"
is_default = true

[[nodes.constraint_packages.constraints]]
id = "w"
type = "size"
attribute = "width"
value = 320

[[nodes.children]]
id = "0101"
type = "Button"

[[nodes.children.constraint_packages]]
id = "main"
name = "Main"
is_default = true

[[nodes.children.constraint_packages.constraints]]
id = "left"
type = "edge"
attribute = "left"
relation = "equalTo"
value = 8.0
reference = { node_id = "0102", attribute = "right", reference_kind = "inset" }

[[nodes.children]]
id = "0102"
type = "Card"
referenced_root_id = "02"

[[nodes]]
id = "02"
type = "Card"
"#;

    #[test]
    fn test_load_sample() {
        let doc = Document::from_toml_str(SAMPLE).unwrap();
        assert_eq!(doc.roots.len(), 2);

        let screen = &doc.roots[0];
        assert_eq!(screen.attributes["title"], AttributeValue::Text("Home".into()));
        assert_eq!(screen.attributes["scrollable"], AttributeValue::Bool(true));
        assert_eq!(screen.attributes["opacity"], AttributeValue::Number(1.0));
        assert_eq!(screen.constraint_packages[0].name, "main");
        assert_eq!(screen.default_constraints()[0].value, 320.0);

        let button = &screen.children[0];
        let constraint = &button.default_constraints()[0];
        let reference = constraint.reference.as_ref().unwrap();
        assert_eq!(reference.node_id.as_str(), "0102");
        assert_eq!(reference.attribute, Attribute::Right);
        assert_eq!(reference.kind, ReferenceKind::Inset);

        let card_ref = screen.children[1].component_ref().unwrap();
        assert_eq!(card_ref.referenced_root_id.as_str(), "02");
        assert_eq!(card_ref.reference_type, "Card");
    }

    #[test]
    fn test_rejects_misplaced_child() {
        let source = r#"
[[nodes]]
id = "01"
type = "Screen"

[[nodes.children]]
id = "0201"
type = "Button"
"#;
        assert!(matches!(
            Document::from_toml_str(source),
            Err(DocumentError::MisplacedId { .. })
        ));
    }

    #[test]
    fn test_rejects_duplicate_root() {
        let source = r#"
[[nodes]]
id = "01"
type = "A"

[[nodes]]
id = "01"
type = "B"
"#;
        assert!(matches!(
            Document::from_toml_str(source),
            Err(DocumentError::DuplicateId { .. })
        ));
    }

    #[test]
    fn test_rejects_viewport_as_root() {
        let source = r#"
[[nodes]]
id = "00"
type = "A"
"#;
        assert!(matches!(
            Document::from_toml_str(source),
            Err(DocumentError::MisplacedId { .. })
        ));
    }

    #[test]
    fn test_rejects_attribute_type_mismatch() {
        let source = r#"
[[nodes]]
id = "01"
type = "A"

[[nodes.constraint_packages]]
id = "p"

[[nodes.constraint_packages.constraints]]
id = "bad"
type = "size"
attribute = "left"
"#;
        let err = Document::from_toml_str(source).unwrap_err();
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn test_unknown_relation_is_toml_error() {
        let source = r#"
[[nodes]]
id = "01"
type = "A"

[[nodes.constraint_packages]]
id = "p"

[[nodes.constraint_packages.constraints]]
id = "c"
type = "size"
attribute = "width"
relation = "roughly"
"#;
        let err = Document::from_toml_str(source).unwrap_err();
        assert!(matches!(err, DocumentError::Toml { .. }));
    }
}
