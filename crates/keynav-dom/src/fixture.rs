//! Tree fixtures
//!
//! JSON description of a document body, used to drive the navigator without a
//! browser:
//!
//! ```json
//! { "elements": [
//!     { "tag": "nav", "id": "menu", "children": [
//!         { "tag": "a", "id": "menu-1", "rect": [0, 0, 80, 20] }
//!     ] }
//! ] }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::{DomError, DomRect, DomTree, NodeId, TreeAccess};

/// Fixture loading error
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("Failed to read fixture: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed fixture: {0}")]
    Json(#[from] serde_json::Error),
}

/// Root of a fixture file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TreeFixture {
    #[serde(default)]
    pub elements: Vec<ElementFixture>,
}

/// One element and its subtree
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ElementFixture {
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    /// `[x, y, width, height]`
    #[serde(default)]
    pub rect: Option<[f64; 4]>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<ElementFixture>,
}

fn default_tag() -> String {
    "div".to_string()
}

impl TreeFixture {
    pub fn from_json(json: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Build a document whose body holds the fixture elements
    pub fn build(&self) -> Result<DomTree, DomError> {
        let mut tree = DomTree::new();
        let body = tree.body();
        for element in &self.elements {
            element.build_into(&mut tree, body)?;
        }
        tracing::debug!("Built fixture tree with {} nodes", tree.len());
        Ok(tree)
    }
}

impl ElementFixture {
    fn build_into(&self, tree: &mut DomTree, parent: NodeId) -> Result<NodeId, DomError> {
        let node = match &self.id {
            Some(id) => tree.create_element_with_id(&self.tag, id),
            None => tree.create_element(&self.tag),
        };
        if let Some(rect) = self.rect {
            tree.set_rect(node, DomRect::from(rect));
        }
        for class in &self.classes {
            tree.set_class(node, class, true);
        }
        for (name, value) in &self.attributes {
            tree.set_attribute(node, name, value);
        }
        tree.append_child(parent, node)?;
        for child in &self.children {
            child.build_into(tree, node)?;
        }
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_nested_fixture() {
        let fixture = TreeFixture::from_json(
            r#"{ "elements": [
                { "tag": "ul", "id": "list", "children": [
                    { "tag": "li", "id": "list-1", "rect": [0, 10, 50, 10] },
                    { "tag": "li", "id": "list-2", "classes": ["disabled-element"] }
                ] },
                { "tag": "button", "id": "ok", "attributes": { "type": "submit" } }
            ] }"#,
        )
        .unwrap();
        let tree = fixture.build().unwrap();

        let item = tree.lookup("list-1").unwrap();
        assert_eq!(tree.bounding_rect(item).top(), 10.0);
        assert!(tree.has_class(tree.lookup("list-2").unwrap(), "disabled-element"));
        assert_eq!(tree.attribute(tree.lookup("ok").unwrap(), "type").as_deref(), Some("submit"));
        assert_eq!(tree.elements().len(), 5);
    }

    #[test]
    fn test_malformed_fixture() {
        let err = TreeFixture::from_json("{ \"elements\": 3 }");
        assert!(matches!(err, Err(FixtureError::Json(_))));
    }
}
