//! DOM Node
//!
//! Nodes link to their relatives through `NodeId`s into the tree arena
//! instead of pointers, so a detached subtree stays addressable and can be
//! re-attached later.

use crate::{ClassList, DomRect, NodeId};

/// DOM Node - Core structure
#[derive(Debug, Clone)]
pub struct Node {
    /// Parent node (NONE if root or detached)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    fn with_data(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Create a new element node
    pub fn element(tag: &str) -> Self {
        Self::with_data(NodeData::Element(ElementData::new(tag)))
    }

    /// Create a document node
    pub fn document() -> Self {
        Self::with_data(NodeData::Document)
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            NodeData::Document => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            NodeData::Document => None,
        }
    }
}

/// Node-specific data
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root
    Document,
    /// Element
    Element(ElementData),
}

/// Element-specific data
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Lowercase tag name
    pub tag: String,
    /// Attributes other than `id` and `class`
    pub attrs: Vec<Attribute>,
    /// Cached id attribute (very common lookup)
    pub id: Option<String>,
    /// Class tokens
    pub classes: ClassList,
    /// Bounding client rect reported to the navigator
    pub rect: DomRect,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            id: None,
            classes: ClassList::new(),
            rect: DomRect::default(),
        }
    }

    /// Get an attribute value
    pub fn get_attr(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.clone(),
            "class" => Some(self.classes.to_string()),
            _ => self
                .attrs
                .iter()
                .find(|a| a.name == name)
                .map(|a| a.value.clone()),
        }
    }

    /// Set an attribute, returns the previous value
    pub fn set_attr(&mut self, name: &str, value: &str) -> Option<String> {
        match name {
            "id" => self.id.replace(value.to_string()),
            "class" => {
                let old = self.classes.to_string();
                self.classes = ClassList::from_string(value);
                Some(old)
            }
            _ => {
                if let Some(attr) = self.attrs.iter_mut().find(|a| a.name == name) {
                    return Some(std::mem::replace(&mut attr.value, value.to_string()));
                }
                self.attrs.push(Attribute {
                    name: name.to_string(),
                    value: value.to_string(),
                });
                None
            }
        }
    }

    /// Remove an attribute, returns the removed value
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.take(),
            "class" => {
                let old = self.classes.to_string();
                self.classes = ClassList::new();
                Some(old)
            }
            _ => {
                let index = self.attrs.iter().position(|a| a.name == name)?;
                Some(self.attrs.remove(index).value)
            }
        }
    }
}

/// Attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_attr_replaces() {
        let mut elem = ElementData::new("BUTTON");
        assert_eq!(elem.tag, "button");

        assert_eq!(elem.set_attr("role", "button"), None);
        assert_eq!(elem.set_attr("role", "link"), Some("button".to_string()));
        assert_eq!(elem.get_attr("role").as_deref(), Some("link"));
        assert_eq!(elem.attrs.len(), 1);

        assert_eq!(elem.remove_attr("role"), Some("link".to_string()));
        assert_eq!(elem.remove_attr("role"), None);
        assert!(elem.attrs.is_empty());
    }

    #[test]
    fn test_id_and_class_are_cached() {
        let mut elem = ElementData::new("div");
        elem.set_attr("id", "main");
        elem.set_attr("class", "a b");

        assert_eq!(elem.id.as_deref(), Some("main"));
        assert!(elem.classes.contains("b"));
        assert!(elem.attrs.is_empty());
    }
}
