//! Focus style markers
//!
//! Elements that declare a style target show focus through the "simulated
//! focus" class on that proxy; the others carry the focus class themselves
//! and receive native focus. At most one proxy carries the simulated class.

use keynav_dom::{NodeId, TreeAccess};

use crate::element::InteractableElement;

/// Marker class names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerClasses {
    /// Focus marker on the element itself
    pub focus: String,
    /// Simulated focus on a proxy target or a highlighted sub-item
    pub simulated: String,
    /// Disabled elements are never activated
    pub disabled: String,
}

impl MarkerClasses {
    /// Defaults for every class not given
    pub fn new(focus: Option<&str>, simulated: Option<&str>, disabled: Option<&str>) -> Self {
        let defaults = Self::default();
        Self {
            focus: focus.map_or(defaults.focus, str::to_string),
            simulated: simulated.map_or(defaults.simulated, str::to_string),
            disabled: disabled.map_or(defaults.disabled, str::to_string),
        }
    }
}

impl Default for MarkerClasses {
    fn default() -> Self {
        Self {
            focus: "onFocus".to_string(),
            simulated: "simulate-focus".to_string(),
            disabled: "disabled-element".to_string(),
        }
    }
}

/// Applies and removes focus markers over the found elements
#[derive(Debug, Clone, Default)]
pub struct StyleCoordinator {
    classes: MarkerClasses,
}

impl StyleCoordinator {
    pub fn new(classes: MarkerClasses) -> Self {
        Self { classes }
    }

    pub fn classes(&self) -> &MarkerClasses {
        &self.classes
    }

    /// Mark `found[index]`, stripping the simulated marker everywhere else
    pub fn apply(&self, found: &[InteractableElement], index: usize, tree: &mut dyn TreeAccess) {
        let Some(entry) = found.get(index) else {
            return;
        };
        for other in found.iter().filter(|e| e.id() != entry.id()) {
            if let Some(target) = other.style_target() {
                self.set_simulated(target, false, tree);
            }
        }
        match entry.style_target() {
            Some(target) => self.set_simulated(target, true, tree),
            None => {
                tree.set_class(entry.node, &self.classes.focus, true);
                tree.focus(entry.node);
            }
        }
    }

    /// Remove the marker of `found[index]`
    pub fn clear(&self, found: &[InteractableElement], index: usize, tree: &mut dyn TreeAccess) {
        if let Some(entry) = found.get(index) {
            self.show(entry, false, tree);
        }
    }

    /// Toggle the marker of `entry` without touching native focus
    pub fn show(&self, entry: &InteractableElement, on: bool, tree: &mut dyn TreeAccess) {
        match entry.style_target() {
            Some(target) => self.set_simulated(target, on, tree),
            None => {
                if tree.is_attached(entry.node) {
                    tree.set_class(entry.node, &self.classes.focus, on);
                }
            }
        }
    }

    /// Strip every marker from the found elements
    pub fn clear_all(&self, found: &[InteractableElement], tree: &mut dyn TreeAccess) {
        for entry in found {
            self.show(entry, false, tree);
        }
    }

    /// Transient marker on a sub-navigation item
    pub fn mark_sub_item(&self, node: NodeId, on: bool, tree: &mut dyn TreeAccess) {
        tree.set_class(node, &self.classes.simulated, on);
    }

    pub fn is_disabled(&self, node: NodeId, tree: &dyn TreeAccess) -> bool {
        tree.has_class(node, &self.classes.disabled)
    }

    fn set_simulated(&self, target: &str, on: bool, tree: &mut dyn TreeAccess) {
        if let Some(node) = tree.lookup(target) {
            tree.set_class(node, &self.classes.simulated, on);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ElementKind, ElementSpec};
    use keynav_dom::{DomTree, NativeCall};

    fn setup(specs: Vec<ElementSpec>, extra: &[&str]) -> (DomTree, Vec<InteractableElement>) {
        let mut tree = DomTree::new();
        let body = tree.body();
        let mut found = Vec::new();
        for spec in specs {
            let node = tree.create_element_with_id("div", &spec.id);
            tree.append_child(body, node).unwrap();
            found.push(InteractableElement {
                spec,
                node,
                x: 0.0,
                y: 0.0,
            });
        }
        for id in extra {
            let node = tree.create_element_with_id("div", id);
            tree.append_child(body, node).unwrap();
        }
        (tree, found)
    }

    fn simulated(tree: &DomTree, id: &str) -> bool {
        tree.has_class(tree.lookup(id).unwrap(), "simulate-focus")
    }

    #[test]
    fn test_marker_classes_defaults() {
        let classes = MarkerClasses::new(Some("focused"), None, None);
        assert_eq!(classes.focus, "focused");
        assert_eq!(classes.simulated, "simulate-focus");
        assert_eq!(classes.disabled, "disabled-element");
    }

    #[test]
    fn test_simulated_marker_is_exclusive() {
        let (mut tree, found) = setup(
            vec![
                ElementSpec::new("x", ElementKind::Button).with_style_target("x-frame"),
                ElementSpec::new("y", ElementKind::Button).with_style_target("y-frame"),
            ],
            &["x-frame", "y-frame"],
        );
        let style = StyleCoordinator::default();

        style.apply(&found, 1, &mut tree);
        style.apply(&found, 0, &mut tree);

        assert!(simulated(&tree, "x-frame"));
        assert!(!simulated(&tree, "y-frame"));
        // Proxies never take native focus
        assert!(tree.calls().is_empty());
    }

    #[test]
    fn test_shared_proxy_stays_marked() {
        let (mut tree, found) = setup(
            vec![
                ElementSpec::new("menu-1", ElementKind::Label).with_style_target("frame"),
                ElementSpec::new("menu-2", ElementKind::Label).with_style_target("frame"),
            ],
            &["frame"],
        );
        let style = StyleCoordinator::default();
        style.apply(&found, 0, &mut tree);
        style.apply(&found, 1, &mut tree);
        assert!(simulated(&tree, "frame"));
    }

    #[test]
    fn test_unstyled_element_takes_focus() {
        let (mut tree, found) = setup(vec![ElementSpec::new("a", ElementKind::Link)], &[]);
        let style = StyleCoordinator::default();

        style.apply(&found, 0, &mut tree);
        assert!(tree.has_class(found[0].node, "onFocus"));
        assert_eq!(tree.calls(), &[NativeCall::Focus(found[0].node)]);

        style.clear(&found, 0, &mut tree);
        assert!(!tree.has_class(found[0].node, "onFocus"));

        // Out of range is ignored
        style.apply(&found, 4, &mut tree);
        assert_eq!(tree.calls().len(), 1);
    }

    #[test]
    fn test_clear_all() {
        let (mut tree, found) = setup(
            vec![
                ElementSpec::new("a", ElementKind::Link),
                ElementSpec::new("b", ElementKind::Button).with_style_target("b-frame"),
            ],
            &["b-frame"],
        );
        let style = StyleCoordinator::default();
        style.apply(&found, 0, &mut tree);
        style.apply(&found, 1, &mut tree);
        style.clear_all(&found, &mut tree);

        assert!(!tree.has_class(found[0].node, "onFocus"));
        assert!(!simulated(&tree, "b-frame"));
    }
}
