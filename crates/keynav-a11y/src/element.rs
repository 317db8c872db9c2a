//! Interactable elements and per-type behavior
//!
//! Every [`ElementKind`] maps to a static [`ElementBehavior`] that owns the
//! role written on discovery and what happens when the element is activated.

use keynav_dom::{NodeId, TreeAccess};

use crate::aria::AriaRole;
use crate::config::{ActivationAction, ElementKind, ElementSpec, Scope};

/// A spec resolved against a live node
#[derive(Debug, Clone, PartialEq)]
pub struct InteractableElement {
    /// Resolved spec; expanded group children carry their own id and type
    pub spec: ElementSpec,
    pub node: NodeId,
    pub x: f64,
    pub y: f64,
}

impl InteractableElement {
    pub fn id(&self) -> &str {
        &self.spec.id
    }

    pub fn kind(&self) -> ElementKind {
        self.spec.kind
    }

    pub fn style_target(&self) -> Option<&str> {
        self.spec.style_target_id.as_deref()
    }

    pub fn behavior(&self) -> &'static dyn ElementBehavior {
        behavior(self.spec.kind)
    }
}

/// Split `"tabs-3"` into `("tabs", 3)`
pub fn split_suffix(id: &str) -> Option<(&str, usize)> {
    let (owner, suffix) = id.rsplit_once('-')?;
    let index = suffix.parse::<usize>().ok()?;
    (index > 0 && !owner.is_empty()).then_some((owner, index))
}

/// Id of the `index`-th child of a group (1-based)
pub fn child_id(group: &str, index: usize) -> String {
    format!("{group}-{index}")
}

/// Top-level move requested by an activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Previous,
    Next,
}

/// What the state machine must do once the native activation happened
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Activation {
    /// Node to focus right after activation
    pub focus_after: Option<NodeId>,
    /// Move to an adjacent top-level element
    pub step: Option<Step>,
    /// Actions run after the resulting focus changes settled
    pub deferred: Vec<ActivationAction>,
}

/// Inputs of an activation
pub struct ActivationContext<'a> {
    pub tree: &'a mut dyn TreeAccess,
    pub scope: Option<&'a Scope>,
    pub element: &'a InteractableElement,
    /// Highlighted sub-item while sub-navigating
    pub highlighted: Option<NodeId>,
    /// Whether the highlighted sub-item is the last one
    pub at_last_sub_item: bool,
    pub disabled_class: &'a str,
}

/// Behavior of one element type
pub trait ElementBehavior: Sync {
    /// Role written after every discovery
    fn role(&self) -> Option<AriaRole>;

    /// Container and child roles for types expanded by dense enumeration
    fn group_roles(&self) -> Option<(AriaRole, AriaRole)> {
        None
    }

    fn activate(&self, ctx: &mut ActivationContext<'_>) -> Activation;
}

/// Click, then the declared actions
struct Plain(Option<AriaRole>);

impl ElementBehavior for Plain {
    fn role(&self) -> Option<AriaRole> {
        self.0
    }

    fn activate(&self, ctx: &mut ActivationContext<'_>) -> Activation {
        ctx.tree.click(ctx.element.node);
        Activation {
            deferred: ctx.element.spec.activation_actions.clone(),
            ..Activation::default()
        }
    }
}

/// Lists forward activation to the highlighted item and hand focus on
struct ListBehavior;

impl ElementBehavior for ListBehavior {
    fn role(&self) -> Option<AriaRole> {
        Some(AriaRole::List)
    }

    fn group_roles(&self) -> Option<(AriaRole, AriaRole)> {
        Some((AriaRole::List, AriaRole::ListItem))
    }

    fn activate(&self, ctx: &mut ActivationContext<'_>) -> Activation {
        if let Some(item) = ctx.highlighted {
            if !ctx.tree.has_class(item, ctx.disabled_class) {
                ctx.tree.click(item);
            }
        }
        let step = if ctx.at_last_sub_item {
            Step::Previous
        } else {
            Step::Next
        };
        Activation {
            step: Some(step),
            ..Activation::default()
        }
    }
}

struct TabListBehavior;

impl ElementBehavior for TabListBehavior {
    fn role(&self) -> Option<AriaRole> {
        None
    }

    fn group_roles(&self) -> Option<(AriaRole, AriaRole)> {
        Some((AriaRole::TabList, AriaRole::Tab))
    }

    fn activate(&self, ctx: &mut ActivationContext<'_>) -> Activation {
        Plain(None).activate(ctx)
    }
}

/// Tabs focus their mapped panel after activation
struct TabBehavior;

impl TabBehavior {
    fn panel(ctx: &ActivationContext<'_>) -> Option<NodeId> {
        let (owner_id, index) = split_suffix(ctx.element.id())?;
        let owner = ctx
            .scope?
            .find(owner_id)
            .filter(|s| s.kind == ElementKind::TabList)?;
        let panel_id = owner.tab_target_ids.get(index - 1)?;
        ctx.tree.lookup(panel_id)
    }
}

impl ElementBehavior for TabBehavior {
    fn role(&self) -> Option<AriaRole> {
        Some(AriaRole::Tab)
    }

    fn activate(&self, ctx: &mut ActivationContext<'_>) -> Activation {
        let panel = Self::panel(ctx);
        ctx.tree.click(ctx.element.node);
        Activation {
            focus_after: panel,
            deferred: ctx.element.spec.activation_actions.clone(),
            ..Activation::default()
        }
    }
}

static INPUT: Plain = Plain(Some(AriaRole::TextBox));
static BUTTON: Plain = Plain(Some(AriaRole::Button));
static MODAL: Plain = Plain(Some(AriaRole::Dialog));
static LABEL: Plain = Plain(None);
static LINK: Plain = Plain(Some(AriaRole::Link));
static LIST: ListBehavior = ListBehavior;
static TAB_LIST: TabListBehavior = TabListBehavior;
static TAB: TabBehavior = TabBehavior;

/// Behavior table lookup
pub fn behavior(kind: ElementKind) -> &'static dyn ElementBehavior {
    match kind {
        ElementKind::Input => &INPUT,
        ElementKind::Button => &BUTTON,
        ElementKind::List => &LIST,
        ElementKind::Modal => &MODAL,
        ElementKind::TabList => &TAB_LIST,
        ElementKind::Tab => &TAB,
        ElementKind::Label => &LABEL,
        ElementKind::Link => &LINK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScopeKey;
    use keynav_dom::{DomTree, NativeCall};

    fn element(tree: &mut DomTree, spec: ElementSpec) -> InteractableElement {
        let body = tree.body();
        let node = tree.create_element_with_id("div", &spec.id);
        tree.append_child(body, node).unwrap();
        InteractableElement {
            spec,
            node,
            x: 0.0,
            y: 0.0,
        }
    }

    #[test]
    fn test_split_suffix() {
        assert_eq!(split_suffix("tabs-3"), Some(("tabs", 3)));
        assert_eq!(split_suffix("main-tabs-12"), Some(("main-tabs", 12)));
        assert_eq!(split_suffix("tabs-0"), None);
        assert_eq!(split_suffix("tabs"), None);
        assert_eq!(split_suffix("-1"), None);
        assert_eq!(child_id("menu", 2), "menu-2");
    }

    #[test]
    fn test_roles_table() {
        assert_eq!(behavior(ElementKind::Input).role(), Some(AriaRole::TextBox));
        assert_eq!(behavior(ElementKind::Label).role(), None);
        assert_eq!(
            behavior(ElementKind::TabList).group_roles(),
            Some((AriaRole::TabList, AriaRole::Tab))
        );
        assert_eq!(behavior(ElementKind::Button).group_roles(), None);
    }

    #[test]
    fn test_plain_activation_defers_actions() {
        let mut tree = DomTree::new();
        let button = element(
            &mut tree,
            ElementSpec::new("ok", ElementKind::Button).with_action("search", "focus"),
        );
        let mut ctx = ActivationContext {
            tree: &mut tree,
            scope: None,
            element: &button,
            highlighted: None,
            at_last_sub_item: false,
            disabled_class: "disabled-element",
        };
        let activation = behavior(ElementKind::Button).activate(&mut ctx);

        assert_eq!(activation.deferred.len(), 1);
        assert_eq!(activation.focus_after, None);
        assert_eq!(tree.calls(), &[NativeCall::Click(button.node)]);
    }

    #[test]
    fn test_tab_activation_maps_panel() {
        let mut tree = DomTree::new();
        let tab = element(&mut tree, ElementSpec::new("tabs-2", ElementKind::Tab));
        let panel = element(&mut tree, ElementSpec::new("panel-b", ElementKind::Label));
        let scope = Scope {
            key: ScopeKey {
                revision: 1,
                route: None,
            },
            specs: vec![
                ElementSpec::new("tabs", ElementKind::TabList)
                    .with_tab_targets(&["panel-a", "panel-b"]),
            ],
        };
        let mut ctx = ActivationContext {
            tree: &mut tree,
            scope: Some(&scope),
            element: &tab,
            highlighted: None,
            at_last_sub_item: false,
            disabled_class: "disabled-element",
        };
        let activation = TabBehavior.activate(&mut ctx);
        assert_eq!(activation.focus_after, Some(panel.node));
    }

    #[test]
    fn test_list_skips_disabled_item() {
        let mut tree = DomTree::new();
        let list = element(&mut tree, ElementSpec::new("menu-1", ElementKind::List));
        let item = element(&mut tree, ElementSpec::new("menu-1-3", ElementKind::Label));
        tree.set_class(item.node, "disabled-element", true);

        let mut ctx = ActivationContext {
            tree: &mut tree,
            scope: None,
            element: &list,
            highlighted: Some(item.node),
            at_last_sub_item: true,
            disabled_class: "disabled-element",
        };
        let activation = ListBehavior.activate(&mut ctx);

        assert_eq!(activation.step, Some(Step::Previous));
        assert!(tree.calls().is_empty());
    }
}
