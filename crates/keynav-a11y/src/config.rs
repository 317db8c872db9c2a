//! Navigation configuration
//!
//! Declarative description of the navigable elements of every route, plus the
//! resolver that turns a route path into the ordered list of specs in scope.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Deserializer};

/// Element type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Input,
    Button,
    List,
    Modal,
    TabList,
    Tab,
    Label,
    Link,
}

impl ElementKind {
    /// Ordinal used by numeric configs
    const ORDER: [ElementKind; 8] = [
        Self::Input,
        Self::Button,
        Self::List,
        Self::Modal,
        Self::TabList,
        Self::Tab,
        Self::Label,
        Self::Link,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_lowercase().replace(|c: char| c == '_' || c == '-', "").as_str() {
            "input" => Self::Input,
            "button" => Self::Button,
            "list" => Self::List,
            "modal" => Self::Modal,
            "tablist" => Self::TabList,
            "tab" => Self::Tab,
            "label" => Self::Label,
            "link" => Self::Link,
            _ => return None,
        })
    }

    pub fn from_ordinal(n: u64) -> Option<Self> {
        Self::ORDER.get(usize::try_from(n).ok()?).copied()
    }

    /// Groups expand into their numbered children
    pub fn is_group(&self) -> bool {
        matches!(self, Self::List | Self::TabList)
    }
}

impl<'de> Deserialize<'de> for ElementKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Ordinal(u64),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Ordinal(n) => Self::from_ordinal(n)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown element type {n}"))),
            Repr::Name(name) => Self::parse(&name)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown element type {name:?}"))),
        }
    }
}

/// Side action run after an element is activated
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationAction {
    /// Element the action is invoked on
    #[serde(alias = "id")]
    pub target_id: String,
    /// Native method name (`click`, `focus`, ...)
    pub action: String,
}

/// Attribute written on the element when it is discovered
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttributeOverride {
    pub name: String,
    pub value: String,
}

/// Declarative descriptor of a navigable target
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    /// Type of the children of a `List` (defaults to `Label`)
    #[serde(default)]
    pub item_type: Option<ElementKind>,
    /// Proxy element that receives the simulated focus marker
    #[serde(default, alias = "elemToStyle")]
    pub style_target_id: Option<String>,
    #[serde(default, alias = "modalElements", deserialize_with = "skip_nulls")]
    pub modal_children: Vec<ElementSpec>,
    /// Panel ids controlled by the tabs of a `TabList`, by position
    #[serde(default, alias = "tabElements")]
    pub tab_target_ids: Vec<String>,
    #[serde(default, alias = "onClick")]
    pub activation_actions: Vec<ActivationAction>,
    #[serde(default, alias = "attributes")]
    pub attribute_overrides: Vec<AttributeOverride>,
}

impl ElementSpec {
    pub fn new(id: &str, kind: ElementKind) -> Self {
        Self {
            id: id.to_string(),
            kind,
            item_type: None,
            style_target_id: None,
            modal_children: Vec::new(),
            tab_target_ids: Vec::new(),
            activation_actions: Vec::new(),
            attribute_overrides: Vec::new(),
        }
    }

    pub fn with_style_target(mut self, id: &str) -> Self {
        self.style_target_id = Some(id.to_string());
        self
    }

    pub fn with_item_type(mut self, kind: ElementKind) -> Self {
        self.item_type = Some(kind);
        self
    }

    pub fn with_modal_children(mut self, children: Vec<ElementSpec>) -> Self {
        self.modal_children = children;
        self
    }

    pub fn with_tab_targets(mut self, ids: &[&str]) -> Self {
        self.tab_target_ids = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_action(mut self, target_id: &str, action: &str) -> Self {
        self.activation_actions.push(ActivationAction {
            target_id: target_id.to_string(),
            action: action.to_string(),
        });
        self
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attribute_overrides.push(AttributeOverride {
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// Type given to children produced by expanding this spec
    pub fn child_kind(&self) -> ElementKind {
        match self.kind {
            ElementKind::TabList => ElementKind::Tab,
            _ => self.item_type.unwrap_or(ElementKind::Label),
        }
    }
}

/// Header and footer shared by every route
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct General {
    #[serde(default, deserialize_with = "skip_nulls")]
    pub header: Vec<ElementSpec>,
    #[serde(default, deserialize_with = "skip_nulls")]
    pub footer: Vec<ElementSpec>,
}

/// Route-specific elements
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Route {
    pub path: String,
    #[serde(default, deserialize_with = "skip_nulls")]
    pub elements: Vec<ElementSpec>,
}

/// Navigation configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NavigationConfig {
    #[serde(default)]
    pub general: General,
    #[serde(default)]
    pub routes: Vec<Route>,
}

/// `null` entries are dropped while reading element arrays
fn skip_nulls<'de, D>(deserializer: D) -> Result<Vec<ElementSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<Option<ElementSpec>> = Vec::deserialize(deserializer)?;
    Ok(raw.into_iter().flatten().collect())
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid navigation config: {} issue(s)", .0.len())]
    Invalid(Vec<ConfigIssue>),
}

/// Problem found by [`NavigationConfig::validate`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ConfigIssue {
    #[error("duplicate id {id:?} in scope {scope}")]
    DuplicateId { scope: String, id: String },

    #[error("empty id in scope {scope}")]
    EmptyId { scope: String },

    #[error("{id:?} declares tab targets but is not a TabList")]
    MisplacedTabTargets { id: String },

    #[error("{id:?} declares modal children but is not a Modal")]
    MisplacedModalChildren { id: String },

    #[error("Tab {id:?} is not produced by a TabList")]
    StrayTab { id: String },
}

impl NavigationConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn route(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.path == path)
    }

    /// Check ids and composite declarations of every scope
    pub fn validate(&self) -> Result<(), ConfigError> {
        let issues = self.issues();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(issues))
        }
    }

    pub fn issues(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let fallback = ConfigResolver::new(self.clone(), 0).fallback_specs();
        let scopes = self
            .routes
            .iter()
            .map(|r| (r.path.clone(), ConfigResolver::concat(self, &r.elements)))
            .chain(std::iter::once(("<fallback>".to_string(), fallback)));

        for (scope, specs) in scopes {
            let mut seen = HashSet::new();
            check_specs(&scope, &specs, &mut seen, &mut issues);
        }
        let mut reported = HashSet::new();
        issues.retain(|issue| reported.insert(issue.clone()));
        issues
    }
}

fn check_specs(
    scope: &str,
    specs: &[ElementSpec],
    seen: &mut HashSet<String>,
    issues: &mut Vec<ConfigIssue>,
) {
    for spec in specs {
        if spec.id.is_empty() {
            issues.push(ConfigIssue::EmptyId {
                scope: scope.to_string(),
            });
        } else if !seen.insert(spec.id.clone()) {
            issues.push(ConfigIssue::DuplicateId {
                scope: scope.to_string(),
                id: spec.id.clone(),
            });
        }
        let id = || spec.id.clone();
        if !spec.tab_target_ids.is_empty() && spec.kind != ElementKind::TabList {
            issues.push(ConfigIssue::MisplacedTabTargets { id: id() });
        }
        if !spec.modal_children.is_empty() && spec.kind != ElementKind::Modal {
            issues.push(ConfigIssue::MisplacedModalChildren { id: id() });
        }
        if spec.kind == ElementKind::Tab {
            issues.push(ConfigIssue::StrayTab { id: id() });
        }
        check_specs(scope, &spec.modal_children, seen, issues);
    }
}

/// Identity of a resolved scope: same config revision and same matched route
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeKey {
    pub revision: u32,
    /// Matched route path, `None` for the header/footer fallback
    pub route: Option<String>,
}

/// Ordered specs in scope for the active route
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    pub key: ScopeKey,
    pub specs: Vec<ElementSpec>,
}

impl Scope {
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Whether any spec in scope expands into children
    pub fn has_groups(&self) -> bool {
        fn any_group(specs: &[ElementSpec]) -> bool {
            specs
                .iter()
                .any(|s| s.kind.is_group() || any_group(&s.modal_children))
        }
        any_group(&self.specs)
    }

    /// Whether any spec in scope can narrow discovery to a modal
    pub fn has_modals(&self) -> bool {
        self.specs
            .iter()
            .any(|s| s.kind == ElementKind::Modal && !s.modal_children.is_empty())
    }

    /// Spec with `id`, searching modal children too
    pub fn find(&self, id: &str) -> Option<&ElementSpec> {
        fn search<'a>(specs: &'a [ElementSpec], id: &str) -> Option<&'a ElementSpec> {
            specs.iter().find_map(|s| {
                if s.id == id {
                    Some(s)
                } else {
                    search(&s.modal_children, id)
                }
            })
        }
        search(&self.specs, id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.specs.iter().map(|s| s.id.as_str()).collect()
    }
}

/// Outcome of resolving a route
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedScope {
    Active(Scope),
    /// Neither the route nor the header/footer provide any element
    Empty,
}

/// Maps route paths to ordered element specs
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    config: NavigationConfig,
    revision: u32,
}

impl ConfigResolver {
    /// `revision` distinguishes scopes resolved from different configs
    pub fn new(config: NavigationConfig, revision: u32) -> Self {
        Self { config, revision }
    }

    fn concat(config: &NavigationConfig, elements: &[ElementSpec]) -> Vec<ElementSpec> {
        config
            .general
            .header
            .iter()
            .chain(elements)
            .chain(&config.general.footer)
            .cloned()
            .collect()
    }

    fn fallback_specs(&self) -> Vec<ElementSpec> {
        let mut specs = Vec::new();
        if !self.config.general.header.is_empty() {
            specs.extend(self.config.general.header.iter().cloned());
        }
        if !self.config.general.footer.is_empty() {
            specs.extend(self.config.general.footer.iter().cloned());
        }
        specs
    }

    /// header ⧺ route ⧺ footer for a known route, header ⧺ footer otherwise
    pub fn resolve_route(&self, path: &str) -> ResolvedScope {
        let (route, specs) = match self.config.route(path) {
            Some(route) => (
                Some(route.path.clone()),
                Self::concat(&self.config, &route.elements),
            ),
            None => {
                tracing::debug!("No route configured for {:?}, using header/footer", path);
                (None, self.fallback_specs())
            }
        };
        if specs.is_empty() {
            return ResolvedScope::Empty;
        }
        ResolvedScope::Active(Scope {
            key: ScopeKey {
                revision: self.revision,
                route,
            },
            specs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(id: &str) -> ElementSpec {
        ElementSpec::new(id, ElementKind::Button)
    }

    fn config(header: &[&str], footer: &[&str], routes: &[(&str, &[&str])]) -> NavigationConfig {
        NavigationConfig {
            general: General {
                header: header.iter().map(|id| spec(id)).collect(),
                footer: footer.iter().map(|id| spec(id)).collect(),
            },
            routes: routes
                .iter()
                .map(|(path, ids)| Route {
                    path: path.to_string(),
                    elements: ids.iter().map(|id| spec(id)).collect(),
                })
                .collect(),
        }
    }

    fn ids(scope: &ResolvedScope) -> Vec<&str> {
        match scope {
            ResolvedScope::Active(scope) => scope.ids(),
            ResolvedScope::Empty => Vec::new(),
        }
    }

    #[test]
    fn test_route_is_wrapped_by_header_and_footer() {
        let resolver = ConfigResolver::new(config(&["a"], &["b"], &[("x", &["c"])]), 1);

        assert_eq!(ids(&resolver.resolve_route("x")), vec!["a", "c", "b"]);
        assert_eq!(ids(&resolver.resolve_route("unknown")), vec!["a", "b"]);
    }

    #[test]
    fn test_fallback_without_header() {
        let resolver = ConfigResolver::new(config(&[], &["b"], &[]), 1);
        assert_eq!(ids(&resolver.resolve_route("nowhere")), vec!["b"]);
    }

    #[test]
    fn test_empty_scope() {
        let resolver = ConfigResolver::new(config(&[], &[], &[("x", &[])]), 1);
        assert_eq!(resolver.resolve_route("x"), ResolvedScope::Empty);
        assert_eq!(resolver.resolve_route("y"), ResolvedScope::Empty);
    }

    #[test]
    fn test_scope_key_identity() {
        let resolver = ConfigResolver::new(config(&["a"], &[], &[("x", &["c"])]), 7);
        let (ResolvedScope::Active(first), ResolvedScope::Active(second)) =
            (resolver.resolve_route("x"), resolver.resolve_route("x"))
        else {
            panic!("expected active scopes");
        };
        assert_eq!(first.key, second.key);

        let ResolvedScope::Active(fallback) = resolver.resolve_route("y") else {
            panic!("expected fallback scope");
        };
        assert_ne!(first.key, fallback.key);
        assert_eq!(fallback.key.route, None);
    }

    #[test]
    fn test_parse_json_with_nulls_and_ordinals() {
        let config = NavigationConfig::from_json(
            r#"{
                "general": { "header": [ { "id": "logo", "type": "link" }, null ], "footer": [] },
                "routes": [ { "path": "/home", "elements": [
                    { "id": "tabs", "type": 4, "tabTargetIds": ["p1", "p2"] },
                    { "id": "menu", "type": "List", "itemType": "Link", "elemToStyle": "menu-frame",
                      "onClick": [ { "id": "search", "action": "focus" } ] }
                ] } ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.general.header.len(), 1);
        let route = config.route("/home").unwrap();
        assert_eq!(route.elements[0].kind, ElementKind::TabList);
        assert_eq!(route.elements[0].tab_target_ids, vec!["p1", "p2"]);
        assert_eq!(route.elements[1].child_kind(), ElementKind::Link);
        assert_eq!(route.elements[1].style_target_id.as_deref(), Some("menu-frame"));
        assert_eq!(route.elements[1].activation_actions[0].target_id, "search");
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let err = NavigationConfig::from_json(
            r#"{ "routes": [ { "path": "/", "elements": [ { "id": "a", "type": "slider" } ] } ] }"#,
        );
        assert!(matches!(err, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_validate_reports_issues() {
        let mut cfg = config(&["a"], &[], &[("x", &["a", "b"])]);
        let misplaced = ElementSpec::new("t", ElementKind::Button).with_tab_targets(&["p"]);
        cfg.routes[0].elements.push(misplaced);
        cfg.routes[0].elements.push(ElementSpec::new("tab-1", ElementKind::Tab));

        let issues = cfg.issues();
        let duplicate = ConfigIssue::DuplicateId {
            scope: "x".into(),
            id: "a".into(),
        };
        assert!(issues.contains(&duplicate));
        assert!(issues.contains(&ConfigIssue::MisplacedTabTargets { id: "t".into() }));
        assert!(issues.contains(&ConfigIssue::StrayTab { id: "tab-1".into() }));
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(list)) if list.len() == 3));

        assert!(config(&["a"], &["b"], &[("x", &["c"])]).validate().is_ok());
    }

    #[test]
    fn test_shared_header_issue_reported_once() {
        let mut cfg = config(&[], &[], &[("x", &["a"]), ("y", &["b"])]);
        let misplaced = ElementSpec::new("h", ElementKind::Button).with_tab_targets(&["p"]);
        cfg.general.header.push(misplaced);
        cfg.routes[0].elements.push(ElementSpec::new("tab-1", ElementKind::Tab));

        assert_eq!(
            cfg.issues(),
            vec![
                ConfigIssue::MisplacedTabTargets { id: "h".into() },
                ConfigIssue::StrayTab { id: "tab-1".into() },
            ]
        );
    }
}
