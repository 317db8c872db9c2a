//! ARIA Support
//!
//! The roles and relationship attributes the navigator writes.

/// `role` attribute
pub const ROLE: &str = "role";
/// Tab -> controlled panel
pub const ARIA_CONTROLS: &str = "aria-controls";
/// Panel -> labelling tab
pub const ARIA_LABELLEDBY: &str = "aria-labelledby";
/// List -> highlighted item
pub const ARIA_ACTIVEDESCENDANT: &str = "aria-activedescendant";
/// Focus-order index
pub const TABINDEX: &str = "tabindex";

/// ARIA role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AriaRole {
    Button,
    Dialog,
    Link,
    List,
    ListItem,
    Tab,
    TabList,
    TabPanel,
    TextBox,
}

impl AriaRole {
    /// Attribute value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::Dialog => "dialog",
            Self::Link => "link",
            Self::List => "list",
            Self::ListItem => "listitem",
            Self::Tab => "tab",
            Self::TabList => "tablist",
            Self::TabPanel => "tabpanel",
            Self::TextBox => "textbox",
        }
    }

}

impl std::fmt::Display for AriaRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
