//! Keyboard input
//!
//! Key names follow `KeyboardEvent.key`.

/// Key relevant to navigation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Tab,
    Enter,
    Space,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Other(String),
}

impl Key {
    /// Parse a DOM key name
    pub fn from_name(name: &str) -> Self {
        match name {
            "Tab" => Self::Tab,
            "Enter" => Self::Enter,
            " " | "Space" | "Spacebar" => Self::Space,
            "ArrowUp" | "Up" => Self::ArrowUp,
            "ArrowDown" | "Down" => Self::ArrowDown,
            "ArrowLeft" | "Left" => Self::ArrowLeft,
            "ArrowRight" | "Right" => Self::ArrowRight,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Tab => "Tab",
            Self::Enter => "Enter",
            Self::Space => "Space",
            Self::ArrowUp => "ArrowUp",
            Self::ArrowDown => "ArrowDown",
            Self::ArrowLeft => "ArrowLeft",
            Self::ArrowRight => "ArrowRight",
            Self::Other(name) => name,
        }
    }

    /// Enter and Space activate the current element
    pub fn is_activation(&self) -> bool {
        matches!(self, Self::Enter | Self::Space)
    }
}

/// Key-down event
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: Key,
    pub shift: bool,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self { key, shift: false }
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Parse `"Tab"`, `"Shift+Tab"`, `"ArrowDown"`, ...
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        match s.strip_prefix("Shift+") {
            Some(rest) => Self::new(Key::from_name(rest)).shift(),
            None => Self::new(Key::from_name(s)),
        }
    }

    pub fn display(&self) -> String {
        if self.shift {
            format!("Shift+{}", self.key.name())
        } else {
            self.key.name().to_string()
        }
    }
}

/// Result of handling a key-down event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyOutcome {
    /// Whether the event was consumed by the navigator
    pub handled: bool,
    /// Whether the native default action must be suppressed
    pub prevent_default: bool,
}

impl KeyOutcome {
    pub fn ignored() -> Self {
        Self::default()
    }

    pub fn handled() -> Self {
        Self {
            handled: true,
            prevent_default: false,
        }
    }

    pub fn consumed() -> Self {
        Self {
            handled: true,
            prevent_default: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keys() {
        assert_eq!(KeyEvent::parse("Tab"), KeyEvent::new(Key::Tab));
        assert_eq!(KeyEvent::parse(" Shift+Tab "), KeyEvent::new(Key::Tab).shift());
        assert_eq!(Key::from_name(" "), Key::Space);
        assert_eq!(Key::from_name("Escape"), Key::Other("Escape".into()));
    }

    #[test]
    fn test_display() {
        assert_eq!(KeyEvent::new(Key::ArrowDown).display(), "ArrowDown");
        assert_eq!(KeyEvent::new(Key::Tab).shift().display(), "Shift+Tab");
        assert!(Key::Space.is_activation());
        assert!(!Key::Tab.is_activation());
    }
}
