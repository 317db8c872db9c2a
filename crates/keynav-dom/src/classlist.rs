//! Class list
//!
//! Space-separated class tokens. Focus markers are plain classes, so the
//! navigator only ever needs add/remove/contains.

/// Token list backing an element's `class` attribute
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList {
    tokens: Vec<String>,
}

impl ClassList {
    /// Create empty token list
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from space-separated string
    pub fn from_string(s: &str) -> Self {
        let mut list = Self::new();
        for token in s.split_whitespace() {
            list.add(token);
        }
        list
    }

    /// Number of tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Check if token exists
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Add token, returns true if it was not present
    pub fn add(&mut self, token: &str) -> bool {
        if token.is_empty() || self.contains(token) {
            return false;
        }
        self.tokens.push(token.to_string());
        true
    }

    /// Remove token, returns true if it was present
    pub fn remove(&mut self, token: &str) -> bool {
        let before = self.tokens.len();
        self.tokens.retain(|t| t != token);
        before != self.tokens.len()
    }

    /// Toggle token, returns new state
    pub fn toggle(&mut self, token: &str, force: Option<bool>) -> bool {
        match force {
            Some(true) => {
                self.add(token);
                true
            }
            Some(false) => {
                self.remove(token);
                false
            }
            None => {
                if self.contains(token) {
                    self.remove(token);
                    false
                } else {
                    self.add(token);
                    true
                }
            }
        }
    }

    /// Iterate over tokens
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|s| s.as_str())
    }
}

impl std::fmt::Display for ClassList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tokens.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_string_dedups() {
        let list = ClassList::from_string("btn onFocus btn");
        assert_eq!(list.len(), 2);
        assert!(list.contains("onFocus"));
        assert_eq!(list.to_string(), "btn onFocus");
    }

    #[test]
    fn test_toggle_force() {
        let mut list = ClassList::new();

        assert!(list.toggle("simulate-focus", Some(true)));
        assert!(list.toggle("simulate-focus", Some(true)));
        assert_eq!(list.len(), 1);

        assert!(!list.toggle("simulate-focus", Some(false)));
        assert!(list.is_empty());
        assert!(!list.remove("simulate-focus"));
    }
}
