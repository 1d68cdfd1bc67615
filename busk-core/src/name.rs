//! Bus identifier validation.
//!
//! Interface names are dotted (`org.example.Player`), member names are plain
//! identifiers (`Play`) and object paths are slash-delimited
//! (`/org/example/Player`).

use crate::error::NameError;
use std::fmt;

/// Maximum length in bytes of interface and member names.
pub const MAX_NAME_LEN: usize = 255;

fn is_identifier(element: &str) -> bool {
    let mut chars = element.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Check that `name` is a valid interface name.
///
/// At least two dot-separated elements, none empty, none starting with a
/// digit, at most [`MAX_NAME_LEN`] bytes.
pub fn validate_interface_name(name: &str) -> Result<(), NameError> {
    let valid = name.len() <= MAX_NAME_LEN
        && name.contains('.')
        && name.split('.').all(is_identifier);
    if valid {
        Ok(())
    } else {
        Err(NameError::Interface(name.to_owned()))
    }
}

/// Check that `name` is a valid method or signal name.
pub fn validate_member_name(name: &str) -> Result<(), NameError> {
    if name.len() <= MAX_NAME_LEN && is_identifier(name) {
        Ok(())
    } else {
        Err(NameError::Member(name.to_owned()))
    }
}

/// A validated object path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectPath(String);

impl ObjectPath {
    /// Validate and wrap an object path.
    pub fn new(path: impl Into<String>) -> Result<Self, NameError> {
        let path = path.into();
        let valid = path == "/"
            || (path.starts_with('/')
                && path[1..].split('/').all(|element| {
                    !element.is_empty()
                        && element.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                }));
        if valid {
            Ok(Self(path))
        } else {
            Err(NameError::ObjectPath(path))
        }
    }

    /// The root path `/`.
    pub fn root() -> Self {
        Self("/".to_owned())
    }

    /// The path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name of the direct child of `self` on the way to `descendant`.
    ///
    /// Returns `None` when `descendant` is not strictly below `self`.
    pub fn child_toward<'a>(&self, descendant: &'a ObjectPath) -> Option<&'a str> {
        let rest = if self.0 == "/" {
            descendant.0.strip_prefix('/')?
        } else {
            descendant.0.strip_prefix(self.0.as_str())?.strip_prefix('/')?
        };
        rest.split('/').next().filter(|child| !child.is_empty())
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ObjectPath {
    type Error = NameError;

    fn try_from(path: &str) -> Result<Self, Self::Error> {
        Self::new(path)
    }
}

impl TryFrom<String> for ObjectPath {
    type Error = NameError;

    fn try_from(path: String) -> Result<Self, Self::Error> {
        Self::new(path)
    }
}

impl From<ObjectPath> for String {
    fn from(path: ObjectPath) -> Self {
        path.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interface_names() {
        assert!(validate_interface_name("org.example.Player").is_ok());
        assert!(validate_interface_name("a._b2").is_ok());
        assert!(validate_interface_name("Player").is_err());
        assert!(validate_interface_name(".org.example").is_err());
        assert!(validate_interface_name("org.example.").is_err());
        assert!(validate_interface_name("org..example").is_err());
        assert!(validate_interface_name("org.2example").is_err());
        assert!(validate_interface_name("org.ex-ample").is_err());

        let long = format!("a.{}", "b".repeat(MAX_NAME_LEN));
        assert!(validate_interface_name(&long).is_err());
    }

    #[test]
    fn test_member_names() {
        assert!(validate_member_name("Play").is_ok());
        assert!(validate_member_name("_private2").is_ok());
        assert!(validate_member_name("").is_err());
        assert!(validate_member_name("2Play").is_err());
        assert!(validate_member_name("Pl.ay").is_err());
    }

    #[test]
    fn test_object_paths() {
        assert!(ObjectPath::new("/").is_ok());
        assert!(ObjectPath::new("/org/example/Player_1").is_ok());
        assert!(ObjectPath::new("").is_err());
        assert!(ObjectPath::new("org/example").is_err());
        assert!(ObjectPath::new("/org/").is_err());
        assert!(ObjectPath::new("/org//example").is_err());
        assert!(ObjectPath::new("/org/ex-ample").is_err());
    }

    #[test]
    fn test_child_toward() {
        let root = ObjectPath::root();
        let org = ObjectPath::new("/org").unwrap();
        let player = ObjectPath::new("/org/example/Player").unwrap();
        let organ = ObjectPath::new("/organ").unwrap();

        assert_eq!(root.child_toward(&player), Some("org"));
        assert_eq!(org.child_toward(&player), Some("example"));
        assert_eq!(org.child_toward(&organ), None);
        assert_eq!(org.child_toward(&org), None);
        assert_eq!(player.child_toward(&org), None);
    }
}
