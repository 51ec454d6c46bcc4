//! Service identifiers.
//!
//! An [`Identifier`] names one logical service slot inside a single
//! container. Identifiers are supplied by the caller and never generated.

use std::borrow::{Borrow, Cow};
use std::fmt;

/// Key of one service slot in a [`Container`](crate::container::Container).
///
/// Static names are stored without allocating; owned strings are accepted
/// for identifiers built at runtime. Lookups borrow as `&str`, so callers
/// never construct an `Identifier` just to resolve.
///
/// # Examples
/// ```
/// use depot_container::key::Identifier;
///
/// let id = Identifier::from("Mailer");
/// assert_eq!(id.as_str(), "Mailer");
/// assert_eq!(id, Identifier::from(String::from("Mailer")));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(Cow<'static, str>);

impl Identifier {
    /// Creates an identifier from a static name without allocating.
    #[inline]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Returns the identifier as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for Identifier {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for Identifier {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl From<&String> for Identifier {
    fn from(name: &String) -> Self {
        Self(Cow::Owned(name.clone()))
    }
}

impl From<&Identifier> for Identifier {
    fn from(id: &Identifier) -> Self {
        id.clone()
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({:?})", self.as_str())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_and_owned_are_equal() {
        assert_eq!(Identifier::from("Svc"), Identifier::from(String::from("Svc")));
    }

    #[test]
    fn different_names_differ() {
        assert_ne!(Identifier::from("Svc"), Identifier::from("svc"));
    }

    #[test]
    fn hashmap_lookup_by_str() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(Identifier::from("TestService"), 1);
        map.insert(Identifier::from(String::from("AnotherService")), 2);
        assert_eq!(map.get("TestService"), Some(&1));
        assert_eq!(map.get("AnotherService"), Some(&2));
        assert_eq!(map.get("Missing"), None);
    }

    #[test]
    fn display_is_bare_name() {
        assert_eq!(Identifier::from("Mailer").to_string(), "Mailer");
        assert_eq!(format!("{:?}", Identifier::from("Mailer")), "Identifier(\"Mailer\")");
    }
}
