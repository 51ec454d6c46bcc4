//! Type identity tags.
//!
//! A [`TypeTag`] records *which type the caller committed to* when an
//! identifier was registered. It is captured from a Rust type, never
//! inferred from the stored value, and two tags are equal only when they
//! name the same [`TypeId`]. Two structs with identical fields and methods
//! are still different tags.
//!
//! Every registry entry carries a [`Tag`]: either a known [`TypeTag`] or
//! [`Tag::Unknown`], the state of an entry seeded without a type.

use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

use depot_support::rendering::shorten_type_name;

/// Identity of a registered type.
///
/// # Examples
/// ```
/// use depot_container::tag::TypeTag;
///
/// struct Mailer;
/// struct LookalikeMailer;
///
/// assert_eq!(TypeTag::of::<Mailer>(), TypeTag::of::<Mailer>());
/// assert_ne!(TypeTag::of::<Mailer>(), TypeTag::of::<LookalikeMailer>());
/// ```
#[derive(Clone, Copy)]
pub struct TypeTag {
    type_id: TypeId,
    type_name: &'static str,
}

impl TypeTag {
    /// Captures the identity of `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }

    /// Returns the [`TypeId`] this tag compares by.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the fully qualified type name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the type name without module paths.
    pub fn short_name(&self) -> String {
        shorten_type_name(self.type_name)
    }

    /// Returns `true` if this tag names `T`.
    #[inline]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeTag({})", self.type_name)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_name())
    }
}

/// Tag stored alongside a registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// The entry was registered with an explicit type.
    Known(TypeTag),

    /// The entry was seeded without a type and has made no commitment.
    ///
    /// Any later registration may replace it.
    Unknown,
}

impl Tag {
    /// Returns `true` if an entry carrying this tag may be replaced by a
    /// registration tagged `incoming`.
    ///
    /// An unknown tag accepts anything. A known tag accepts only the same
    /// identity; an untyped replacement is not a match for a committed type.
    ///
    /// # Examples
    /// ```
    /// use depot_container::tag::{Tag, TypeTag};
    ///
    /// struct A;
    /// struct B;
    ///
    /// let a = TypeTag::of::<A>();
    /// let b = TypeTag::of::<B>();
    ///
    /// assert!(Tag::Unknown.accepts(&Tag::Known(b)));
    /// assert!(Tag::Known(a).accepts(&Tag::Known(a)));
    /// assert!(!Tag::Known(a).accepts(&Tag::Known(b)));
    /// assert!(!Tag::Known(a).accepts(&Tag::Unknown));
    /// ```
    pub fn accepts(&self, incoming: &Tag) -> bool {
        match (self, incoming) {
            (Tag::Unknown, _) => true,
            (Tag::Known(current), Tag::Known(next)) => current == next,
            (Tag::Known(_), Tag::Unknown) => false,
        }
    }

    /// Returns the known type tag, if any.
    #[inline]
    pub fn known(&self) -> Option<&TypeTag> {
        match self {
            Tag::Known(tag) => Some(tag),
            Tag::Unknown => None,
        }
    }

    #[inline]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Tag::Unknown)
    }
}

impl From<TypeTag> for Tag {
    fn from(tag: TypeTag) -> Self {
        Tag::Known(tag)
    }
}

impl From<Option<TypeTag>> for Tag {
    fn from(tag: Option<TypeTag>) -> Self {
        tag.map_or(Tag::Unknown, Tag::Known)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Known(tag) => write!(f, "{tag}"),
            Tag::Unknown => f.write_str("<untyped>"),
        }
    }
}
