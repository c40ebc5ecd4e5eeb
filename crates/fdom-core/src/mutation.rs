#![forbid(unsafe_code)]

//! Mutation notification types.
//!
//! Hosts deliver attribute, child-list, and text mutations as ordered batches
//! of [`MutationRecord`]s. Subscriptions are scoped by a [`MutationFilter`],
//! so an attribute-only observer never sees tree or text records.
//!
//! # Invariants
//!
//! 1. Records within one delivered batch preserve the order in which the
//!    host applied the mutations.
//! 2. An attribute record's `value` is the attribute's value immediately
//!    after that mutation (`None` when the attribute was removed), so a
//!    consumer can evaluate each record without querying the live tree.
//! 3. A record never matches a subscription whose filter excludes its kind.

use bitflags::bitflags;

/// Name of the attribute that carries an element's class list.
pub const CLASS_ATTRIBUTE: &str = "class";

/// What changed on the target node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    /// An attribute was set, changed, or removed.
    Attributes,
    /// A child was appended to or detached from the target.
    ChildList,
    /// The target's text content changed.
    CharacterData,
}

impl MutationKind {
    /// The filter bit matching this kind.
    #[must_use]
    pub fn as_filter(self) -> MutationFilter {
        match self {
            MutationKind::Attributes => MutationFilter::ATTRIBUTES,
            MutationKind::ChildList => MutationFilter::CHILD_LIST,
            MutationKind::CharacterData => MutationFilter::CHARACTER_DATA,
        }
    }
}

bitflags! {
    /// Which mutation kinds a subscription wants delivered.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MutationFilter: u8 {
        const ATTRIBUTES = 1 << 0;
        const CHILD_LIST = 1 << 1;
        const CHARACTER_DATA = 1 << 2;
    }
}

impl MutationFilter {
    /// Whether records of `kind` pass this filter.
    #[must_use]
    pub fn accepts(self, kind: MutationKind) -> bool {
        self.contains(kind.as_filter())
    }
}

/// One observed mutation on a node.
///
/// `N` is the host's node id type. For attribute records, `attribute_name`
/// names the attribute and `value` snapshots its post-mutation value; both
/// are `None` for tree and text records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord<N> {
    pub kind: MutationKind,
    pub attribute_name: Option<String>,
    pub target: N,
    pub value: Option<String>,
}

impl<N: Copy> MutationRecord<N> {
    /// Build an attribute record with a post-mutation value snapshot.
    #[must_use]
    pub fn attribute(target: N, name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            kind: MutationKind::Attributes,
            attribute_name: Some(name.into()),
            target,
            value,
        }
    }

    /// Build a child-list record for `target`'s children changing.
    #[must_use]
    pub fn child_list(target: N) -> Self {
        Self {
            kind: MutationKind::ChildList,
            attribute_name: None,
            target,
            value: None,
        }
    }

    /// Build a text-content record.
    #[must_use]
    pub fn character_data(target: N) -> Self {
        Self {
            kind: MutationKind::CharacterData,
            attribute_name: None,
            target,
            value: None,
        }
    }

    /// Whether this record describes a change to the class attribute.
    #[must_use]
    pub fn is_class_change(&self) -> bool {
        self.kind == MutationKind::Attributes
            && self.attribute_name.as_deref() == Some(CLASS_ATTRIBUTE)
    }
}
