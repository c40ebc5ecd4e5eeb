#![forbid(unsafe_code)]

//! Caller-supplied class lists with representative-marker semantics.
//!
//! A [`ClassSet`] is applied and cleared as a whole, but "is this set
//! currently applied" is answered by testing only the set's **first** entry,
//! the marker class. Callers that need per-class accounting should pass
//! single-class sets.

use fdom_core::surface::DomSurface;

/// A non-empty list of class names treated as one visual state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSet {
    classes: Vec<String>,
}

impl ClassSet {
    /// Build a set from the given names. Returns `None` when `classes`
    /// yields nothing, since a set without a marker cannot be tested.
    pub fn new<I, T>(classes: I) -> Option<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let classes: Vec<String> = classes.into_iter().map(Into::into).collect();
        if classes.is_empty() {
            None
        } else {
            Some(Self { classes })
        }
    }

    /// The marker class: the first entry, used for membership tests.
    #[must_use]
    pub fn marker(&self) -> &str {
        &self.classes[0]
    }

    /// All classes in the set, marker first.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Whether the node carries the marker class.
    pub fn is_marked<S: DomSurface>(&self, surface: &S, node: S::Node) -> bool {
        surface.has_class(node, self.marker())
    }

    /// Add every class in the set to the node.
    pub fn apply<S: DomSurface>(&self, surface: &S, node: S::Node) {
        surface.add_classes(node, &self.classes);
    }

    /// Remove every class in the set from the node.
    pub fn clear<S: DomSurface>(&self, surface: &S, node: S::Node) {
        surface.remove_classes(node, &self.classes);
    }
}
