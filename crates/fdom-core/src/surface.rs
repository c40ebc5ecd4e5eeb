#![forbid(unsafe_code)]

//! The capability surface a host page exposes to behaviors.
//!
//! Behaviors never own the tree. They hold a cheap-clone handle implementing
//! [`DomSurface`] plus `Copy` node ids, and install subscriptions through
//! [`ObserveAttributes`] and [`BindBlur`]. The host (a real page binding or
//! the in-memory harness) owns node lifetimes and event delivery.
//!
//! # Architecture
//!
//! Surfaces use single-threaded interior mutability: every operation takes
//! `&self`, and `Clone` produces another handle to the **same** underlying
//! page. Sinks and listeners are `Rc`-shared closures the host invokes one
//! at a time; no operation blocks or suspends.
//!
//! # Invariants
//!
//! 1. `disconnect` on a dead or never-delivered subscription is a no-op.
//! 2. A node's focus-loss slot holds at most one listener; a second
//!    [`bind_blur`](BindBlur::bind_blur) is rejected, never an overwrite.
//! 3. `unbind_blur` on an empty slot is a no-op.
//! 4. Operations on a node id the host has discarded are a usage error the
//!    surface is not required to detect.

use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

use thiserror::Error;

use crate::mutation::{MutationFilter, MutationRecord};

/// Batch callback for delivered mutation records.
pub type MutationSink<N> = Rc<dyn Fn(&[MutationRecord<N>])>;

/// Focus-loss callback. Reads whatever page state it needs through a
/// captured surface handle.
pub type BlurListener = Rc<dyn Fn()>;

/// A second listener was registered for a node whose focus-loss slot is
/// already held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("focus-loss slot is already occupied for the target node")]
pub struct SlotOccupied;

/// State operations on a host page: class membership, attributes, committed
/// input values, and tree shape.
pub trait DomSurface: Clone {
    /// Host-owned node identity. Ids stay valid as long as the host keeps
    /// the node; behaviors treat them as opaque.
    type Node: Copy + Eq + Hash + Debug;

    /// Whether `node` currently carries `class`.
    fn has_class(&self, node: Self::Node, class: &str) -> bool;

    /// Add every class in `classes` that the node does not already carry.
    fn add_classes(&self, node: Self::Node, classes: &[String]);

    /// Remove every class in `classes` the node carries.
    fn remove_classes(&self, node: Self::Node, classes: &[String]);

    /// Current value of a string attribute, `None` when unset.
    fn attribute(&self, node: Self::Node, name: &str) -> Option<String>;

    /// Set a string attribute.
    fn set_attribute(&self, node: Self::Node, name: &str, value: &str);

    /// Remove an attribute; no-op when unset.
    fn remove_attribute(&self, node: Self::Node, name: &str);

    /// The node's committed input value.
    fn value(&self, node: Self::Node) -> String;

    /// The node's parent, `None` for detached nodes and the root.
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Append `child` as the last child of `parent`, detaching it from any
    /// current parent first. Appending under the same parent moves the child
    /// to the end.
    fn append_child(&self, parent: Self::Node, child: Self::Node);

    /// Detach `node` from its parent; no-op when already detached.
    fn detach(&self, node: Self::Node);

    /// Whether the node is reachable from the page root.
    fn is_attached(&self, node: Self::Node) -> bool;

    /// Create a new detached element.
    fn create_element(&self, tag: &str) -> Self::Node;

    /// Replace the node's text content.
    fn set_text(&self, node: Self::Node, text: &str);
}

/// Scoped mutation subscriptions.
pub trait ObserveAttributes: DomSurface {
    /// Subscription handle returned by [`observe`](ObserveAttributes::observe).
    type ObserverId: Copy + Eq + Debug;

    /// Subscribe `sink` to mutations on `node` whose kind passes `filter`.
    /// Observation begins immediately; records are delivered in host order,
    /// one batch at a time.
    fn observe(
        &self,
        node: Self::Node,
        filter: MutationFilter,
        sink: MutationSink<Self::Node>,
    ) -> Self::ObserverId;

    /// Cancel a subscription. Idempotent; unknown ids are ignored.
    fn disconnect(&self, id: Self::ObserverId);
}

/// The focus-loss slot registry.
///
/// Slots are keyed by node identity and hold at most one listener. Binding
/// into an occupied slot is rejected so that two components can never
/// silently discard each other's listener.
pub trait BindBlur: DomSurface {
    /// Claim the node's focus-loss slot for `listener`.
    ///
    /// # Errors
    ///
    /// [`SlotOccupied`] when another listener already holds the slot.
    fn bind_blur(&self, node: Self::Node, listener: BlurListener) -> Result<(), SlotOccupied>;

    /// Release the node's focus-loss slot; no-op when empty.
    fn unbind_blur(&self, node: Self::Node);
}
