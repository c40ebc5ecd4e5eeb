#![forbid(unsafe_code)]

//! Committed-input synchronization.
//!
//! [`UiMutator`] watches one input element for focus loss and forwards the
//! committed value to a mutation callback, or signals an empty-input
//! condition instead. The component performs no page writes itself; the
//! mutate target is carried for the caller's side effects.
//!
//! # Invariants
//!
//! 1. At most one focus-loss listener per binding; [`bind`](UiMutator::bind)
//!    while bound is an invalid-state error, never a silent rebind.
//! 2. An empty committed value with an empty-input callback supplied fires
//!    only that callback.
//! 3. [`unbind`](UiMutator::unbind) when not bound is a safe no-op and never
//!    touches another component's listener.

use std::rc::Rc;

use fdom_core::surface::{BindBlur, BlurListener, DomSurface};
use tracing::{debug, trace};

use crate::error::BindError;

struct MutatorShared<S: DomSurface> {
    surface: S,
    observe: S::Node,
    on_mutation: Box<dyn Fn(S::Node, &str)>,
    on_empty_input: Option<Box<dyn Fn()>>,
}

impl<S: DomSurface> MutatorShared<S> {
    fn on_blur(&self) {
        let value = self.surface.value(self.observe);
        if value.is_empty()
            && let Some(on_empty_input) = &self.on_empty_input
        {
            trace!(target: "fdom::ui_mutator", node = ?self.observe, "empty input");
            on_empty_input();
            return;
        }
        trace!(target: "fdom::ui_mutator", node = ?self.observe, value = %value, "mutation");
        (self.on_mutation)(self.observe, &value);
    }
}

/// Forwards an input's committed value on focus loss.
///
/// Constructed inert; [`bind`](UiMutator::bind) claims the observe node's
/// focus-loss slot. Dropping the component unbinds it.
pub struct UiMutator<S: BindBlur> {
    mutate: S::Node,
    shared: Rc<MutatorShared<S>>,
    bound: bool,
}

impl<S: BindBlur> UiMutator<S> {
    /// Create an unbound mutator.
    ///
    /// `on_mutation` receives the observe node and its committed value;
    /// `on_empty_input`, when supplied, replaces it for empty values.
    pub fn new(
        surface: S,
        mutate: S::Node,
        observe: S::Node,
        on_mutation: impl Fn(S::Node, &str) + 'static,
        on_empty_input: Option<Box<dyn Fn()>>,
    ) -> Self {
        Self {
            mutate,
            shared: Rc::new(MutatorShared {
                surface,
                observe,
                on_mutation: Box::new(on_mutation),
                on_empty_input,
            }),
            bound: false,
        }
    }

    /// Claim the observe node's focus-loss slot.
    ///
    /// # Errors
    ///
    /// [`BindError::AlreadyBound`] when this component is already bound;
    /// [`BindError::SlotOccupied`] when another component holds the slot.
    pub fn bind(&mut self) -> Result<(), BindError>
    where
        S: 'static,
    {
        if self.bound {
            return Err(BindError::AlreadyBound);
        }
        let shared = Rc::clone(&self.shared);
        let listener: BlurListener = Rc::new(move || shared.on_blur());
        self.shared
            .surface
            .bind_blur(self.shared.observe, listener)?;
        self.bound = true;
        debug!(target: "fdom::ui_mutator", node = ?self.shared.observe, "bound");
        Ok(())
    }

    /// Release the slot and clear the bound flag. No-op when not bound.
    pub fn unbind(&mut self) {
        if !self.bound {
            return;
        }
        self.shared.surface.unbind_blur(self.shared.observe);
        self.bound = false;
        debug!(target: "fdom::ui_mutator", node = ?self.shared.observe, "unbound");
    }

    /// Whether the focus-loss listener is installed.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// The node the caller mutates in response to callbacks.
    #[must_use]
    pub fn mutate_target(&self) -> S::Node {
        self.mutate
    }

    /// The observed input node.
    #[must_use]
    pub fn observe_target(&self) -> S::Node {
        self.shared.observe
    }
}

impl<S: BindBlur> Drop for UiMutator<S> {
    fn drop(&mut self) {
        self.unbind();
    }
}
