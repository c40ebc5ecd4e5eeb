#![forbid(unsafe_code)]

//! Blur-driven validation with visual feedback.
//!
//! [`Validator`] runs a validation function over an input's committed value
//! on every focus loss and projects the outcome onto the page: `data-valid`
//! and `data-error` markers, error/valid class sets toggled through their
//! representative markers, and an inline error-display element owned by the
//! validator, created once and moved rather than recreated.
//!
//! # Invariants
//!
//! 1. The error-display element is attached if and only if the last run
//!    failed.
//! 2. `data-valid` and `data-error` always reflect the most recent outcome.
//! 3. Error and valid class sets are never applied simultaneously after a
//!    run.
//! 4. [`dispose`](Validator::dispose) detaches listener and error display,
//!    idempotently; a later focus loss changes nothing.

use std::cell::Cell;
use std::rc::Rc;

use fdom_core::surface::{BindBlur, BlurListener, DomSurface};
use tracing::{debug, trace};

use crate::class_set::ClassSet;
use crate::error::BindError;

/// Marker attribute recording the last outcome.
const DATA_VALID: &str = "data-valid";
/// Marker attribute carrying the last failure message.
const DATA_ERROR: &str = "data-error";

struct ValidatorShared<S: DomSurface> {
    surface: S,
    input: S::Node,
    validation: Box<dyn Fn(&str) -> Option<String>>,
    error_classes: Option<ClassSet>,
    valid_classes: Option<ClassSet>,
    error_display: S::Node,
    error_attached: Cell<bool>,
}

impl<S: DomSurface> ValidatorShared<S> {
    fn run(&self) {
        let value = self.surface.value(self.input);
        match (self.validation)(&value) {
            None => self.apply_valid(),
            Some(message) => self.apply_invalid(&message),
        }
    }

    fn apply_valid(&self) {
        trace!(target: "fdom::validator", node = ?self.input, "valid");
        self.surface.set_attribute(self.input, DATA_VALID, "true");
        self.surface.remove_attribute(self.input, DATA_ERROR);

        if let Some(error_classes) = &self.error_classes
            && error_classes.is_marked(&self.surface, self.input)
        {
            error_classes.clear(&self.surface, self.input);
        }
        if let Some(valid_classes) = &self.valid_classes
            && !valid_classes.is_marked(&self.surface, self.input)
        {
            valid_classes.apply(&self.surface, self.input);
        }

        self.detach_error_display();
    }

    fn apply_invalid(&self, message: &str) {
        trace!(target: "fdom::validator", node = ?self.input, error = %message, "invalid");
        self.surface.set_attribute(self.input, DATA_VALID, "false");
        self.surface.set_attribute(self.input, DATA_ERROR, message);

        if let Some(error_classes) = &self.error_classes
            && !error_classes.is_marked(&self.surface, self.input)
        {
            error_classes.apply(&self.surface, self.input);
        }
        if let Some(valid_classes) = &self.valid_classes
            && valid_classes.is_marked(&self.surface, self.input)
        {
            valid_classes.clear(&self.surface, self.input);
        }

        self.surface.set_text(self.error_display, message);
        // Append moves the display to the end even when already attached,
        // so it always trails the input's siblings.
        if let Some(parent) = self.surface.parent(self.input) {
            self.surface.append_child(parent, self.error_display);
            self.error_attached.set(true);
        }
    }

    fn detach_error_display(&self) {
        if self.error_attached.replace(false) {
            self.surface.detach(self.error_display);
        }
    }
}

/// Validates an input on focus loss and reflects the outcome in the page.
///
/// The focus-loss listener is installed at construction; there is no
/// separate bind step. The input node is borrowed; the error-display node is
/// owned. Dropping the validator disposes it.
pub struct Validator<S: BindBlur> {
    shared: Rc<ValidatorShared<S>>,
    disposed: bool,
}

impl<S: BindBlur> Validator<S> {
    /// Create a validator and begin validating immediately.
    ///
    /// `validation` returns `Some(message)` for an invalid value and `None`
    /// for a valid one. `error_classes` and `valid_classes` are disjoint
    /// sets toggled on the input per outcome.
    ///
    /// # Errors
    ///
    /// [`BindError::SlotOccupied`] when another component already holds the
    /// input's focus-loss slot.
    pub fn new(
        surface: S,
        input: S::Node,
        validation: impl Fn(&str) -> Option<String> + 'static,
        error_classes: Option<ClassSet>,
        valid_classes: Option<ClassSet>,
    ) -> Result<Self, BindError>
    where
        S: 'static,
    {
        let error_display = surface.create_element("p");
        surface.set_attribute(error_display, "style", "color: red");

        let shared = Rc::new(ValidatorShared {
            surface,
            input,
            validation: Box::new(validation),
            error_classes,
            valid_classes,
            error_display,
            error_attached: Cell::new(false),
        });

        let listener_shared = Rc::clone(&shared);
        let listener: BlurListener = Rc::new(move || listener_shared.run());
        shared.surface.bind_blur(input, listener)?;
        debug!(target: "fdom::validator", node = ?input, "validating");

        Ok(Self {
            shared,
            disposed: false,
        })
    }

    /// Detach the focus-loss listener and the error display. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.shared.detach_error_display();
        self.shared.surface.unbind_blur(self.shared.input);
        self.disposed = true;
        debug!(target: "fdom::validator", node = ?self.shared.input, "disposed");
    }

    /// Whether the error display is currently in the page.
    #[must_use]
    pub fn error_visible(&self) -> bool {
        self.shared.error_attached.get()
    }

    /// The owned error-display node.
    #[must_use]
    pub fn error_display(&self) -> S::Node {
        self.shared.error_display
    }

    /// The validated input node.
    #[must_use]
    pub fn input(&self) -> S::Node {
        self.shared.input
    }

    /// Whether [`dispose`](Validator::dispose) has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl<S: BindBlur> Drop for Validator<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fdom_harness::{NodeId, Page};
    use pretty_assertions::assert_eq;

    fn positive_number(value: &str) -> Option<String> {
        match value.parse::<i64>() {
            Ok(n) if n > 0 => None,
            Ok(_) => Some("must be positive".to_string()),
            Err(_) => Some("must be a number".to_string()),
        }
    }

    fn page_with_input() -> (Page, NodeId) {
        let page = Page::new();
        let input = page.create_element("input");
        page.append_child(page.root(), input);
        (page, input)
    }

    fn sets() -> (Option<ClassSet>, Option<ClassSet>) {
        (
            ClassSet::new(["is-invalid", "shake"]),
            ClassSet::new(["is-valid"]),
        )
    }

    #[test]
    fn valid_outcome_marks_and_classes() {
        let (page, input) = page_with_input();
        let (error_classes, valid_classes) = sets();
        let validator = Validator::new(
            page.clone(),
            input,
            positive_number,
            error_classes,
            valid_classes,
        )
        .unwrap();

        page.set_value(input, "5");
        page.blur(input);

        assert_eq!(page.attribute(input, "data-valid").as_deref(), Some("true"));
        assert_eq!(page.attribute(input, "data-error"), None);
        assert!(page.has_class(input, "is-valid"));
        assert!(!page.has_class(input, "is-invalid"));
        assert!(!validator.error_visible());
        assert!(!page.is_attached(validator.error_display()));
    }

    #[test]
    fn invalid_outcome_marks_classes_and_error_display() {
        let (page, input) = page_with_input();
        let sibling = page.create_element("span");
        page.append_child(page.root(), sibling);
        let (error_classes, valid_classes) = sets();
        let validator = Validator::new(
            page.clone(),
            input,
            positive_number,
            error_classes,
            valid_classes,
        )
        .unwrap();

        page.set_value(input, "-1");
        page.blur(input);

        assert_eq!(page.attribute(input, "data-valid").as_deref(), Some("false"));
        assert_eq!(
            page.attribute(input, "data-error").as_deref(),
            Some("must be positive")
        );
        assert!(page.has_class(input, "is-invalid"));
        assert!(page.has_class(input, "shake"));
        assert!(!page.has_class(input, "is-valid"));
        assert!(validator.error_visible());
        assert_eq!(page.last_child(page.root()), Some(validator.error_display()));
        assert_eq!(page.text(validator.error_display()), "must be positive");
    }

    #[test]
    fn alternating_outcomes_leave_only_the_latest_state() {
        let (page, input) = page_with_input();
        let (error_classes, valid_classes) = sets();
        let validator = Validator::new(
            page.clone(),
            input,
            positive_number,
            error_classes,
            valid_classes,
        )
        .unwrap();

        for (value, valid) in [("-1", false), ("5", true), ("abc", false), ("9", true)] {
            page.set_value(input, value);
            page.blur(input);

            assert_eq!(
                page.attribute(input, "data-valid").as_deref(),
                Some(if valid { "true" } else { "false" })
            );
            assert_eq!(page.has_class(input, "is-valid"), valid);
            assert_eq!(page.has_class(input, "is-invalid"), !valid);
            assert_eq!(validator.error_visible(), !valid);
        }

        // The display was moved, never duplicated.
        let display = validator.error_display();
        let copies = page
            .children(page.root())
            .into_iter()
            .filter(|child| *child == display)
            .count();
        assert_eq!(copies, 0);

        page.set_value(input, "0");
        page.blur(input);
        assert_eq!(page.attribute(input, "data-error").as_deref(), Some("must be positive"));
    }

    #[test]
    fn repeated_failures_move_the_same_display_to_the_end() {
        let (page, input) = page_with_input();
        let validator =
            Validator::new(page.clone(), input, positive_number, None, None).unwrap();

        page.set_value(input, "-1");
        page.blur(input);
        let display = validator.error_display();
        assert_eq!(page.last_child(page.root()), Some(display));

        let late_sibling = page.create_element("span");
        page.append_child(page.root(), late_sibling);
        assert_eq!(page.last_child(page.root()), Some(late_sibling));

        page.set_value(input, "-2");
        page.blur(input);
        assert_eq!(page.last_child(page.root()), Some(display));
        assert_eq!(page.text(display), "must be positive");
        assert_eq!(
            page.children(page.root())
                .into_iter()
                .filter(|child| *child == display)
                .count(),
            1
        );
    }

    #[test]
    fn class_sets_are_optional() {
        let (page, input) = page_with_input();
        let _validator =
            Validator::new(page.clone(), input, positive_number, None, None).unwrap();

        page.set_value(input, "-1");
        page.blur(input);
        assert_eq!(page.classes(input), Vec::<String>::new());
        assert_eq!(page.attribute(input, "data-valid").as_deref(), Some("false"));

        page.set_value(input, "3");
        page.blur(input);
        assert_eq!(page.classes(input), Vec::<String>::new());
        assert_eq!(page.attribute(input, "data-valid").as_deref(), Some("true"));
    }

    #[test]
    fn detached_input_fails_without_attaching_the_display() {
        let page = Page::new();
        let input = page.create_element("input");
        let validator =
            Validator::new(page.clone(), input, positive_number, None, None).unwrap();

        page.set_value(input, "-1");
        page.blur(input);

        assert_eq!(page.attribute(input, "data-valid").as_deref(), Some("false"));
        assert!(!validator.error_visible());
    }

    #[test]
    fn dispose_detaches_everything_idempotently() {
        let (page, input) = page_with_input();
        let (error_classes, valid_classes) = sets();
        let mut validator = Validator::new(
            page.clone(),
            input,
            positive_number,
            error_classes,
            valid_classes,
        )
        .unwrap();

        page.set_value(input, "-1");
        page.blur(input);
        assert!(validator.error_visible());

        validator.dispose();
        assert!(validator.is_disposed());
        assert!(!validator.error_visible());
        assert!(!page.is_attached(validator.error_display()));
        assert!(!page.has_blur_listener(input));

        // A later blur changes nothing.
        page.set_value(input, "5");
        page.blur(input);
        assert_eq!(page.attribute(input, "data-valid").as_deref(), Some("false"));

        validator.dispose();
        assert!(validator.is_disposed());
    }

    #[test]
    fn occupied_slot_rejects_construction() {
        let (page, input) = page_with_input();
        let _first =
            Validator::new(page.clone(), input, positive_number, None, None).unwrap();
        let second = Validator::new(page.clone(), input, positive_number, None, None);
        assert!(matches!(second, Err(BindError::SlotOccupied(_))));
    }

    #[test]
    fn drop_releases_listener_and_display() {
        let (page, input) = page_with_input();
        {
            let _validator =
                Validator::new(page.clone(), input, positive_number, None, None).unwrap();
            page.set_value(input, "-1");
            page.blur(input);
            assert!(page.has_blur_listener(input));
        }
        assert!(!page.has_blur_listener(input));
        assert_eq!(page.children(page.root()), vec![input]);
    }
}
