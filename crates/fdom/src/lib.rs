#![forbid(unsafe_code)]

//! FrankenDOM public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users.

pub mod prelude {
    pub use fdom_behaviors as behaviors;
    pub use fdom_core as core;

    pub use fdom_behaviors::{
        BindError, ClassObserver, ClassSet, ClassTransition, Membership, UiMutator, Validator,
    };
    pub use fdom_core::{BindBlur, DomSurface, MutationFilter, MutationRecord, ObserveAttributes};
}
