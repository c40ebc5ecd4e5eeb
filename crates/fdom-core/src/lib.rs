#![forbid(unsafe_code)]

//! Core: platform capability surface, mutation records, and binding contracts.

pub mod mutation;
pub mod surface;

pub use mutation::{CLASS_ATTRIBUTE, MutationFilter, MutationKind, MutationRecord};
pub use surface::{BindBlur, BlurListener, DomSurface, MutationSink, ObserveAttributes, SlotOccupied};
