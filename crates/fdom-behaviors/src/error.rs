#![forbid(unsafe_code)]

//! Binding errors.

use fdom_core::surface::SlotOccupied;
use thiserror::Error;

/// Why a listener could not be installed.
///
/// Surfaced synchronously and fatal to that call only; the caller may
/// release the conflicting binding and retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BindError {
    /// This component already holds an active binding; unbind first.
    #[error("cannot bind a component that is already bound")]
    AlreadyBound,

    /// Another component holds the target node's focus-loss slot.
    #[error(transparent)]
    SlotOccupied(#[from] SlotOccupied),
}
