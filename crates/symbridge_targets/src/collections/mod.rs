//! Containers the interpreter treats as opaque values with a small, fixed set of operations.
//!
//! Each collection is either backed by an ordinary container ([`SymbolicList::Concrete`] and
//! friends), or a placeholder for a value the interpreter models symbolically
//! ([`SymbolicList::Symbolic`] and friends). The mode is picked once, at construction.
//! A symbolic collection only ever exists inside the interpreter: calling any of its
//! operations concretely means interception failed, which is fatal.

use core::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

pub mod list;
pub use list::*;

pub mod map;
pub use map::*;

pub mod identity_map;
pub use identity_map::*;

use crate::engine::interception_failure;

/// The interpreter's name for a symbolic collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct SymbolicHandle(u64);

impl SymbolicHandle {
    /// Wraps an id handed out by the interpreter
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw id
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl Display for SymbolicHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cold]
#[track_caller]
fn unintercepted(operation: &str, handle: SymbolicHandle) -> ! {
    interception_failure(&format!("{operation} on symbolic collection {handle}"))
}
