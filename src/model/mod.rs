//! The in-memory client/monitor graph (§3, §4.3 of the design).
//!
//! Everything in this module is a pure data structure: no X requests are
//! issued here. [`crate::focus`] and [`crate::event::handle`] are the layers
//! that read and mutate this state and then talk to the active
//! [`crate::x::XConn`].
mod client;
mod monitor;
mod rule;
mod tags;

pub use client::{Client, ClientFlags};
pub use monitor::Monitor;
pub use rule::Rule;
pub use tags::TagMask;

/// An opaque X11 resource ID.
///
/// Newtyped so that window, atom and pixmap IDs cannot be accidentally
/// mixed up at the call site, matching the reference architecture's `Xid`.
#[derive(Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct Xid(pub u32);

impl std::fmt::Display for Xid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<u32> for Xid {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<Xid> for u32 {
    fn from(id: Xid) -> Self {
        id.0
    }
}
