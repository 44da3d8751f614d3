//! Typed values returned from [`super::XConn::get_prop`].
use crate::geometry::SizeHints;
use crate::model::Xid;

/// A window property value, decoded into a form the core can use directly
/// instead of juggling raw bytes and format codes at every call site.
#[derive(Debug, Clone, PartialEq)]
pub enum Prop {
    /// One or more atom names.
    Atom(Vec<String>),
    Cardinal(Vec<u32>),
    UTF8String(Vec<String>),
    Window(Vec<Xid>),
    WmHints(WmHints),
    WmNormalHints(SizeHints),
}

/// Decoded `WM_HINTS` (ICCCM 4.1.2.4). Only the fields the core consults are
/// exposed: the urgency bit and whether the client accepts input focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WmHints {
    pub urgent: bool,
    /// `input == false` with no `WM_TAKE_FOCUS` marks the client
    /// never-focus; `None` means the hint was absent (treat as `true`).
    pub input: Option<bool>,
}
