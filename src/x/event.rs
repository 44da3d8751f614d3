//! The event types handed from an [`super::XConn`] backend to the dispatch
//! table (§4.5).
use crate::bindings::{KeyCode, MouseEvent};
use crate::geometry::{Point, Rect};
use crate::model::Xid;

/// One event pulled off the X connection, normalized away from whatever
/// wire representation the backend uses.
#[derive(Debug, Clone, PartialEq)]
pub enum XEvent {
    ButtonPress(MouseEvent),
    /// Ends an interactive move/resize pump (§4.5); not routed through the
    /// main dispatch table, only polled for directly by
    /// [`crate::event::interactive`].
    ButtonRelease(Xid),
    ClientMessage(ClientMessage),
    ConfigureNotify(ConfigureEvent),
    ConfigureRequest(ConfigureEvent),
    Destroy(Xid),
    /// `bool` is whether this was a true unmap (not a synthetic one sent by
    /// a client re-parenting itself, which must not trigger `unmanage`).
    UnmapNotify(Xid, bool),
    Enter(PointerChange),
    Leave(PointerChange),
    Expose(ExposeEvent),
    FocusIn(Xid),
    KeyPress(KeyCode),
    MappingNotify,
    MapRequest(Xid),
    MotionNotify(Point),
    PropertyNotify(PropertyEvent),
    /// Xinerama/RandR reported a screen layout change.
    ScreenChange,
}

impl std::fmt::Display for XEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use XEvent::*;
        let name = match self {
            ButtonPress(_) => "ButtonPress",
            ButtonRelease(_) => "ButtonRelease",
            ClientMessage(_) => "ClientMessage",
            ConfigureNotify(_) => "ConfigureNotify",
            ConfigureRequest(_) => "ConfigureRequest",
            Destroy(_) => "Destroy",
            UnmapNotify(..) => "UnmapNotify",
            Enter(_) => "Enter",
            Leave(_) => "Leave",
            Expose(_) => "Expose",
            FocusIn(_) => "FocusIn",
            KeyPress(_) => "KeyPress",
            MappingNotify => "MappingNotify",
            MapRequest(_) => "MapRequest",
            MotionNotify(_) => "MotionNotify",
            PropertyNotify(_) => "PropertyNotify",
            ScreenChange => "ScreenChange",
        };
        write!(f, "{name}")
    }
}

/// A `_NET_WM_STATE`/`WM_PROTOCOLS` style client message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientMessage {
    pub id: Xid,
    pub dtype: String,
    pub data: [u32; 5],
}

/// `_NET_WM_STATE` message actions, per EWMH: the action is carried in
/// `data[0]` of the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateAction {
    Remove,
    Add,
    Toggle,
}

impl StateAction {
    pub fn from_u32(v: u32) -> Option<Self> {
        match v {
            0 => Some(Self::Remove),
            1 => Some(Self::Add),
            2 => Some(Self::Toggle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigureEvent {
    pub id: Xid,
    pub r: Rect,
    pub border_only: bool,
    pub is_root: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExposeEvent {
    pub id: Xid,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerChange {
    pub id: Xid,
    pub abs: Point,
    pub same_screen: bool,
    /// `true` when the crossing is a hint/inferior transition that should
    /// be ignored rather than treated as a focus-worthy enter (§4.5).
    pub detail_inferior_or_hint: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyEvent {
    pub id: Xid,
    pub atom: String,
    pub is_root: bool,
}
