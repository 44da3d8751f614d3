//! Managed top-level windows.
use crate::geometry::{Rect, SizeHints};
use crate::model::{TagMask, Xid};

bitflags::bitflags! {
    /// Boolean sub-states a client can be in. Kept as a single bitflags
    /// value rather than six separate `bool` fields so that predicates like
    /// "is this client tileable" read as one mask test.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ClientFlags: u8 {
        /// `WM_NORMAL_HINTS` pins this client to a fixed size: it is forced
        /// floating and the tiler never touches its geometry.
        const FIXED        = 0b0000_0001;
        const FLOATING     = 0b0000_0010;
        /// Set from `WM_HINTS.urgency` or an EWMH demands-attention request.
        const URGENT       = 0b0000_0100;
        /// `WM_HINTS.input == false` and no `WM_TAKE_FOCUS`: never give this
        /// client input focus via `SetInputFocus`.
        const NEVER_FOCUS  = 0b0000_1000;
        const FULLSCREEN   = 0b0001_0000;
        const MINIMIZED    = 0b0010_0000;
    }
}

/// A managed top-level window.
#[derive(Debug, Clone)]
pub struct Client {
    pub id: Xid,
    pub name: String,

    /// Current on-screen geometry, border width included in neither `w` nor
    /// `h` (matches the X11 `ConfigureWindow` convention).
    pub geom: Rect,
    pub border_width: u32,

    /// Geometry saved immediately before an interactive move/resize or a
    /// tiling pass, restored when the client is toggled back to floating.
    pub saved_geom: Rect,
    /// Geometry saved immediately before `minimized` was set, so iconifying
    /// and restoring a floating client is a no-op on its position.
    pub saved_geom_minimized: Rect,

    pub hints: SizeHints,
    pub hints_valid: bool,

    pub tags: TagMask,
    pub monitor: usize,

    pub flags: ClientFlags,

    /// Floating flag and border width saved across a fullscreen toggle, so
    /// leaving fullscreen restores exactly what preceded it.
    pub pre_fullscreen_floating: bool,
    pub pre_fullscreen_border: u32,
}

impl Client {
    pub fn new(id: Xid, monitor: usize, tags: TagMask) -> Self {
        Client {
            id,
            name: String::new(),
            geom: Rect::new(0, 0, 1, 1),
            border_width: 0,
            saved_geom: Rect::new(0, 0, 1, 1),
            saved_geom_minimized: Rect::new(0, 0, 1, 1),
            hints: SizeHints::default(),
            hints_valid: false,
            tags,
            monitor,
            flags: ClientFlags::empty(),
            pre_fullscreen_floating: false,
            pre_fullscreen_border: 0,
        }
    }

    pub fn is_fixed(&self) -> bool {
        self.flags.contains(ClientFlags::FIXED)
    }

    pub fn is_floating(&self) -> bool {
        self.flags.contains(ClientFlags::FLOATING)
    }

    pub fn is_urgent(&self) -> bool {
        self.flags.contains(ClientFlags::URGENT)
    }

    pub fn never_focus(&self) -> bool {
        self.flags.contains(ClientFlags::NEVER_FOCUS)
    }

    pub fn is_fullscreen(&self) -> bool {
        self.flags.contains(ClientFlags::FULLSCREEN)
    }

    pub fn is_minimized(&self) -> bool {
        self.flags.contains(ClientFlags::MINIMIZED)
    }

    pub fn set_floating(&mut self, floating: bool) {
        self.flags.set(ClientFlags::FLOATING, floating);
    }

    pub fn set_urgent(&mut self, urgent: bool) {
        self.flags.set(ClientFlags::URGENT, urgent);
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.flags.set(ClientFlags::FULLSCREEN, fullscreen);
    }

    pub fn set_minimized(&mut self, minimized: bool) {
        self.flags.set(ClientFlags::MINIMIZED, minimized);
    }

    /// `true` iff this client participates in tiling arrangement: not
    /// floating and not fullscreen (fullscreen clients are always floating
    /// per the fullscreen invariant, this just spells that out at call
    /// sites).
    pub fn is_tiled(&self) -> bool {
        !self.is_floating() && !self.is_fullscreen()
    }

    pub fn is_visible_on(&self, tagset: TagMask) -> bool {
        self.tags.intersects(tagset) && !self.is_minimized()
    }

    /// `true` iff this client should be mapped as a dock-strip icon: tagged
    /// onto the current view but minimized, so excluded from tiling and
    /// focus cycling while still shown (see [`crate::focus::layout_dock`]).
    pub fn is_docked_on(&self, tagset: TagMask) -> bool {
        self.tags.intersects(tagset) && self.is_minimized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fullscreen_invariant_is_representable_not_enforced_by_the_type() {
        let mut c = Client::new(Xid(1), 0, TagMask::single(0));
        c.set_fullscreen(true);
        c.set_floating(true);
        c.border_width = 0;
        assert!(c.is_fullscreen() && c.is_floating());
    }

    #[test]
    fn new_client_is_tiled_by_default() {
        let c = Client::new(Xid(1), 0, TagMask::single(0));
        assert!(c.is_tiled());
    }

    #[test]
    fn minimized_client_is_never_visible() {
        let mut c = Client::new(Xid(1), 0, TagMask::single(0));
        c.set_minimized(true);
        assert!(!c.is_visible_on(TagMask::single(0)));
    }

    #[test]
    fn minimized_client_on_a_shown_tag_is_docked_not_visible() {
        let mut c = Client::new(Xid(1), 0, TagMask::single(0));
        c.set_minimized(true);
        assert!(c.is_docked_on(TagMask::single(0)));
        assert!(!c.is_visible_on(TagMask::single(0)));
    }

    #[test]
    fn minimized_client_on_a_hidden_tag_is_not_docked() {
        let mut c = Client::new(Xid(1), 0, TagMask::single(0));
        c.set_minimized(true);
        assert!(!c.is_docked_on(TagMask::single(1)));
    }
}
