//! Logical outputs.
use crate::geometry::Rect;
use crate::model::{TagMask, Xid};

/// A logical output (one X11 screen/CRTC, reconciled from Xinerama/RandR in
/// `updategeom`).
///
/// `clients` and `stack` are parallel views over the same window set:
/// `clients` is arrival order (used by the tilers, most-recent insertion at
/// index 0) and `stack` is focus-recency order (most-recently-focused at
/// index 0). Both must always contain exactly the same set of ids; see
/// [`Monitor::assert_invariants`] used in tests.
#[derive(Debug, Clone)]
pub struct Monitor {
    pub index: usize,

    /// Output rectangle as reported by Xinerama/RandR.
    pub m: Rect,
    /// Working area: `m` minus the bar strip when the bar is shown.
    pub w: Rect,

    pub bar: BarState,

    pub mfact: f64,
    pub nmaster: u32,

    /// Two tagsets plus a selector bit, so that `view`/`toggleview` can flip
    /// back to the previously shown set (dwm's `seltags ^= 1` trick).
    pub tagset: [TagMask; 2],
    pub sel_tagset: usize,

    pub layouts: [usize; 2],
    pub sel_layout: usize,
    pub layout_symbol: String,

    /// Arrival order, most-recently-inserted client first.
    pub clients: Vec<Xid>,
    /// Focus-recency order, most-recently-focused client first.
    pub stack: Vec<Xid>,

    pub bar_window: Option<Xid>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BarState {
    pub geom: Rect,
    pub shown: bool,
    /// `true` when the bar sits above the working area rather than below it.
    pub top: bool,
}

impl Monitor {
    pub fn new(index: usize, m: Rect) -> Self {
        Monitor {
            index,
            m,
            w: m,
            bar: BarState::default(),
            mfact: 0.5,
            nmaster: 1,
            tagset: [TagMask::single(0), TagMask::single(0)],
            sel_tagset: 0,
            layouts: [0, 1],
            sel_layout: 0,
            layout_symbol: String::new(),
            clients: Vec::new(),
            stack: Vec::new(),
            bar_window: None,
        }
    }

    pub fn selected_tags(&self) -> TagMask {
        self.tagset[self.sel_tagset]
    }

    pub fn selected_layout(&self) -> usize {
        self.layouts[self.sel_layout]
    }

    /// The focused client: the head of `stack` restricted to clients visible
    /// under the current tagset. Callers resolve this against the owning
    /// [`crate::state::WindowManager`]'s client table since `Monitor` itself
    /// only stores ids.
    pub fn stack_head(&self) -> Option<Xid> {
        self.stack.first().copied()
    }

    /// Detach `id` from both `clients` and `stack`. No-op if absent from
    /// either (callers are expected to have checked membership already via
    /// the invariant, this just keeps removal idempotent).
    pub fn detach(&mut self, id: Xid) {
        self.clients.retain(|&c| c != id);
        self.stack.retain(|&c| c != id);
    }

    pub fn attach(&mut self, id: Xid) {
        self.clients.insert(0, id);
    }

    pub fn attach_stack(&mut self, id: Xid) {
        self.stack.insert(0, id);
    }

    /// Move `id` to the head of the focus stack without touching arrival
    /// order, for use when a client gains focus.
    pub fn bump_stack(&mut self, id: Xid) {
        self.stack.retain(|&c| c != id);
        self.stack.insert(0, id);
    }

    #[cfg(test)]
    pub fn assert_invariants(&self) {
        let mut c: Vec<Xid> = self.clients.clone();
        let mut s: Vec<Xid> = self.stack.clone();
        c.sort();
        s.sort();
        assert_eq!(c, s, "clients and stack must contain identical sets");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_and_detach_keep_lists_in_sync() {
        let mut m = Monitor::new(0, Rect::new(0, 0, 1920, 1080));
        m.attach(Xid(1));
        m.attach_stack(Xid(1));
        m.attach(Xid(2));
        m.attach_stack(Xid(2));
        m.assert_invariants();
        assert_eq!(m.clients, vec![Xid(2), Xid(1)]);

        m.detach(Xid(2));
        m.assert_invariants();
        assert_eq!(m.stack_head(), Some(Xid(1)));
    }
}
