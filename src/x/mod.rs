//! Abstraction over the window-system transport (§1 OUT OF SCOPE: the
//! transport itself is an external collaborator, this module fixes its
//! interface only).
//!
//! [`XConn`] is deliberately narrow: every method is a single request (or a
//! small fixed batch of them) against the X server. The state machine in
//! [`crate::state`], [`crate::event::handle`] and [`crate::focus`] is what
//! decides *when* to call these; this trait just gives it somewhere to call
//! into that isn't tied to a specific X11 binding crate.
pub mod atom;
pub mod event;
pub mod property;

#[cfg(feature = "x11rb-backend")]
pub mod x11rb_backend;

#[cfg(test)]
pub mod mock;

pub use atom::{Atom, WmState};
pub use event::XEvent;
pub use property::{Prop, WmHints};

use crate::bindings::{KeyCode, MouseState};
use crate::geometry::{Point, Rect};
use crate::model::Xid;
use crate::Result;

/// Where a window should be placed in global stacking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackMode {
    Above(Xid),
    Below(Xid),
    Top,
    Bottom,
}

/// The subset of window configuration the core ever needs to push down to
/// the server in one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    pub r: Rect,
    pub border_width: u32,
    pub stack_mode: Option<StackMode>,
}

/// A handle onto a live X11 connection.
///
/// Implementors are expected to be single-threaded and are always accessed
/// from the one event-loop thread (§5): nothing here needs to be `Send` or
/// `Sync`.
pub trait XConn {
    /// The window manager's root window.
    fn root(&self) -> Xid;

    /// Query the X server (Xinerama/RandR) for the rectangle of each
    /// currently attached physical output.
    fn screen_details(&self) -> Result<Vec<Rect>>;

    /// The root window's `(sw, sh)` dimensions.
    fn screen_size(&self) -> Result<(u32, u32)>;

    fn cursor_position(&self) -> Result<Point>;

    /// Attempt to become the window manager by selecting for
    /// `SubstructureRedirectMask` on the root window. Fails with
    /// [`crate::Error::AnotherWmRunning`] if a WM already holds it.
    fn take_wm_ownership(&self) -> Result<()>;

    /// Grab the configured keyboard and pointer bindings on the root
    /// window. Called at startup and again on `MappingNotify` for a
    /// keyboard-layout change.
    fn grab_keys_and_buttons(&self, keys: &[KeyCode], buttons: &[MouseState]) -> Result<()>;

    fn grab_pointer_for_motion(&self) -> Result<()>;
    fn grab_pointer_for_resize(&self) -> Result<()>;
    fn ungrab_pointer(&self) -> Result<()>;

    /// Block until the next event is available.
    fn next_event(&self) -> Result<XEvent>;

    /// Non-blocking poll used by the interactive move/resize pump, which
    /// must also keep servicing Expose/MapRequest/ConfigureRequest while
    /// the pointer grab is held (§4.5).
    fn poll_event(&self) -> Result<Option<XEvent>>;

    fn flush(&self);

    /// Block until all previously queued requests have been processed by
    /// the server. Used at the takeover check, at unmanage's restore step,
    /// and after a restack, per the ordering guarantees in §5.
    fn sync(&self) -> Result<()>;

    fn intern_atom(&self, name: &str) -> Result<Xid>;
    fn atom_name(&self, atom: Xid) -> Result<String>;

    fn client_geometry(&self, client: Xid) -> Result<Rect>;
    fn existing_clients(&self) -> Result<Vec<Xid>>;
    fn window_class_and_instance(&self, client: Xid) -> Result<(String, String)>;

    fn map(&self, client: Xid) -> Result<()>;
    fn unmap(&self, client: Xid) -> Result<()>;
    fn destroy(&self, client: Xid) -> Result<()>;
    fn configure(&self, client: Xid, cfg: WindowConfig) -> Result<()>;

    /// Send a synthetic `ConfigureNotify` reflecting the client's current
    /// geometry back to it, used to deny a tiled client's `ConfigureRequest`
    /// (§4.5) without actually moving it.
    fn send_configure_notify(&self, client: Xid, r: Rect, border_width: u32) -> Result<()>;

    fn set_input_focus(&self, client: Xid) -> Result<()>;
    fn set_border_color(&self, client: Xid, pixel: u32) -> Result<()>;
    fn select_for_client_events(&self, client: Xid) -> Result<()>;
    fn select_for_unmap_events_only(&self, client: Xid) -> Result<()>;

    fn get_prop(&self, client: Xid, name: &str) -> Result<Option<Prop>>;
    fn set_prop(&self, client: Xid, name: &str, value: Prop) -> Result<()>;
    fn delete_prop(&self, client: Xid, name: &str) -> Result<()>;
    fn get_wm_state(&self, client: Xid) -> Result<Option<WmState>>;
    fn set_wm_state(&self, client: Xid, state: WmState) -> Result<()>;
    fn get_transient_for(&self, client: Xid) -> Result<Option<Xid>>;

    /// Send a `WM_PROTOCOLS` client message (used for `WM_DELETE_WINDOW` /
    /// `WM_TAKE_FOCUS`).
    fn send_protocol_message(&self, client: Xid, protocol: &str) -> Result<()>;
    /// `true` iff the client's `WM_PROTOCOLS` list advertises `protocol`.
    fn supports_protocol(&self, client: Xid, protocol: &str) -> Result<bool>;

    fn warp_pointer(&self, client: Xid, x: i32, y: i32) -> Result<()>;

    /// Derive the numlock modifier mask from the server's current modifier
    /// mapping, used to build `CLEANMASK` for binding comparisons.
    fn numlock_mask(&self) -> Result<u16>;

    /// The raw file descriptor of the underlying connection, if the backend
    /// has one to hand over. `spawn` closes this in the child process so
    /// spawned programs don't inherit our X connection.
    fn connection_fd(&self) -> Option<std::os::unix::io::RawFd>;

    /// The window used to advertise `_NET_SUPPORTING_WM_CHECK`/`_NET_WM_NAME`.
    /// Created once by the backend's own constructor (it is never torn down
    /// or recreated over the life of the connection), unlike a monitor's bar
    /// window which comes and goes with `updategeom`.
    fn support_window(&self) -> Xid;

    /// Resolve a keysym name (e.g. `"q"`, `"Return"`) to the keycode the
    /// server currently has it mapped to.
    fn keycode_from_keysym_name(&self, name: &str) -> Result<u8>;

    /// Discard any `EnterNotify` events already sitting in the queue without
    /// blocking. Called at the end of [`crate::focus::restack`] (§4.4) so a
    /// restack's own window moves don't generate a spurious pointer-crossing
    /// focus change once the event loop gets back around to them.
    fn drain_enter_notify(&self) -> Result<()>;
}

/// Default, backend-independent helpers built on top of [`XConn`].
pub trait XConnExt: XConn + Sized {
    /// Re-stack an ordered list of windows, each placed immediately above
    /// the previous one (§5: the arranger runs, then `restack`).
    fn restack<'a, I>(&self, mut ids: I) -> Result<()>
    where
        I: Iterator<Item = &'a Xid>,
    {
        let mut previous = match ids.next() {
            Some(id) => *id,
            None => return Ok(()),
        };

        for &id in ids {
            self.configure(
                id,
                WindowConfig {
                    r: self.client_geometry(id)?,
                    border_width: 0,
                    stack_mode: Some(StackMode::Below(previous)),
                },
            )?;
            previous = id;
        }

        Ok(())
    }

    /// Send `WM_DELETE_WINDOW` if supported, otherwise fall back to a hard
    /// `destroy` (§4.6 `unmanage`/client-close path).
    fn close_client_gracefully(&self, client: Xid) -> Result<()> {
        if self.supports_protocol(client, Atom::WmDeleteWindow.as_ref())? {
            self.send_protocol_message(client, Atom::WmDeleteWindow.as_ref())
        } else {
            self.destroy(client)
        }
    }

    /// Warp the pointer to the center of `client`'s current geometry.
    fn warp_pointer_to_center(&self, client: Xid) -> Result<()> {
        let r = self.client_geometry(client)?;
        self.warp_pointer(client, r.w as i32 / 2, r.h as i32 / 2)
    }
}

impl<T> XConnExt for T where T: XConn {}
