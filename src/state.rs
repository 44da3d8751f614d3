//! The Global Model (§3): everything that is not itself a [`crate::model::Client`]
//! or [`crate::model::Monitor`] but is needed to run the event loop.
use std::collections::HashMap;

use crate::bindings::{KeyCode, MouseState};
use crate::config::Config;
use crate::model::{Client, Monitor, Xid};
use crate::x::{Atom, XConn};
use crate::Result;

/// Fixed upper bound on the status text buffer, matching the reference
/// architecture's `char stext[256]`.
pub const STATUS_TEXT_CAP: usize = 256;

/// The window manager's full runtime state, generic over the active
/// [`XConn`] backend.
pub struct WindowManager<X: XConn> {
    pub x: X,
    pub config: Config<X>,

    pub clients: HashMap<Xid, Client>,
    pub monitors: Vec<Monitor>,
    pub sel_mon: usize,
    /// Monitor index the pointer was last known to be over; used to detect
    /// cross-monitor motion on the root window (§4.5).
    pub motion_mon: usize,

    pub screen_w: u32,
    pub screen_h: u32,
    pub bar_height: u32,
    pub lrpad: u32,

    pub atoms: HashMap<Atom, Xid>,
    pub numlock_mask: u16,
    pub status_text: String,

    pub running: bool,
    pub support_window: Option<Xid>,

    /// The cells drawn by the last [`crate::bar::redraw`] call for each
    /// monitor, kept around so a `ButtonPress` on a bar window can be
    /// resolved back to a click target without recomputing layout.
    pub bar_cells: Vec<Vec<crate::bar::Cell>>,

    /// Keybindings resolved to concrete keycodes against the current
    /// keyboard mapping, kept around so [`WindowManager::regrab`] can
    /// re-issue the grab without re-walking `config.keys`.
    pub resolved_keys: Vec<KeyCode>,
    pub resolved_buttons: Vec<MouseState>,
}

impl<X: XConn> WindowManager<X> {
    /// Build a fresh, pre-startup [`WindowManager`]: no monitors, no
    /// clients, nothing interned or grabbed yet. [`crate::startup::setup`]
    /// does the rest.
    pub fn new(x: X, config: Config<X>) -> Self {
        WindowManager {
            x,
            config,
            clients: HashMap::new(),
            monitors: Vec::new(),
            sel_mon: 0,
            motion_mon: 0,
            screen_w: 0,
            screen_h: 0,
            bar_height: 0,
            lrpad: 0,
            atoms: HashMap::new(),
            numlock_mask: 0,
            status_text: String::new(),
            running: false,
            support_window: None,
            bar_cells: Vec::new(),
            resolved_keys: Vec::new(),
            resolved_buttons: Vec::new(),
        }
    }

    pub fn selected_monitor(&self) -> &Monitor {
        &self.monitors[self.sel_mon]
    }

    pub fn selected_monitor_mut(&mut self) -> &mut Monitor {
        &mut self.monitors[self.sel_mon]
    }

    pub fn client(&self, id: Xid) -> Option<&Client> {
        self.clients.get(&id)
    }

    pub fn client_mut(&mut self, id: Xid) -> Option<&mut Client> {
        self.clients.get_mut(&id)
    }

    /// The selected client on the given monitor: the head of its focus
    /// stack restricted to clients visible under its current tagset.
    pub fn selected_client_on(&self, mon: usize) -> Option<Xid> {
        let m = &self.monitors[mon];
        let tagset = m.selected_tags();
        m.stack
            .iter()
            .find(|&&id| {
                self.clients
                    .get(&id)
                    .map(|c| c.is_visible_on(tagset))
                    .unwrap_or(false)
            })
            .copied()
    }

    pub fn selected_client(&self) -> Option<Xid> {
        self.selected_client_on(self.sel_mon)
    }

    pub fn set_status_text(&mut self, text: String) {
        self.status_text = if text.len() > STATUS_TEXT_CAP {
            text.chars().take(STATUS_TEXT_CAP).collect()
        } else {
            text
        };
    }

    pub fn atom(&self, a: Atom) -> Xid {
        self.atoms
            .get(&a)
            .copied()
            .unwrap_or_else(|| panic!("atom {a:?} was not interned at startup"))
    }

    /// Quit the run loop. Cooperative: the main loop checks `running` once
    /// per event, it is not preempted (§5).
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Rebuild the root and client key/button grabs, e.g. after a
    /// `MappingNotify` reports a keyboard layout change.
    pub fn regrab(&self) -> Result<()> {
        self.x
            .grab_keys_and_buttons(&self.resolved_keys, &self.resolved_buttons)
    }
}
