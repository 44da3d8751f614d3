//! The `x11rb`-backed [`XConn`] + [`Drw`] implementation (§1 backend seam).
//!
//! Unlike the split connection used elsewhere in the x11rb ecosystem (a
//! request-only connection plus a separate drawing context), [`state::WindowManager`]
//! needs one concrete type implementing both traits, so [`X11rbConn`] owns
//! the connection, the support window, and a single graphics context and
//! core font used for bar drawing.
//!
//! Everything here is a thin wrapper: one request (or a small fixed batch)
//! per trait method. Reply errors convert into [`crate::Error`] through the
//! `From` impls in [`crate::error`].
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::os::unix::io::{AsRawFd, RawFd};
use std::str::FromStr;

use strum::IntoEnumIterator;
use tracing::warn;

use x11rb::connection::Connection;
use x11rb::properties::WmClass;
use x11rb::protocol::randr::{self, ConnectionExt as _};
use x11rb::protocol::xproto::{
    AtomEnum, ButtonIndex, Char2b, ChangeGCAux, ChangeWindowAttributesAux, ClientMessageEvent,
    ConfigWindow, ConfigureNotifyEvent, ConfigureWindowAux, ConnectionExt as _, CreateGCAux,
    CreateWindowAux, EventMask, Font, Gcontext, GrabMode, InputFocus, ModMask, PropMode,
    Rectangle, StackMode as XStackMode, Window, WindowClass, CLIENT_MESSAGE_EVENT,
    CONFIGURE_NOTIFY_EVENT,
};
use x11rb::protocol::Event as X11Event;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;
use x11rb::{CURRENT_TIME, NONE};

use crate::bar::Drw;
use crate::bindings::{KeyCode, MouseButton, MouseEvent, MouseState, ModifierKey};
use crate::color::{Color, ColorScheme};
use crate::geometry::{Point, Rect, SizeHints};
use crate::model::Xid;
use crate::x::event::{ClientMessage, ConfigureEvent, ExposeEvent, PointerChange, PropertyEvent};
use crate::x::{self, Atom, Prop, WindowConfig, WmHints, XConn, XEvent};
use crate::{Error, Result};

/// `XK_Num_Lock`, per keysymdef.h. Used to derive the numlock modifier bit
/// from the server's current modifier mapping.
const XK_NUM_LOCK: u32 = 0xff7f;

/// A live connection to an X server plus the single graphics context and
/// core font used to paint every monitor's bar.
pub struct X11rbConn {
    conn: RustConnection,
    root: Window,
    screen_num: usize,
    support_win: Window,
    atoms: RefCell<HashMap<Atom, u32>>,
    gc: Gcontext,
    font: Font,
    font_ascent: i16,
    font_descent: i16,
    /// Cached numlock modifier bit, refreshed every time [`XConn::numlock_mask`]
    /// runs (at startup, and again on every `regrab` after `MappingNotify`).
    numlock: Cell<u16>,
    /// Events pulled off the wire by [`XConn::drain_enter_notify`] that
    /// turned out not to be `EnterNotify`: `next_event`/`poll_event` drain
    /// this before touching the connection, so nothing is lost.
    pending: RefCell<VecDeque<XEvent>>,
}

impl X11rbConn {
    /// Connect to the display named by `$DISPLAY`, create the support
    /// window and load `font_name` as the bar's core font.
    pub fn new(font_name: &str) -> Result<Self> {
        let (conn, screen_num) = RustConnection::connect(None)?;
        let root = conn.setup().roots[screen_num].root;

        conn.prefetch_extension_information(randr::X11_EXTENSION_NAME)?;
        let mask = randr::NotifyMask::OUTPUT_CHANGE
            | randr::NotifyMask::CRTC_CHANGE
            | randr::NotifyMask::SCREEN_CHANGE;
        conn.randr_select_input(root, mask)?;

        let atom_cookies = Atom::iter()
            .map(|a| Ok((a, conn.intern_atom(false, a.as_ref().as_bytes())?)))
            .collect::<Result<Vec<_>>>()?;
        let mut atoms = HashMap::new();
        for (a, cookie) in atom_cookies {
            atoms.insert(a, cookie.reply()?.atom);
        }

        let support_win = conn.generate_id()?;
        let caux = CreateWindowAux::new().override_redirect(1);
        conn.create_window(
            x11rb::COPY_DEPTH_FROM_PARENT,
            support_win,
            root,
            -1,
            -1,
            1,
            1,
            0,
            WindowClass::INPUT_OUTPUT,
            x11rb::COPY_FROM_PARENT,
            &caux,
        )?;
        conn.map_window(support_win)?;

        let gc = conn.generate_id()?;
        conn.create_gc(gc, root, &CreateGCAux::new())?;

        let font = conn.generate_id()?;
        conn.open_font(font, font_name.as_bytes())?;
        let font_info = conn.query_font(font)?.reply()?;
        conn.change_gc(gc, &ChangeGCAux::new().font(font))?;

        conn.flush()?;

        Ok(Self {
            conn,
            root,
            screen_num,
            support_win,
            atoms: RefCell::new(atoms),
            gc,
            font,
            font_ascent: font_info.font_ascent,
            font_descent: font_info.font_descent,
            numlock: Cell::new(0),
            pending: RefCell::new(VecDeque::new()),
        })
    }

    fn known_atom(&self, atom: Atom) -> u32 {
        *self.atoms.borrow().get(&atom).unwrap()
    }

    /// Reverse-lookup an atom id against our interned cache first, only
    /// falling back to a live `GetAtomName` round trip for atoms we never
    /// interned ourselves (e.g. a client's dynamically created property).
    fn lookup_atom_name(&self, atom: u32) -> Option<String> {
        if let Some((a, _)) = self.atoms.borrow().iter().find(|(_, &v)| v == atom) {
            return Some(a.as_ref().to_string());
        }
        self.conn
            .get_atom_name(atom)
            .ok()?
            .reply()
            .ok()
            .and_then(|r| String::from_utf8(r.name).ok())
    }

    fn convert_event(&self, event: X11Event) -> Result<Option<XEvent>> {
        let numlock = self.numlock.get();
        Ok(match event {
            X11Event::ButtonPress(ev) => to_mouse_state(ev.detail, ev.state).map(|s| {
                XEvent::ButtonPress(MouseEvent {
                    id: Xid(ev.event),
                    abs: Point::new(ev.root_x as i32, ev.root_y as i32),
                    relative: Point::new(ev.event_x as i32, ev.event_y as i32),
                    state: s.button,
                })
            }),
            X11Event::ButtonRelease(ev) => Some(XEvent::ButtonRelease(Xid(ev.event))),
            X11Event::MotionNotify(ev) => {
                Some(XEvent::MotionNotify(Point::new(ev.root_x as i32, ev.root_y as i32)))
            }
            X11Event::KeyPress(ev) => {
                let code = KeyCode { mask: ev.state, code: ev.detail }.ignoring_modifier(numlock);
                Some(XEvent::KeyPress(code))
            }
            X11Event::MapRequest(ev) => {
                let attr = self.conn.get_window_attributes(ev.window)?.reply()?;
                if attr.override_redirect {
                    None
                } else {
                    Some(XEvent::MapRequest(Xid(ev.window)))
                }
            }
            X11Event::EnterNotify(ev) => Some(XEvent::Enter(PointerChange {
                id: Xid(ev.event),
                abs: Point::new(ev.root_x as i32, ev.root_y as i32),
                same_screen: ev.same_screen_focus & 1 != 0,
                detail_inferior_or_hint: u8::from(ev.detail) == 4 || u8::from(ev.mode) != 0,
            })),
            X11Event::LeaveNotify(ev) => Some(XEvent::Leave(PointerChange {
                id: Xid(ev.event),
                abs: Point::new(ev.root_x as i32, ev.root_y as i32),
                same_screen: ev.same_screen_focus & 1 != 0,
                detail_inferior_or_hint: u8::from(ev.detail) == 4 || u8::from(ev.mode) != 0,
            })),
            X11Event::DestroyNotify(ev) => Some(XEvent::Destroy(Xid(ev.window))),
            X11Event::UnmapNotify(ev) => {
                Some(XEvent::UnmapNotify(Xid(ev.window), ev.event == ev.window))
            }
            X11Event::Expose(ev) => {
                Some(XEvent::Expose(ExposeEvent { id: Xid(ev.window), count: ev.count as usize }))
            }
            X11Event::FocusIn(ev) => Some(XEvent::FocusIn(Xid(ev.event))),
            X11Event::MappingNotify(_) => Some(XEvent::MappingNotify),
            X11Event::RandrScreenChangeNotify(_) => Some(XEvent::ScreenChange),
            X11Event::ConfigureNotify(ev) => Some(XEvent::ConfigureNotify(ConfigureEvent {
                id: Xid(ev.window),
                r: Rect::new(ev.x as i32, ev.y as i32, ev.width as u32, ev.height as u32),
                border_only: false,
                is_root: ev.window == self.root,
            })),
            X11Event::ConfigureRequest(ev) => {
                let resizing = ev.value_mask & u16::from(ConfigWindow::WIDTH | ConfigWindow::HEIGHT) != 0;
                Some(XEvent::ConfigureRequest(ConfigureEvent {
                    id: Xid(ev.window),
                    r: Rect::new(ev.x as i32, ev.y as i32, ev.width as u32, ev.height as u32),
                    border_only: !resizing,
                    is_root: ev.window == self.root,
                }))
            }
            X11Event::ClientMessage(ev) => self.lookup_atom_name(ev.type_).map(|name| {
                let raw = ev.data.as_data32();
                let mut data = [0u32; 5];
                data.copy_from_slice(&raw[..5]);
                XEvent::ClientMessage(ClientMessage { id: Xid(ev.window), dtype: name, data })
            }),
            X11Event::PropertyNotify(ev) => {
                let is_root = ev.window == self.root;
                let interesting = !is_root
                    || ev.atom == self.known_atom(Atom::WmName)
                    || ev.atom == self.known_atom(Atom::NetWmName);
                if interesting {
                    self.lookup_atom_name(ev.atom).map(|name| {
                        XEvent::PropertyNotify(PropertyEvent { id: Xid(ev.window), atom: name, is_root })
                    })
                } else {
                    None
                }
            }
            _ => None,
        })
    }

    fn get_wm_normal_hints(&self, client: Xid, atom: u32) -> Result<Option<Prop>> {
        let reply = self
            .conn
            .get_property(false, client.0, atom, AtomEnum::WM_SIZE_HINTS, 0, 18)?
            .reply()?;
        let Some(values) = reply.value32() else { return Ok(None) };
        let values: Vec<u32> = values.collect();
        if values.len() < 18 {
            return Ok(None);
        }
        let flags = values[0];
        let mut hints = SizeHints::default();
        if flags & (1 << 4) != 0 {
            hints.min_w = values[5];
            hints.min_h = values[6];
        }
        if flags & (1 << 5) != 0 {
            hints.max_w = values[7];
            hints.max_h = values[8];
        }
        if flags & (1 << 6) != 0 {
            hints.inc_w = values[9];
            hints.inc_h = values[10];
        }
        if flags & (1 << 7) != 0 {
            hints.min_aspect = Some((values[11], values[12]));
            hints.max_aspect = Some((values[13], values[14]));
        }
        if flags & (1 << 8) != 0 {
            hints.base_w = values[15];
            hints.base_h = values[16];
        }
        Ok(Some(Prop::WmNormalHints(hints)))
    }

    fn get_wm_hints(&self, client: Xid, atom: u32) -> Result<Option<Prop>> {
        let reply = self.conn.get_property(false, client.0, atom, AtomEnum::WM_HINTS, 0, 9)?.reply()?;
        let Some(values) = reply.value32() else { return Ok(None) };
        let values: Vec<u32> = values.collect();
        if values.is_empty() {
            return Ok(None);
        }
        let flags = values[0];
        let input = if flags & (1 << 0) != 0 {
            Some(values.get(1).copied().unwrap_or(0) != 0)
        } else {
            None
        };
        let urgent = flags & (1 << 8) != 0;
        Ok(Some(Prop::WmHints(WmHints { urgent, input })))
    }

    fn get_generic_prop(&self, client: Xid, atom: u32) -> Result<Option<Prop>> {
        let reply = self.conn.get_property(false, client.0, atom, AtomEnum::ANY, 0, 1024)?.reply()?;
        if reply.type_ == 0 {
            return Ok(None);
        }
        if reply.type_ == u32::from(AtomEnum::STRING) || reply.type_ == self.known_atom(Atom::Utf8String) {
            let text = String::from_utf8_lossy(&reply.value).into_owned();
            let parts = text.split('\0').filter(|s| !s.is_empty()).map(String::from).collect();
            return Ok(Some(Prop::UTF8String(parts)));
        }
        if reply.type_ == u32::from(AtomEnum::ATOM) {
            let names = reply
                .value32()
                .into_iter()
                .flatten()
                .filter_map(|a| self.lookup_atom_name(a))
                .collect();
            return Ok(Some(Prop::Atom(names)));
        }
        if reply.type_ == u32::from(AtomEnum::WINDOW) {
            let ids = reply.value32().into_iter().flatten().map(Xid).collect();
            return Ok(Some(Prop::Window(ids)));
        }
        if reply.type_ == u32::from(AtomEnum::CARDINAL) {
            let vals = reply.value32().into_iter().flatten().collect();
            return Ok(Some(Prop::Cardinal(vals)));
        }
        Ok(None)
    }
}

impl XConn for X11rbConn {
    fn root(&self) -> Xid {
        Xid(self.root)
    }

    fn screen_details(&self) -> Result<Vec<Rect>> {
        let resources = self.conn.randr_get_screen_resources(self.root)?.reply()?;
        let cookies = resources
            .crtcs
            .iter()
            .map(|&c| self.conn.randr_get_crtc_info(c, 0))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let rects = cookies
            .into_iter()
            .flat_map(|c| c.reply().ok())
            .filter(|r| r.width > 0 && r.height > 0)
            .map(|r| Rect::new(r.x as i32, r.y as i32, r.width as u32, r.height as u32))
            .collect();
        Ok(rects)
    }

    fn screen_size(&self) -> Result<(u32, u32)> {
        let screen = &self.conn.setup().roots[self.screen_num];
        Ok((screen.width_in_pixels as u32, screen.height_in_pixels as u32))
    }

    fn cursor_position(&self) -> Result<Point> {
        let reply = self.conn.query_pointer(self.root)?.reply()?;
        Ok(Point::new(reply.root_x as i32, reply.root_y as i32))
    }

    fn take_wm_ownership(&self) -> Result<()> {
        let mask = EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY;
        let aux = ChangeWindowAttributesAux::new().event_mask(mask);
        match self.conn.change_window_attributes(self.root, &aux)?.check() {
            Ok(()) => Ok(()),
            Err(x11rb::errors::ReplyError::X11Error(e))
                if e.error_kind == x11rb::protocol::ErrorKind::Access =>
            {
                Err(Error::AnotherWmRunning)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn grab_keys_and_buttons(&self, keys: &[KeyCode], buttons: &[MouseState]) -> Result<()> {
        self.conn.ungrab_key(0, self.root, ModMask::ANY)?;
        self.conn.ungrab_button(ButtonIndex::ANY, self.root, ModMask::ANY)?;

        let numlock = self.numlock_mask()?;
        let lock_variants = [0u16, u16::from(ModMask::LOCK), numlock, numlock | u16::from(ModMask::LOCK)];

        for key in keys {
            for &extra in &lock_variants {
                self.conn.grab_key(
                    false,
                    self.root,
                    key.mask | extra,
                    key.code,
                    GrabMode::ASYNC,
                    GrabMode::ASYNC,
                )?;
            }
        }

        let button_mask = u32::from(EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE | EventMask::BUTTON_MOTION) as u16;
        for state in buttons {
            let mods = crate::bindings::modifiers_mask(&state.modifiers);
            for &extra in &lock_variants {
                self.conn.grab_button(
                    false,
                    self.root,
                    button_mask,
                    GrabMode::ASYNC,
                    GrabMode::ASYNC,
                    NONE,
                    NONE,
                    u8::from(state.button).into(),
                    mods | extra,
                )?;
            }
        }

        let aux = ChangeWindowAttributesAux::new().event_mask(
            EventMask::PROPERTY_CHANGE
                | EventMask::SUBSTRUCTURE_REDIRECT
                | EventMask::SUBSTRUCTURE_NOTIFY
                | EventMask::BUTTON_MOTION,
        );
        self.conn.change_window_attributes(self.root, &aux)?;
        self.conn.flush()?;
        Ok(())
    }

    fn grab_pointer_for_motion(&self) -> Result<()> {
        let mask = u32::from(EventMask::POINTER_MOTION | EventMask::BUTTON_RELEASE) as u16;
        self.conn
            .grab_pointer(false, self.root, mask, GrabMode::ASYNC, GrabMode::ASYNC, NONE, NONE, CURRENT_TIME)?
            .reply()?;
        Ok(())
    }

    fn grab_pointer_for_resize(&self) -> Result<()> {
        // Same mask as a move: we don't track a distinct resize cursor
        // resource, only the kind of pump driving the pointer events.
        self.grab_pointer_for_motion()
    }

    fn ungrab_pointer(&self) -> Result<()> {
        self.conn.ungrab_pointer(CURRENT_TIME)?;
        Ok(())
    }

    fn next_event(&self) -> Result<XEvent> {
        if let Some(ev) = self.pending.borrow_mut().pop_front() {
            return Ok(ev);
        }
        loop {
            let event = self.conn.wait_for_event()?;
            if let Some(ev) = self.convert_event(event)? {
                return Ok(ev);
            }
        }
    }

    fn poll_event(&self) -> Result<Option<XEvent>> {
        if let Some(ev) = self.pending.borrow_mut().pop_front() {
            return Ok(Some(ev));
        }
        match self.conn.poll_for_event()? {
            Some(event) => self.convert_event(event),
            None => Ok(None),
        }
    }

    /// Discard every currently-queued `EnterNotify`, the non-blocking
    /// equivalent of dwm's `while (XCheckMaskEvent(dpy, EnterWindowMask,
    /// &ev))`. Scans the whole queue (already-pending events plus whatever is
    /// waiting on the socket) and keeps everything else, in order, for
    /// `next_event`/`poll_event` to see afterwards.
    fn drain_enter_notify(&self) -> Result<()> {
        let mut kept: VecDeque<XEvent> = self
            .pending
            .borrow_mut()
            .drain(..)
            .filter(|ev| !matches!(ev, XEvent::Enter(_)))
            .collect();

        while let Some(raw) = self.conn.poll_for_event()? {
            if let Some(ev) = self.convert_event(raw)? {
                if !matches!(ev, XEvent::Enter(_)) {
                    kept.push_back(ev);
                }
            }
        }

        *self.pending.borrow_mut() = kept;
        Ok(())
    }

    fn flush(&self) {
        if let Err(e) = self.conn.flush() {
            warn!(%e, "flush failed");
        }
    }

    fn sync(&self) -> Result<()> {
        self.conn.get_input_focus()?.reply()?;
        Ok(())
    }

    fn intern_atom(&self, name: &str) -> Result<Xid> {
        if let Ok(known) = Atom::from_str(name) {
            if let Some(&id) = self.atoms.borrow().get(&known) {
                return Ok(Xid(id));
            }
        }
        let id = self.conn.intern_atom(false, name.as_bytes())?.reply()?.atom;
        Ok(Xid(id))
    }

    fn atom_name(&self, atom: Xid) -> Result<String> {
        self.lookup_atom_name(atom.0).ok_or(Error::MissingProp("<atom name>", atom))
    }

    fn client_geometry(&self, client: Xid) -> Result<Rect> {
        let geo = self.conn.get_geometry(client.0)?.reply()?;
        Ok(Rect::new(geo.x as i32, geo.y as i32, geo.width as u32, geo.height as u32))
    }

    fn existing_clients(&self) -> Result<Vec<Xid>> {
        let tree = self.conn.query_tree(self.root)?.reply()?;
        let mut out = Vec::new();
        for w in tree.children {
            let attr = self.conn.get_window_attributes(w)?.reply()?;
            if attr.override_redirect || attr.map_state != x11rb::protocol::xproto::MapState::VIEWABLE {
                continue;
            }
            out.push(Xid(w));
        }
        Ok(out)
    }

    fn window_class_and_instance(&self, client: Xid) -> Result<(String, String)> {
        match WmClass::get(&self.conn, client.0)?.reply_unchecked()? {
            Some(c) => {
                let class = String::from_utf8_lossy(c.class()).into_owned();
                let instance = String::from_utf8_lossy(c.instance()).into_owned();
                Ok((class, instance))
            }
            None => Ok((String::new(), String::new())),
        }
    }

    fn map(&self, client: Xid) -> Result<()> {
        self.conn.map_window(client.0)?;
        Ok(())
    }

    fn unmap(&self, client: Xid) -> Result<()> {
        self.conn.unmap_window(client.0)?;
        Ok(())
    }

    fn destroy(&self, client: Xid) -> Result<()> {
        self.conn.destroy_window(client.0)?;
        Ok(())
    }

    fn configure(&self, client: Xid, cfg: WindowConfig) -> Result<()> {
        let mut aux = ConfigureWindowAux::new()
            .x(cfg.r.x)
            .y(cfg.r.y)
            .width(cfg.r.w)
            .height(cfg.r.h)
            .border_width(cfg.border_width);
        if let Some(mode) = cfg.stack_mode {
            aux = match mode {
                x::StackMode::Above(sibling) => aux.sibling(sibling.0).stack_mode(XStackMode::ABOVE),
                x::StackMode::Below(sibling) => aux.sibling(sibling.0).stack_mode(XStackMode::BELOW),
                x::StackMode::Top => aux.stack_mode(XStackMode::ABOVE),
                x::StackMode::Bottom => aux.stack_mode(XStackMode::BELOW),
            };
        }
        self.conn.configure_window(client.0, &aux)?;
        Ok(())
    }

    fn send_configure_notify(&self, client: Xid, r: Rect, border_width: u32) -> Result<()> {
        let event = ConfigureNotifyEvent {
            response_type: CONFIGURE_NOTIFY_EVENT,
            sequence: 0,
            event: client.0,
            window: client.0,
            above_sibling: NONE,
            x: r.x as i16,
            y: r.y as i16,
            width: r.w as u16,
            height: r.h as u16,
            border_width: border_width as u16,
            override_redirect: false,
        };
        self.conn.send_event(false, client.0, EventMask::STRUCTURE_NOTIFY, &event)?;
        Ok(())
    }

    fn set_input_focus(&self, client: Xid) -> Result<()> {
        self.conn.set_input_focus(InputFocus::POINTER_ROOT, client.0, CURRENT_TIME)?;
        let atom = self.known_atom(Atom::NetActiveWindow);
        self.conn.change_property32(PropMode::REPLACE, self.root, atom, AtomEnum::WINDOW, &[client.0])?;
        Ok(())
    }

    fn set_border_color(&self, client: Xid, pixel: u32) -> Result<()> {
        let aux = ChangeWindowAttributesAux::new().border_pixel(pixel);
        self.conn.change_window_attributes(client.0, &aux)?;
        Ok(())
    }

    fn select_for_client_events(&self, client: Xid) -> Result<()> {
        let mask = EventMask::ENTER_WINDOW
            | EventMask::LEAVE_WINDOW
            | EventMask::PROPERTY_CHANGE
            | EventMask::STRUCTURE_NOTIFY
            | EventMask::FOCUS_CHANGE;
        let aux = ChangeWindowAttributesAux::new().event_mask(mask);
        self.conn.change_window_attributes(client.0, &aux)?;
        Ok(())
    }

    fn select_for_unmap_events_only(&self, client: Xid) -> Result<()> {
        let aux = ChangeWindowAttributesAux::new().event_mask(EventMask::STRUCTURE_NOTIFY);
        self.conn.change_window_attributes(client.0, &aux)?;
        Ok(())
    }

    fn get_prop(&self, client: Xid, name: &str) -> Result<Option<Prop>> {
        let atom = self.intern_atom(name)?.0;
        match Atom::from_str(name) {
            Ok(Atom::WmNormalHints) => self.get_wm_normal_hints(client, atom),
            Ok(Atom::WmHints) => self.get_wm_hints(client, atom),
            _ => self.get_generic_prop(client, atom),
        }
    }

    fn set_prop(&self, client: Xid, name: &str, value: Prop) -> Result<()> {
        let atom = self.intern_atom(name)?.0;
        match value {
            Prop::Atom(names) => {
                let mut ids = Vec::with_capacity(names.len());
                for n in &names {
                    ids.push(self.intern_atom(n)?.0);
                }
                self.conn.change_property32(PropMode::REPLACE, client.0, atom, AtomEnum::ATOM, &ids)?;
            }
            Prop::Cardinal(vals) => {
                self.conn.change_property32(PropMode::REPLACE, client.0, atom, AtomEnum::CARDINAL, &vals)?;
            }
            Prop::UTF8String(strs) => {
                let joined = strs.join("\0");
                let ty = self.known_atom(Atom::Utf8String);
                self.conn.change_property8(PropMode::REPLACE, client.0, atom, ty, joined.as_bytes())?;
            }
            Prop::Window(ids) => {
                let raw: Vec<u32> = ids.iter().map(|x| x.0).collect();
                self.conn.change_property32(PropMode::REPLACE, client.0, atom, AtomEnum::WINDOW, &raw)?;
            }
            Prop::WmHints(hints) => {
                let mut v = [0u32; 9];
                if let Some(input) = hints.input {
                    v[0] |= 1 << 0;
                    v[1] = input as u32;
                }
                if hints.urgent {
                    v[0] |= 1 << 8;
                }
                self.conn.change_property32(PropMode::REPLACE, client.0, atom, AtomEnum::WM_HINTS, &v)?;
            }
            Prop::WmNormalHints(hints) => {
                let mut v = [0u32; 18];
                if hints.min_w > 0 || hints.min_h > 0 {
                    v[0] |= 1 << 4;
                    v[5] = hints.min_w;
                    v[6] = hints.min_h;
                }
                if hints.max_w > 0 || hints.max_h > 0 {
                    v[0] |= 1 << 5;
                    v[7] = hints.max_w;
                    v[8] = hints.max_h;
                }
                if hints.inc_w > 0 || hints.inc_h > 0 {
                    v[0] |= 1 << 6;
                    v[9] = hints.inc_w;
                    v[10] = hints.inc_h;
                }
                if let (Some(min_a), Some(max_a)) = (hints.min_aspect, hints.max_aspect) {
                    v[0] |= 1 << 7;
                    v[11] = min_a.0;
                    v[12] = min_a.1;
                    v[13] = max_a.0;
                    v[14] = max_a.1;
                }
                if hints.base_w > 0 || hints.base_h > 0 {
                    v[0] |= 1 << 8;
                    v[15] = hints.base_w;
                    v[16] = hints.base_h;
                }
                self.conn.change_property32(PropMode::REPLACE, client.0, atom, AtomEnum::WM_SIZE_HINTS, &v)?;
            }
        }
        Ok(())
    }

    fn delete_prop(&self, client: Xid, name: &str) -> Result<()> {
        let atom = self.intern_atom(name)?.0;
        self.conn.delete_property(client.0, atom)?;
        Ok(())
    }

    fn get_wm_state(&self, client: Xid) -> Result<Option<x::WmState>> {
        let atom = self.known_atom(Atom::WmState);
        let reply = self.conn.get_property(false, client.0, atom, atom, 0, 2)?.reply()?;
        let Some(mut values) = reply.value32() else { return Ok(None) };
        Ok(match values.next() {
            Some(0) => Some(x::WmState::Withdrawn),
            Some(1) => Some(x::WmState::Normal),
            Some(3) => Some(x::WmState::Iconic),
            _ => None,
        })
    }

    fn set_wm_state(&self, client: Xid, state: x::WmState) -> Result<()> {
        let atom = self.known_atom(Atom::WmState);
        let data = [state as u32, 0];
        self.conn.change_property32(PropMode::REPLACE, client.0, atom, atom, &data)?;
        Ok(())
    }

    fn get_transient_for(&self, client: Xid) -> Result<Option<Xid>> {
        let atom = self.known_atom(Atom::WmTransientFor);
        let reply = self.conn.get_property(false, client.0, atom, AtomEnum::WINDOW, 0, 1)?.reply()?;
        Ok(reply.value32().and_then(|mut it| it.next()).map(Xid))
    }

    fn send_protocol_message(&self, client: Xid, protocol: &str) -> Result<()> {
        let proto_atom = self.intern_atom(protocol)?.0;
        let event = ClientMessageEvent {
            response_type: CLIENT_MESSAGE_EVENT,
            format: 32,
            sequence: 0,
            window: client.0,
            type_: self.known_atom(Atom::WmProtocols),
            data: [proto_atom, CURRENT_TIME, 0, 0, 0].into(),
        };
        self.conn.send_event(false, client.0, EventMask::NO_EVENT, &event)?;
        Ok(())
    }

    fn supports_protocol(&self, client: Xid, protocol: &str) -> Result<bool> {
        let atom = self.known_atom(Atom::WmProtocols);
        let want = self.intern_atom(protocol)?.0;
        let reply = self.conn.get_property(false, client.0, atom, AtomEnum::ATOM, 0, 1024)?.reply()?;
        Ok(reply.value32().map(|it| it.collect::<Vec<_>>().contains(&want)).unwrap_or(false))
    }

    fn warp_pointer(&self, client: Xid, x: i32, y: i32) -> Result<()> {
        self.conn.warp_pointer(NONE, client.0, 0, 0, 0, 0, x as i16, y as i16)?;
        Ok(())
    }

    fn numlock_mask(&self) -> Result<u16> {
        let setup = self.conn.setup();
        let min_kc = setup.min_keycode;
        let max_kc = setup.max_keycode;
        let mapping = self.conn.get_keyboard_mapping(min_kc, max_kc - min_kc + 1)?.reply()?;
        let per = mapping.keysyms_per_keycode as usize;
        let modmap = self.conn.get_modifier_mapping()?.reply()?;
        let per_mod = modmap.keycodes_per_modifier();

        let mask = modmap
            .keycodes
            .iter()
            .position(|&kc| {
                kc != 0
                    && mapping
                        .keysyms
                        .get((kc - min_kc) as usize * per)
                        .map(|&sym| sym == XK_NUM_LOCK)
                        .unwrap_or(false)
            })
            .map(|ix| 1u16 << (ix / per_mod))
            .unwrap_or(0);

        self.numlock.set(mask);
        Ok(mask)
    }

    fn connection_fd(&self) -> Option<RawFd> {
        Some(self.conn.stream().as_raw_fd())
    }

    fn support_window(&self) -> Xid {
        Xid(self.support_win)
    }

    fn keycode_from_keysym_name(&self, name: &str) -> Result<u8> {
        let sym = dtwm_keysyms::XKeySym::from_str(name)
            .map_err(|_| Error::UnknownKeysym(name.to_string()))?
            .value();

        let setup = self.conn.setup();
        let min_kc = setup.min_keycode;
        let max_kc = setup.max_keycode;
        let mapping = self.conn.get_keyboard_mapping(min_kc, max_kc - min_kc + 1)?.reply()?;
        let per = mapping.keysyms_per_keycode as usize;

        mapping
            .keysyms
            .chunks(per)
            .position(|chunk| chunk.contains(&sym))
            .map(|ix| min_kc + ix as u8)
            .ok_or_else(|| Error::UnknownKeysym(name.to_string()))
    }
}

impl Drw for X11rbConn {
    fn text_width(&self, s: &str) -> Result<u32> {
        let text: Vec<Char2b> = s.bytes().map(|b| Char2b { byte1: b, byte2: 0 }).collect();
        let extents = self.conn.query_text_extents(self.font, &text)?.reply()?;
        Ok(extents.overall_width as u32)
    }

    fn font_height(&self) -> Result<u32> {
        Ok((self.font_ascent + self.font_descent) as u32)
    }

    fn fill_rect(&self, id: Xid, x: i32, y: i32, w: u32, h: u32, scheme: ColorScheme) -> Result<()> {
        self.conn.change_gc(self.gc, &ChangeGCAux::new().foreground(rgb_pixel(&scheme.bg)))?;
        let rect = Rectangle { x: x as i16, y: y as i16, width: w as u16, height: h as u16 };
        self.conn.poly_fill_rectangle(id.0, self.gc, &[rect])?;
        Ok(())
    }

    fn draw_text(&self, id: Xid, x: i32, y: i32, w: u32, scheme: ColorScheme, s: &str) -> Result<()> {
        let _ = w;
        self.conn.change_gc(
            self.gc,
            &ChangeGCAux::new()
                .font(self.font)
                .foreground(rgb_pixel(&scheme.fg))
                .background(rgb_pixel(&scheme.bg)),
        )?;
        let baseline = y + self.font_ascent as i32;
        self.conn.image_text8(id.0, self.gc, x as i16, baseline as i16, s.as_bytes())?;
        Ok(())
    }

    fn draw_indicator(&self, id: Xid, x: i32, y: i32, filled: bool, urgent: bool, scheme: ColorScheme) -> Result<()> {
        let color = if urgent { &scheme.bg } else { &scheme.fg };
        self.conn.change_gc(self.gc, &ChangeGCAux::new().foreground(rgb_pixel(color)))?;
        const SIZE: u16 = 3;
        let rect = Rectangle { x: x as i16 + 1, y: y as i16 + 1, width: SIZE, height: SIZE };
        if filled {
            self.conn.poly_fill_rectangle(id.0, self.gc, &[rect])?;
        } else {
            self.conn.poly_rectangle(id.0, self.gc, &[rect])?;
        }
        Ok(())
    }

    fn create_bar_window(&self, r: Rect, top: bool) -> Result<Xid> {
        let _ = top;
        let id = self.conn.generate_id()?;
        let screen = &self.conn.setup().roots[self.screen_num];
        let aux = CreateWindowAux::new()
            .override_redirect(1)
            .background_pixel(screen.black_pixel)
            .event_mask(EventMask::EXPOSURE | EventMask::BUTTON_PRESS);
        self.conn.create_window(
            x11rb::COPY_DEPTH_FROM_PARENT,
            id,
            self.root,
            r.x as i16,
            r.y as i16,
            r.w as u16,
            r.h as u16,
            0,
            WindowClass::INPUT_OUTPUT,
            x11rb::COPY_FROM_PARENT,
            &aux,
        )?;
        self.conn.map_window(id)?;
        self.conn.flush()?;
        Ok(Xid(id))
    }

    fn destroy_bar_window(&self, id: Xid) -> Result<()> {
        self.conn.unmap_window(id.0)?;
        self.conn.destroy_window(id.0)?;
        Ok(())
    }
}

fn to_mouse_state(detail: u8, state: u16) -> Option<MouseState> {
    let button = match detail {
        1 => MouseButton::Left,
        2 => MouseButton::Middle,
        3 => MouseButton::Right,
        4 => MouseButton::ScrollUp,
        5 => MouseButton::ScrollDown,
        _ => return None,
    };
    let modifiers = ModifierKey::iter().filter(|m| state & m.x11_mask() != 0).collect();
    Some(MouseState { button, modifiers })
}

fn rgb_pixel(c: &Color) -> u32 {
    let r = (c.r * 255.0).round() as u32;
    let g = (c.g * 255.0).round() as u32;
    let b = (c.b * 255.0).round() as u32;
    (r << 16) | (g << 8) | b
}
