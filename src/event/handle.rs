//! Per-event-type handlers (§4.5), plus `manage`/`unmanage` (§4.6).
use tracing::{debug, info, warn};

use crate::bar::Drw;
use crate::bindings::{ClickTarget, MouseEvent};
use crate::focus;
use crate::geometry::{apply_size_hints, Rect};
use crate::model::{Client, Xid};
use crate::state::WindowManager;
use crate::x::event::{ClientMessage, ConfigureEvent, ExposeEvent, PointerChange, PropertyEvent, StateAction};
use crate::x::{Atom, Prop, StackMode, WindowConfig, WmState, XConn};
use crate::error::XErrorAction;
use crate::Result;

/// Run a request against a window whose teardown is already in progress,
/// downgrading a `BadWindow`-class reply (§5/§7: the window disappeared
/// before the server processed the request) to `Ok(())` and propagating
/// anything else. The only place that inspects an [`XErrorAction`].
pub fn suppress_teardown_errors(r: Result<()>) -> Result<()> {
    match r {
        Err(e) if e.classify_for_teardown() == XErrorAction::ScopedSuppress => Ok(()),
        other => other,
    }
}

// ---------------------------------------------------------------------
// Manage / unmanage (§4.6)
// ---------------------------------------------------------------------

/// Request a window's title following ICCCM/EWMH lookup order
/// (`_NET_WM_NAME` first, `WM_NAME` as fallback), falling back to the
/// literal "broken" when neither is set (§7 client-misbehavior tolerance).
fn window_title<X: XConn>(wm: &mut WindowManager<X>, id: Xid) -> Result<String> {
    let name = match wm.x.get_prop(id, Atom::NetWmName.as_ref())? {
        Some(Prop::UTF8String(mut v)) => v.pop(),
        _ => match wm.x.get_prop(id, Atom::WmName.as_ref())? {
            Some(Prop::UTF8String(mut v)) => v.pop(),
            _ => None,
        },
    };
    Ok(match name {
        Some(name) if !name.is_empty() => name,
        _ => "broken".to_owned(),
    })
}

/// Adopt a newly mapped (or, via `scan`, already-mapped) top-level window as
/// a managed [`Client`].
pub fn manage<X: XConn>(wm: &mut WindowManager<X>, w: Xid) -> Result<()> {
    if wm.clients.contains_key(&w) {
        return Ok(());
    }

    let mon = wm.sel_mon;
    let tagset = wm.monitors[mon].selected_tags();
    let mut client = Client::new(w, mon, tagset);

    client.geom = wm.x.client_geometry(w).unwrap_or(Rect::new(0, 0, 1, 1));
    client.border_width = wm.config.params.border_width;
    client.name = window_title(wm, w)?;

    let transient_for = wm.x.get_transient_for(w)?;
    let mut matched_a_rule = false;

    if let Some(parent) = transient_for.and_then(|p| wm.clients.get(&p)) {
        client.tags = parent.tags;
        client.monitor = parent.monitor;
        client.flags.set(crate::model::ClientFlags::FLOATING, true);
        matched_a_rule = true;
    } else if let Ok((class, instance)) = wm.x.window_class_and_instance(w) {
        for rule in &wm.config.rules {
            if rule.matches(&class, &instance, &client.name) {
                client.tags = client.tags.union(rule.tags);
                client.flags.set(crate::model::ClientFlags::FLOATING, rule.is_floating);
                if let Some(target) = rule.monitor {
                    client.monitor = target;
                }
                matched_a_rule = true;
                break;
            }
        }
    }

    if !matched_a_rule || client.tags.is_empty() {
        client.tags = wm.monitors[client.monitor].selected_tags();
    }

    client.hints = match wm.x.get_prop(w, Atom::WmNormalHints.as_ref())? {
        Some(Prop::WmNormalHints(hints)) => hints,
        _ => Default::default(),
    };
    client.hints_valid = true;
    client.flags.set(crate::model::ClientFlags::FIXED, client.hints.is_fixed());
    if client.is_fixed() {
        client.flags.set(crate::model::ClientFlags::FLOATING, true);
    }

    if let Some(Prop::WmHints(hints)) = wm.x.get_prop(w, Atom::WmHints.as_ref())? {
        client.set_urgent(hints.urgent);
        client
            .flags
            .set(crate::model::ClientFlags::NEVER_FOCUS, hints.input == Some(false));
    }

    let mon = client.monitor;
    let working_area = wm.monitors[mon].w;
    let clamped = apply_size_hints(
        &client.hints,
        client.geom,
        client.geom.x,
        client.geom.y,
        client.geom.w,
        client.geom.h,
        working_area,
        false,
        wm.bar_height,
        client.is_floating(),
    );
    client.geom = clamped.r;
    client.saved_geom = client.geom;

    wm.x.select_for_client_events(w)?;
    wm.x.set_border_color(w, wm.config.normal_scheme.border.rgba_u32())?;

    let id = client.id;
    wm.clients.insert(id, client);
    wm.monitors[mon].attach(id);
    wm.monitors[mon].attach_stack(id);

    wm.x.set_wm_state(id, WmState::Normal)?;
    update_client_list(wm)?;

    // Position off-screen before mapping: resolves a class of broken
    // Qt/GTK startup races that otherwise briefly flash at (0,0) (§4.6).
    let g = wm.clients[&id].geom;
    let bw = wm.clients[&id].border_width as i32;
    let off = Rect::new(-(g.w as i32 + 2 * bw) * 2, g.y, g.w, g.h);
    wm.x.configure(
        id,
        WindowConfig {
            r: off,
            border_width: wm.clients[&id].border_width,
            stack_mode: None,
        },
    )?;
    wm.x.map(id)?;

    info!(?id, "managed new client");

    focus::arrange(wm, mon)?;
    focus::focus(wm, Some(id))
}

/// Detach and forget a client (§4.6). `destroyed` is `true` when the window
/// no longer exists (skip any request that would touch it).
pub fn unmanage<X: XConn>(wm: &mut WindowManager<X>, id: Xid, destroyed: bool) -> Result<()> {
    let Some(client) = wm.clients.get(&id).cloned() else {
        return Ok(());
    };
    let mon = client.monitor;

    wm.monitors[mon].detach(id);

    if !destroyed {
        let color = wm.config.normal_scheme.border.rgba_u32();
        suppress_teardown_errors(wm.x.set_border_color(id, color))?;
        suppress_teardown_errors(wm.x.set_wm_state(id, WmState::Withdrawn))?;
        suppress_teardown_errors(wm.x.select_for_unmap_events_only(id))?;
    }

    wm.clients.remove(&id);

    if wm.selected_client_on(mon).is_none() {
        focus::focus(wm, None)?;
    }

    update_client_list(wm)?;
    focus::arrange(wm, mon)
}

fn update_client_list<X: XConn>(wm: &mut WindowManager<X>) -> Result<()> {
    let ids: Vec<Xid> = wm.monitors.iter().flat_map(|m| m.clients.iter().copied()).collect();
    wm.x.set_prop(wm.x.root(), Atom::NetClientList.as_ref(), Prop::Window(ids))
}

// ---------------------------------------------------------------------
// Per-event handlers
// ---------------------------------------------------------------------

pub fn button_press<X: XConn>(wm: &mut WindowManager<X>, e: MouseEvent) -> Result<()> {
    let click;
    let mut tag_ix = None;

    if let Some(mon_ix) = wm.monitors.iter().position(|m| m.bar_window == Some(e.id)) {
        wm.sel_mon = mon_ix;
        let cell = wm.bar_cells.get(mon_ix).and_then(|cells| crate::bar::click_target(cells, e.relative.x));
        click = cell.map(|c| c.target).unwrap_or(ClickTarget::RootWin);
        tag_ix = cell.and_then(|c| c.tag_ix);
    } else if let Some(&mon) = wm.clients.get(&e.id).map(|c| &c.monitor) {
        wm.sel_mon = mon;
        click = ClickTarget::ClientWin;
        focus::focus(wm, Some(e.id))?;
        wm.x.flush();
    } else {
        click = ClickTarget::RootWin;
    }

    // Modifier matching already happened at grab time (only the bound
    // combinations are selected for in `resolved_buttons`); dispatch here
    // only needs the click region and button identity.
    let matches: Vec<(crate::bindings::Action<X>, crate::bindings::Arg)> = wm
        .config
        .buttons
        .iter()
        .filter(|b| b.click == click && b.button == e.state)
        .map(|b| (b.action, b.arg.clone()))
        .collect();

    for (action, arg) in matches {
        action(wm, &arg)?;
    }

    if let (ClickTarget::TagBar, Some(ix)) = (click, tag_ix) {
        debug!(ix, "bar tag cell clicked");
    }

    Ok(())
}

pub fn client_message<X: XConn>(wm: &mut WindowManager<X>, msg: ClientMessage) -> Result<()> {
    let net_wm_state = Atom::NetWmState.as_ref();
    let net_wm_state_fullscreen = Atom::NetWmStateFullscreen.as_ref();
    let active_window = Atom::NetActiveWindow.as_ref();

    if msg.dtype == net_wm_state {
        let target = wm.x.atom_name(Xid(msg.data[1])).unwrap_or_default();
        if target == net_wm_state_fullscreen {
            if let Some(action) = StateAction::from_u32(msg.data[0]) {
                let want = match action {
                    StateAction::Add => true,
                    StateAction::Remove => false,
                    StateAction::Toggle => !wm.clients.get(&msg.id).map(|c| c.is_fullscreen()).unwrap_or(false),
                };
                set_fullscreen(wm, msg.id, want)?;
            }
        }
    } else if msg.dtype == active_window {
        let is_selected = wm.selected_client() == Some(msg.id);
        let is_urgent = wm.clients.get(&msg.id).map(|c| c.is_urgent()).unwrap_or(false);
        if !is_selected && !is_urgent {
            if let Some(c) = wm.clients.get_mut(&msg.id) {
                c.set_urgent(true);
            }
        }
    }

    Ok(())
}

/// Toggle fullscreen per §4.3's invariant: fullscreen implies floating and a
/// zero border; leaving fullscreen restores whatever preceded it.
pub fn set_fullscreen<X: XConn>(wm: &mut WindowManager<X>, id: Xid, want: bool) -> Result<()> {
    let Some(client) = wm.clients.get(&id) else {
        return Ok(());
    };
    if want == client.is_fullscreen() {
        return Ok(());
    }

    let mon = client.monitor;

    if want {
        let floating = client.is_floating();
        let bw = client.border_width;
        let m = wm.monitors[mon].m;

        if let Some(c) = wm.clients.get_mut(&id) {
            c.pre_fullscreen_floating = floating;
            c.pre_fullscreen_border = bw;
            c.set_fullscreen(true);
            c.set_floating(true);
            c.border_width = 0;
            c.geom = m;
        }
        wm.x.set_prop(id, Atom::NetWmState.as_ref(), Prop::Atom(vec![Atom::NetWmStateFullscreen.as_ref().to_string()]))?;
        wm.x.configure(id, WindowConfig { r: m, border_width: 0, stack_mode: Some(StackMode::Top) })?;
    } else {
        let (restore_floating, restore_bw) = {
            let c = &wm.clients[&id];
            (c.pre_fullscreen_floating, c.pre_fullscreen_border)
        };
        if let Some(c) = wm.clients.get_mut(&id) {
            c.set_fullscreen(false);
            c.set_floating(restore_floating);
            c.border_width = restore_bw;
        }
        wm.x.set_prop(id, Atom::NetWmState.as_ref(), Prop::Atom(vec![]))?;
    }

    focus::arrange(wm, mon)
}

pub fn configure_request<X: XConn>(wm: &mut WindowManager<X>, e: ConfigureEvent) -> Result<()> {
    let Some(client) = wm.clients.get(&e.id).cloned() else {
        // unmanaged window: pass the request straight through.
        wm.x.configure(
            e.id,
            WindowConfig { r: e.r, border_width: 0, stack_mode: None },
        )?;
        return Ok(());
    };

    let mon = client.monitor;
    let no_tiler = wm.config.layouts[wm.monitors[mon].selected_layout()].arrange.is_none();

    if client.is_floating() || no_tiler || e.border_only {
        let working_area = wm.monitors[mon].m;
        let mut r = e.r;
        if !working_area.overlaps(&r) {
            r = r.centered_in(&working_area);
        }
        if let Some(c) = wm.clients.get_mut(&e.id) {
            c.geom = r;
        }
        wm.x.configure(e.id, WindowConfig { r, border_width: client.border_width, stack_mode: None })?;
    } else {
        wm.x.send_configure_notify(e.id, client.geom, client.border_width)?;
    }

    Ok(())
}

pub fn configure_notify<X: XConn + Drw>(wm: &mut WindowManager<X>, e: ConfigureEvent) -> Result<()> {
    if !e.is_root {
        return Ok(());
    }

    let (sw, sh) = wm.x.screen_size()?;
    if sw == wm.screen_w && sh == wm.screen_h {
        return Ok(());
    }
    wm.screen_w = sw;
    wm.screen_h = sh;

    let dirty = crate::startup::updategeom(wm)?;
    if dirty {
        focus::focus(wm, None)?;
        focus::arrange_all(wm)?;
    }
    Ok(())
}

pub fn destroy_notify<X: XConn>(wm: &mut WindowManager<X>, id: Xid) -> Result<()> {
    unmanage(wm, id, true)
}

pub fn unmap_notify<X: XConn>(wm: &mut WindowManager<X>, id: Xid, real: bool) -> Result<()> {
    if !real {
        return Ok(());
    }
    unmanage(wm, id, false)
}

pub fn enter_notify<X: XConn>(wm: &mut WindowManager<X>, e: PointerChange) -> Result<()> {
    if e.detail_inferior_or_hint {
        return Ok(());
    }

    if let Some(mon) = wm.clients.get(&e.id).map(|c| c.monitor) {
        if mon != wm.sel_mon {
            wm.sel_mon = mon;
        }
    }

    if wm.clients.contains_key(&e.id) {
        focus::focus(wm, Some(e.id))
    } else {
        Ok(())
    }
}

pub fn expose<X: XConn + Drw>(wm: &mut WindowManager<X>, e: ExposeEvent) -> Result<()> {
    if e.count == 0 {
        if let Some(mon) = wm.monitors.iter().position(|m| m.bar_window == Some(e.id)) {
            crate::bar::redraw(wm, mon)?;
        }
    }
    Ok(())
}

pub fn focus_in<X: XConn>(wm: &mut WindowManager<X>, id: Xid) -> Result<()> {
    let sel = wm.selected_client();
    if sel != Some(id) {
        if let Some(sel) = sel {
            wm.x.set_input_focus(sel)?;
        } else {
            wm.x.set_input_focus(wm.x.root())?;
        }
    }
    Ok(())
}

pub fn key_press<X: XConn>(wm: &mut WindowManager<X>, kc: crate::bindings::KeyCode) -> Result<()> {
    // CLEANMASK: strip numlock and capslock (bit 1) before comparing (§4.5).
    const LOCK_MASK: u16 = 1 << 1;
    let ignore = wm.numlock_mask | LOCK_MASK;

    let clean = kc.ignoring_modifier(ignore);
    let resolved: Vec<(crate::bindings::KeyCode, usize)> = wm
        .resolved_keys
        .iter()
        .enumerate()
        .map(|(i, k)| (k.ignoring_modifier(ignore), i))
        .collect();

    for (k, ix) in resolved {
        if k == clean {
            if let Some(binding) = wm.config.keys.get(ix) {
                let action = binding.action;
                let arg = binding.arg.clone();
                return action(wm, &arg);
            }
        }
    }
    Ok(())
}

pub fn mapping_notify<X: XConn>(wm: &mut WindowManager<X>) -> Result<()> {
    wm.numlock_mask = wm.x.numlock_mask()?;
    wm.regrab()
}

pub fn map_request<X: XConn>(wm: &mut WindowManager<X>, id: Xid) -> Result<()> {
    manage(wm, id)
}

pub fn motion_notify<X: XConn>(wm: &mut WindowManager<X>, p: crate::geometry::Point) -> Result<()> {
    let mon = wm
        .monitors
        .iter()
        .position(|m| m.m.contains_point(p))
        .unwrap_or(wm.motion_mon);

    if mon != wm.motion_mon {
        wm.motion_mon = mon;
        if mon != wm.sel_mon {
            wm.sel_mon = mon;
            focus::focus(wm, None)?;
        }
    }
    Ok(())
}

pub fn property_notify<X: XConn + Drw>(wm: &mut WindowManager<X>, e: PropertyEvent) -> Result<()> {
    if e.is_root {
        if e.atom == Atom::WmName.as_ref() {
            if let Some(Prop::UTF8String(mut v)) = wm.x.get_prop(e.id, Atom::WmName.as_ref())? {
                wm.set_status_text(v.pop().unwrap_or_default());
                crate::bar::redraw(wm, wm.sel_mon)?;
            }
        }
        return Ok(());
    }

    let Some(_client) = wm.clients.get(&e.id) else {
        return Ok(());
    };

    if e.atom == Atom::WmTransientFor.as_ref() {
        if let Some(parent) = wm.x.get_transient_for(e.id)? {
            if let Some(parent_tags) = wm.clients.get(&parent).map(|c| c.tags) {
                if let Some(c) = wm.clients.get_mut(&e.id) {
                    c.flags.set(crate::model::ClientFlags::FLOATING, true);
                    c.tags = parent_tags;
                }
            }
        }
    } else if e.atom == Atom::WmNormalHints.as_ref() {
        if let Some(c) = wm.clients.get_mut(&e.id) {
            c.hints_valid = false;
        }
    } else if e.atom == Atom::WmHints.as_ref() {
        if let Some(Prop::WmHints(hints)) = wm.x.get_prop(e.id, Atom::WmHints.as_ref())? {
            if let Some(c) = wm.clients.get_mut(&e.id) {
                c.set_urgent(hints.urgent);
            }
        }
        let mon = wm.clients[&e.id].monitor;
        crate::bar::redraw(wm, mon)?;
    } else if e.atom == Atom::WmName.as_ref() || e.atom == Atom::NetWmName.as_ref() {
        let name = window_title(wm, e.id)?;
        if let Some(c) = wm.clients.get_mut(&e.id) {
            c.name = name;
        }
        let mon = wm.clients[&e.id].monitor;
        if wm.selected_client_on(mon) == Some(e.id) {
            crate::bar::redraw(wm, mon)?;
        }
    } else if e.atom == Atom::NetWmWindowType.as_ref() {
        warn!(id = ?e.id, "window type changed after manage, dialog re-test not yet wired to a concrete check");
    }

    Ok(())
}
