//! Focus, stacking and arrangement (§4.3, §4.4).
//!
//! Everything here operates on one monitor at a time; multi-monitor
//! reconciliation lives in [`crate::startup::updategeom`].
use tracing::{debug, trace};

use crate::geometry::Rect;
use crate::layout::ArrangeParams;
use crate::model::Xid;
use crate::state::WindowManager;
use crate::x::{StackMode, WindowConfig, XConn};
use crate::Result;

/// Push invisible clients on `mon`'s stack off-screen (`x = -2 * (w + 2*bw)`)
/// while leaving them mapped, and restore visible (or docked, see
/// [`layout_dock`]) clients to their last known on-screen position. Tag
/// switches are O(1) and reversible because of this: nothing is ever
/// unmapped for a tag change.
pub fn showhide<X: XConn>(wm: &mut WindowManager<X>, mon: usize) -> Result<()> {
    let tagset = wm.monitors[mon].selected_tags();
    let stack = wm.monitors[mon].stack.clone();

    for id in stack {
        let Some(client) = wm.clients.get(&id) else {
            continue;
        };
        let bw = client.border_width as i32;
        let r = client.geom;

        let target = if client.is_visible_on(tagset) || client.is_docked_on(tagset) {
            r
        } else {
            Rect::new(-(r.w as i32 + 2 * bw) * 2, r.y, r.w, r.h)
        };

        wm.x.configure(
            id,
            WindowConfig {
                r: target,
                border_width: client.border_width,
                stack_mode: None,
            },
        )?;
    }

    Ok(())
}

/// Fixed width/height of a dock-strip icon (ad hoc, not derived from any
/// font or monitor metric).
const DOCK_CELL_W: u32 = 150;
const DOCK_CELL_H: u32 = 24;

/// Lay out minimized, tag-visible clients as a row of fixed-size icons along
/// the top of `mon`'s output area, left to right in arrival order. Clients
/// past the right edge simply overlap the last cell rather than wrapping:
/// this is a deliberately ad hoc placeholder, not a real taskbar layout.
pub fn layout_dock<X: XConn>(wm: &mut WindowManager<X>, mon: usize) -> Result<()> {
    let tagset = wm.monitors[mon].selected_tags();
    let m = wm.monitors[mon].m;

    let docked: Vec<Xid> = wm.monitors[mon]
        .clients
        .iter()
        .copied()
        .filter(|id| wm.clients.get(id).map(|c| c.is_docked_on(tagset)).unwrap_or(false))
        .collect();

    for (i, id) in docked.into_iter().enumerate() {
        let x = m.x + (i as u32 * DOCK_CELL_W).min(m.w.saturating_sub(DOCK_CELL_W)) as i32;
        let r = Rect::new(x, m.y, DOCK_CELL_W, DOCK_CELL_H);

        if let Some(c) = wm.clients.get_mut(&id) {
            c.geom = r;
        }
        wm.x.configure(
            id,
            WindowConfig {
                r,
                border_width: wm.clients[&id].border_width,
                stack_mode: None,
            },
        )?;
    }

    Ok(())
}

/// Run `layout_dock`/`showhide`, invoke the monitor's active arranger over
/// its visible tiled clients (in arrival order), then `restack`.
pub fn arrange<X: XConn>(wm: &mut WindowManager<X>, mon: usize) -> Result<()> {
    layout_dock(wm, mon)?;
    showhide(wm, mon)?;

    let tagset = wm.monitors[mon].selected_tags();
    let tiled: Vec<Xid> = wm.monitors[mon]
        .clients
        .iter()
        .copied()
        .filter(|id| {
            wm.clients
                .get(id)
                .map(|c| c.is_visible_on(tagset) && c.is_tiled())
                .unwrap_or(false)
        })
        .collect();

    let layout_ix = wm.monitors[mon].selected_layout();
    let layout = wm.config.layouts[layout_ix];
    let bw = wm.config.params.border_width;

    let mut symbol_override = None;
    if let Some(arranger) = layout.arrange {
        let params = ArrangeParams {
            working_area: wm.monitors[mon].w,
            mfact: wm.monitors[mon].mfact,
            nmaster: wm.monitors[mon].nmaster,
            border_width: bw,
            clients: &tiled,
        };
        let (positions, symbol) = arranger(&params);
        symbol_override = symbol;

        for (id, r) in positions {
            if let Some(c) = wm.clients.get_mut(&id) {
                c.geom = r;
                c.border_width = bw;
            }
            wm.x.configure(
                id,
                WindowConfig {
                    r,
                    border_width: bw,
                    stack_mode: None,
                },
            )?;
        }
    }

    wm.monitors[mon].layout_symbol = symbol_override
        .unwrap_or_else(|| layout.symbol.to_string());

    restack(wm, mon)
}

/// Re-arrange every monitor.
pub fn arrange_all<X: XConn>(wm: &mut WindowManager<X>) -> Result<()> {
    for m in 0..wm.monitors.len() {
        arrange(wm, m)?;
    }
    Ok(())
}

/// Raise the floating selection above everything; stack tiled visible
/// clients below the bar window in focus-stack order (§4.4).
pub fn restack<X: XConn>(wm: &mut WindowManager<X>, mon: usize) -> Result<()> {
    let tagset = wm.monitors[mon].selected_tags();

    if let Some(sel) = wm.selected_client_on(mon) {
        if wm.clients.get(&sel).map(|c| c.is_floating()).unwrap_or(false) {
            wm.x.configure(
                sel,
                WindowConfig {
                    r: wm.clients[&sel].geom,
                    border_width: wm.clients[&sel].border_width,
                    stack_mode: Some(StackMode::Top),
                },
            )?;
        }
    }

    if let Some(bar) = wm.monitors[mon].bar_window {
        let mut previous = bar;
        for &id in wm.monitors[mon].stack.iter().rev() {
            let visible_tiled = wm
                .clients
                .get(&id)
                .map(|c| c.is_visible_on(tagset) && c.is_tiled())
                .unwrap_or(false);
            if !visible_tiled {
                continue;
            }
            wm.x.configure(
                id,
                WindowConfig {
                    r: wm.clients[&id].geom,
                    border_width: wm.clients[&id].border_width,
                    stack_mode: Some(StackMode::Below(previous)),
                },
            )?;
            previous = id;
        }
    }

    // The configure calls above generate pointer-crossing events of their
    // own; drop them so they don't masquerade as a real EnterNotify once
    // the event loop gets back around to them (§4.4).
    wm.x.drain_enter_notify()?;

    Ok(())
}

/// Focus `id` (or, if `None`, the first visible client on the selected
/// monitor's stack). Unfocuses whatever was previously selected.
pub fn focus<X: XConn>(wm: &mut WindowManager<X>, id: Option<Xid>) -> Result<()> {
    let mon = wm.sel_mon;
    let target = id.or_else(|| wm.selected_client_on(mon));

    if let Some(prev) = wm.selected_client_on(mon) {
        if Some(prev) != target {
            unfocus(wm, prev)?;
        }
    }

    let Some(target) = target else {
        wm.x.set_input_focus(wm.x.root())?;
        return Ok(());
    };

    trace!(?target, "focusing client");

    wm.monitors[mon].bump_stack(target);

    if let Some(c) = wm.clients.get_mut(&target) {
        c.set_urgent(false);
    }

    let selected = wm.config.selected_scheme.border;
    wm.x.set_border_color(target, selected.rgba_u32())?;

    let never_focus = wm.clients.get(&target).map(|c| c.never_focus()).unwrap_or(false);
    if never_focus {
        wm.x.send_protocol_message(target, crate::x::Atom::WmTakeFocus.as_ref())?;
    } else {
        wm.x.set_input_focus(target)?;
    }

    debug!(?target, "focus changed");
    Ok(())
}

fn unfocus<X: XConn>(wm: &mut WindowManager<X>, id: Xid) -> Result<()> {
    let normal = wm.config.normal_scheme.border;
    wm.x.set_border_color(id, normal.rgba_u32())
}

/// Walk the selected monitor's client list forward (`dir > 0`) or backward,
/// skipping invisible clients and wrapping, and focus the result.
pub fn focusstack<X: XConn>(wm: &mut WindowManager<X>, dir: i32) -> Result<()> {
    let mon = wm.sel_mon;
    let tagset = wm.monitors[mon].selected_tags();

    let Some(sel) = wm.selected_client_on(mon) else {
        return Ok(());
    };

    if wm.config.params.lock_fullscreen
        && wm.clients.get(&sel).map(|c| c.is_fullscreen()).unwrap_or(false)
    {
        return Ok(());
    }

    let clients = &wm.monitors[mon].clients;
    let n = clients.len();
    let Some(start) = clients.iter().position(|&id| id == sel) else {
        return Ok(());
    };

    let visible = |wm: &WindowManager<X>, id: Xid| {
        wm.clients.get(&id).map(|c| c.is_visible_on(tagset)).unwrap_or(false)
    };

    let step: i32 = if dir >= 0 { 1 } else { -1 };
    let mut i = start as i32;
    for _ in 0..n {
        i = ((i + step) % n as i32 + n as i32) % n as i32;
        let candidate = wm.monitors[mon].clients[i as usize];
        if visible(wm, candidate) {
            return focus(wm, Some(candidate));
        }
    }

    Ok(())
}

/// Zoom `id` to the head of the monitor's client list (or swap with the
/// next tiled client if it is already head) and refocus. No-op for
/// floating clients.
pub fn pop<X: XConn>(wm: &mut WindowManager<X>, id: Xid) -> Result<()> {
    let Some(client) = wm.clients.get(&id) else {
        return Ok(());
    };
    if client.is_floating() {
        return Ok(());
    }
    let mon = client.monitor;
    let list = &mut wm.monitors[mon].clients;
    let Some(pos) = list.iter().position(|&c| c == id) else {
        return Ok(());
    };

    if pos == 0 {
        if list.len() > 1 {
            list.swap(0, 1);
        }
    } else {
        list.remove(pos);
        list.insert(0, id);
    }

    focus(wm, Some(id))?;
    arrange(wm, mon)
}
