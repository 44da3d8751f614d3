//! Bound keyboard/mouse actions (§6 keybinding table, §4.4 zoom/focusstack).
//!
//! Every action has the `Action<X>` signature (`fn(&mut WindowManager<X>,
//! &Arg) -> Result<()>`) so a [`crate::config::Config`] table can hold them
//! as plain function pointers, mirroring dwm's `void (*func)(const Arg *)`
//! keybinding table.
use tracing::info;

use crate::bar::Drw;
use crate::bindings::Arg;
use crate::event::handle::set_fullscreen;
use crate::event::interactive;
use crate::focus;
use crate::model::TagMask;
use crate::state::WindowManager;
use crate::x::{XConn, XConnExt};
use crate::Result;

/// Show exactly the tags in `arg`'s mask; re-selecting the already-shown
/// tagset instead flips back to whichever tagset was shown before that
/// (dwm's `seltags ^= 1` trick, surfaced here since [`super::model::Monitor`]
/// keeps two tagset slots for exactly this).
pub fn view<X: XConn>(wm: &mut WindowManager<X>, arg: &Arg) -> Result<()> {
    let mask = TagMask(arg.as_uint());
    let mon = wm.sel_mon;
    let m = &mut wm.monitors[mon];

    if mask == m.selected_tags() {
        return Ok(());
    }

    m.sel_tagset ^= 1;
    if !mask.is_empty() {
        let ix = m.sel_tagset;
        m.tagset[ix] = mask;
    }

    focus::focus(wm, None)?;
    focus::arrange(wm, mon)
}

/// Toggle `arg`'s mask into/out of the selected monitor's current tagset.
/// A no-op if that would leave no tag selected at all.
pub fn toggleview<X: XConn>(wm: &mut WindowManager<X>, arg: &Arg) -> Result<()> {
    let mask = TagMask(arg.as_uint());
    let mon = wm.sel_mon;
    let m = &mut wm.monitors[mon];
    let ix = m.sel_tagset;
    let next = m.tagset[ix].toggled(mask);

    if next.is_empty() {
        return Ok(());
    }
    m.tagset[ix] = next;

    focus::focus(wm, None)?;
    focus::arrange(wm, mon)
}

/// Move the selected client onto exactly the tags in `arg`'s mask.
pub fn tag<X: XConn>(wm: &mut WindowManager<X>, arg: &Arg) -> Result<()> {
    let mask = TagMask(arg.as_uint());
    if mask.is_empty() {
        return Ok(());
    }
    let mon = wm.sel_mon;
    let Some(id) = wm.selected_client_on(mon) else {
        return Ok(());
    };
    if let Some(c) = wm.clients.get_mut(&id) {
        c.tags = mask;
    }
    focus::focus(wm, None)?;
    focus::arrange(wm, mon)
}

/// Toggle `arg`'s mask into/out of the selected client's tags. A no-op if
/// that would leave the client with no tags at all.
pub fn toggletag<X: XConn>(wm: &mut WindowManager<X>, arg: &Arg) -> Result<()> {
    let mask = TagMask(arg.as_uint());
    if mask.is_empty() {
        return Ok(());
    }
    let mon = wm.sel_mon;
    let Some(id) = wm.selected_client_on(mon) else {
        return Ok(());
    };
    let Some(client) = wm.clients.get(&id) else {
        return Ok(());
    };
    let next = client.tags.toggled(mask);
    if next.is_empty() {
        return Ok(());
    }
    if let Some(c) = wm.clients.get_mut(&id) {
        c.tags = next;
    }
    focus::focus(wm, None)?;
    focus::arrange(wm, mon)
}

/// Move `selmon` by `arg.as_int()` monitors (wrapping) and re-focus.
pub fn focusmon<X: XConn>(wm: &mut WindowManager<X>, arg: &Arg) -> Result<()> {
    let n = wm.monitors.len();
    if n < 2 {
        return Ok(());
    }
    let dir = arg.as_int();
    let next = ((wm.sel_mon as i32 + dir).rem_euclid(n as i32)) as usize;
    if next == wm.sel_mon {
        return Ok(());
    }
    wm.sel_mon = next;
    focus::focus(wm, None)
}

/// Re-home the selected client to the monitor `arg.as_int()` steps away.
pub fn tagmon<X: XConn>(wm: &mut WindowManager<X>, arg: &Arg) -> Result<()> {
    let n = wm.monitors.len();
    if n < 2 {
        return Ok(());
    }
    let mon = wm.sel_mon;
    let Some(id) = wm.selected_client_on(mon) else {
        return Ok(());
    };
    let target = ((mon as i32 + arg.as_int()).rem_euclid(n as i32)) as usize;
    if target == mon {
        return Ok(());
    }

    if let Some(c) = wm.clients.get_mut(&id) {
        c.monitor = target;
    }
    wm.monitors[mon].detach(id);
    wm.monitors[target].attach(id);
    wm.monitors[target].attach_stack(id);

    focus::arrange(wm, mon)?;
    focus::arrange(wm, target)
}

/// Adjust the selected monitor's master count by `arg.as_int()`, floored at
/// zero (§4.3: `nmaster = max(0, nmaster)`).
pub fn incnmaster<X: XConn>(wm: &mut WindowManager<X>, arg: &Arg) -> Result<()> {
    let mon = wm.sel_mon;
    let m = &mut wm.monitors[mon];
    let next = m.nmaster as i32 + arg.as_int();
    m.nmaster = next.max(0) as u32;
    focus::arrange(wm, mon)
}

/// Adjust the selected monitor's master-area fraction by `arg.as_float()`,
/// clamped to `[0.05, 0.95]` (§3 Monitor invariant).
pub fn setmfact<X: XConn>(wm: &mut WindowManager<X>, arg: &Arg) -> Result<()> {
    let mon = wm.sel_mon;
    let layout_ix = wm.monitors[mon].selected_layout();
    if wm.config.layouts[layout_ix].arrange.is_none() {
        return Ok(());
    }
    let m = &mut wm.monitors[mon];
    let next = m.mfact + arg.as_float();
    m.mfact = next.clamp(0.05, 0.95);
    focus::arrange(wm, mon)
}

/// Zoom the selected client to the master slot (§4.4 `pop`).
pub fn zoom<X: XConn>(wm: &mut WindowManager<X>, _arg: &Arg) -> Result<()> {
    let mon = wm.sel_mon;
    let Some(id) = wm.selected_client_on(mon) else {
        return Ok(());
    };
    focus::pop(wm, id)
}

/// Cycle the focused client forward (`arg.as_int() >= 0`) or backward
/// through the selected monitor's stack.
pub fn focusstack<X: XConn>(wm: &mut WindowManager<X>, arg: &Arg) -> Result<()> {
    focus::focusstack(wm, arg.as_int())
}

/// Ask the selected client to close: `WM_DELETE_WINDOW` if it supports the
/// protocol, otherwise a hard `XDestroyWindow` (§4.6).
pub fn killclient<X: XConn>(wm: &mut WindowManager<X>, _arg: &Arg) -> Result<()> {
    let mon = wm.sel_mon;
    let Some(id) = wm.selected_client_on(mon) else {
        return Ok(());
    };
    crate::event::handle::suppress_teardown_errors(wm.x.close_client_gracefully(id))
}

/// Toggle the selected client between tiled and floating. A no-op for
/// fixed-size or fullscreen clients, whose floating state is not
/// user-controlled (§3 invariants).
pub fn togglefloating<X: XConn>(wm: &mut WindowManager<X>, _arg: &Arg) -> Result<()> {
    let mon = wm.sel_mon;
    let Some(id) = wm.selected_client_on(mon) else {
        return Ok(());
    };
    let Some(client) = wm.clients.get(&id) else {
        return Ok(());
    };
    if client.is_fullscreen() || client.is_fixed() {
        return Ok(());
    }
    let floating = !client.is_floating();
    let saved = client.saved_geom;

    if let Some(c) = wm.clients.get_mut(&id) {
        if floating {
            c.geom = saved;
        } else {
            c.saved_geom = c.geom;
        }
        c.set_floating(floating);
    }
    focus::arrange(wm, mon)
}

/// Toggle `_NET_WM_STATE_FULLSCREEN` on the selected client.
pub fn togglefullscreen<X: XConn>(wm: &mut WindowManager<X>, _arg: &Arg) -> Result<()> {
    let mon = wm.sel_mon;
    let Some(id) = wm.selected_client_on(mon) else {
        return Ok(());
    };
    let want = !wm.clients.get(&id).map(|c| c.is_fullscreen()).unwrap_or(false);
    set_fullscreen(wm, id, want)
}

/// Show/hide the selected monitor's bar and resize its working area to
/// match.
pub fn togglebar<X: XConn + Drw>(wm: &mut WindowManager<X>, _arg: &Arg) -> Result<()> {
    let mon = wm.sel_mon;
    let m = &mut wm.monitors[mon];
    m.bar.shown = !m.bar.shown;

    let strip = m.bar.geom.h;
    m.w = if m.bar.shown {
        if m.bar.top {
            crate::geometry::Rect::new(m.m.x, m.m.y + strip as i32, m.m.w, m.m.h - strip)
        } else {
            crate::geometry::Rect::new(m.m.x, m.m.y, m.m.w, m.m.h - strip)
        }
    } else {
        m.m
    };

    if let Some(bar) = m.bar_window {
        let y = if m.bar.shown {
            if m.bar.top { m.m.y } else { m.m.y + m.w.h as i32 }
        } else {
            m.m.y - strip as i32 * 2
        };
        wm.x.configure(
            bar,
            crate::x::WindowConfig {
                r: crate::geometry::Rect::new(m.m.x, y, m.m.w, strip),
                border_width: 0,
                stack_mode: None,
            },
        )?;
    }

    focus::arrange(wm, mon)?;
    crate::bar::redraw(wm, mon)
}

/// Select the layout at `arg.as_uint()` as one of the monitor's two assigned
/// layout slots and re-arrange.
pub fn setlayout<X: XConn + Drw>(wm: &mut WindowManager<X>, arg: &Arg) -> Result<()> {
    let mon = wm.sel_mon;
    let ix = (arg.as_uint() as usize).min(wm.config.layouts.len() - 1);
    let sel = wm.monitors[mon].sel_layout;
    wm.monitors[mon].layouts[sel] = ix;
    focus::arrange(wm, mon)?;
    crate::bar::redraw(wm, mon)
}

/// Run the selected client's interactive move (§4.5 `movemouse`).
pub fn movemouse<X: XConn + Drw>(wm: &mut WindowManager<X>, _arg: &Arg) -> Result<()> {
    let mon = wm.sel_mon;
    let Some(id) = wm.selected_client_on(mon) else {
        return Ok(());
    };
    interactive::movemouse(wm, id)
}

/// Run the selected client's interactive resize (§4.5 `resizemouse`).
pub fn resizemouse<X: XConn + Drw>(wm: &mut WindowManager<X>, _arg: &Arg) -> Result<()> {
    let mon = wm.sel_mon;
    let Some(id) = wm.selected_client_on(mon) else {
        return Ok(());
    };
    interactive::resizemouse(wm, id)
}

/// Spawn an external command (§6: `execvp`, closing the X connection fd,
/// starting a new session, restoring default `SIGCHLD` in the child).
pub fn spawn<X: XConn>(wm: &mut WindowManager<X>, arg: &Arg) -> Result<()> {
    let argv = arg.as_str();
    if argv.is_empty() {
        return Ok(());
    }
    let parts: Vec<&str> = argv.split_whitespace().collect();
    let Some((prog, rest)) = parts.split_first() else {
        return Ok(());
    };

    info!(cmd = argv, "spawning");
    crate::spawn::spawn(prog, rest, wm.x.connection_fd())
}

/// Request a clean shutdown: the run loop checks `running` once per event
/// (§5), it is not preempted mid-handler.
pub fn quit<X: XConn>(wm: &mut WindowManager<X>, _arg: &Arg) -> Result<()> {
    wm.quit();
    Ok(())
}
