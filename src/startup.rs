//! Startup, multihead reconciliation and shutdown (§4.8, §6).
//!
//! `setup` takes ownership of the root window and publishes the EWMH state a
//! pager/taskbar expects to find; `scan` adopts whatever top-level windows
//! are already mapped when we start; `updategeom` is both the first-run
//! monitor discovery and the incremental reconciler `RRScreenChangeNotify`
//! re-runs; `shutdown` undoes `manage`'s border/property changes so a
//! restarted or replaced window manager inherits clean windows.
use std::collections::HashMap;

use strum::IntoEnumIterator;
use tracing::{info, warn};

use crate::bar::Drw;
use crate::bindings::{modifiers_mask, Bindings, KeyCode, MouseState};
use crate::config::Config;
use crate::event::handle;
use crate::geometry::Rect;
use crate::model::Monitor;
use crate::state::WindowManager;
use crate::x::{Atom, Prop, XConn};
use crate::{Error, Result};

/// Atoms advertised in `_NET_SUPPORTED`: every EWMH property this window
/// manager reads or writes anywhere.
const SUPPORTED_ATOMS: &[Atom] = &[
    Atom::NetActiveWindow,
    Atom::NetClientList,
    Atom::NetSupported,
    Atom::NetSupportingWmCheck,
    Atom::NetWmName,
    Atom::NetWmState,
    Atom::NetWmStateFullscreen,
    Atom::NetWmWindowType,
    Atom::NetWmWindowTypeDialog,
];

/// Take ownership of the root window, intern every atom this window manager
/// ever references, publish `_NET_SUPPORTED`/the support window, grab the
/// configured bindings and run the first `updategeom`.
pub fn setup<X: XConn + Drw>(wm: &mut WindowManager<X>) -> Result<()> {
    wm.x.take_wm_ownership()?;

    let mut atoms = HashMap::new();
    for atom in Atom::iter() {
        let id = wm.x.intern_atom(atom.as_ref())?;
        atoms.insert(atom, id);
    }
    wm.atoms = atoms;

    let (sw, sh) = wm.x.screen_size()?;
    wm.screen_w = sw;
    wm.screen_h = sh;

    wm.numlock_mask = wm.x.numlock_mask()?;
    wm.bar_height = wm.x.font_height()? + crate::config::BAR_VERTICAL_PADDING;
    wm.lrpad = wm.x.font_height()?;

    let support = wm.x.support_window();
    wm.support_window = Some(support);
    wm.x.set_prop(
        wm.x.root(),
        Atom::NetSupportingWmCheck.as_ref(),
        Prop::Window(vec![support]),
    )?;
    wm.x.set_prop(
        support,
        Atom::NetSupportingWmCheck.as_ref(),
        Prop::Window(vec![support]),
    )?;
    wm.x.set_prop(
        support,
        Atom::NetWmName.as_ref(),
        Prop::UTF8String(vec!["dtwm".into()]),
    )?;
    wm.x.set_prop(
        wm.x.root(),
        Atom::NetSupported.as_ref(),
        Prop::Atom(SUPPORTED_ATOMS.iter().map(|a| a.as_ref().to_string()).collect()),
    )?;
    wm.x.set_prop(wm.x.root(), Atom::NetClientList.as_ref(), Prop::Window(Vec::new()))?;

    let bindings = resolve_bindings(&wm.x, &wm.config)?;
    wm.x.grab_keys_and_buttons(&bindings.keys, &bindings.buttons)?;
    wm.resolved_keys = bindings.keys;
    wm.resolved_buttons = bindings.buttons;

    updategeom(wm)?;

    crate::spawn::reap_existing_children_and_ignore_sigchld();

    if wm.config.params.status_source == crate::config::StatusSource::Clock {
        crate::spawn::start_clock(wm.x.connection_fd());
    }

    Ok(())
}

/// Resolve a [`Config`]'s keysym-name bindings to concrete [`KeyCode`]s
/// against the server's current mapping, leaving button bindings as-is
/// (mouse buttons need no such resolution).
fn resolve_bindings<X: XConn>(x: &X, config: &Config<X>) -> Result<Bindings<X>> {
    let mut keys = Vec::with_capacity(config.keys.len());
    for binding in &config.keys {
        let code = x.keycode_from_keysym_name(&binding.keysym)?;
        let mask = modifiers_mask(&binding.modifiers);
        keys.push(KeyCode { mask, code });
    }

    let buttons = config
        .buttons
        .iter()
        .map(|b| MouseState::new(b.button, b.modifiers.clone()))
        .collect();

    Ok(Bindings { keys, buttons })
}

/// Adopt every already-mapped top-level window found on the root, in the
/// order the server reports them (bottom of stack first), so initial
/// arrival order matches what was already on screen.
pub fn scan<X: XConn>(wm: &mut WindowManager<X>) -> Result<()> {
    let existing = wm.x.existing_clients()?;
    info!(count = existing.len(), "scanning for existing top-level windows");
    for w in existing {
        handle::manage(wm, w)?;
    }
    Ok(())
}

/// Re-query the server's output geometry, deduplicate exact-rectangle
/// matches, then reconcile the result against `wm.monitors`: new rectangles
/// become new monitors (each with a freshly created bar window), monitors
/// whose rectangle disappeared have their clients migrated onto monitor 0
/// and their bar window destroyed, and surviving monitors get their
/// rectangle (and derived working area) refreshed.
///
/// Returns `true` if anything changed, so callers know whether to re-focus
/// and re-arrange.
pub fn updategeom<X: XConn + Drw>(wm: &mut WindowManager<X>) -> Result<bool> {
    let mut rects = wm.x.screen_details()?;
    if rects.is_empty() {
        return Err(Error::NoScreens);
    }
    dedup_rects(&mut rects);

    let mut dirty = false;
    let old_sel_mon = wm.sel_mon;

    // Partition existing monitors into survivors (rectangle still reported)
    // and departed (rectangle gone), recording an old-index -> new-index
    // map for survivors as we go. Every client's `monitor` field is an old
    // index and must be rewritten through this map below, not just the
    // departed monitors' clients: the whole tail of the `Vec` shifts when
    // an earlier monitor is removed.
    let old_monitors = std::mem::take(&mut wm.monitors);
    let mut remap: HashMap<usize, usize> = HashMap::with_capacity(old_monitors.len());
    let mut departed_bars = Vec::new();
    let mut survivors = Vec::with_capacity(old_monitors.len());

    for mut mon in old_monitors {
        match rects.iter().position(|r| *r == mon.m) {
            Some(pos) => {
                rects.remove(pos);
                remap.insert(mon.index, survivors.len());
                survivors.push(mon);
            }
            None => {
                dirty = true;
                if let Some(bar) = mon.bar_window.take() {
                    departed_bars.push(bar);
                }
            }
        }
    }
    wm.monitors = survivors;

    // Whatever rectangles are left over are newly attached outputs.
    for r in rects {
        dirty = true;
        let index = wm.monitors.len();
        let mut mon = Monitor::new(index, r);
        apply_bar_params(wm, &mut mon);
        let bar = wm.x.create_bar_window(mon.bar.geom, mon.bar.top)?;
        mon.bar_window = Some(bar);
        wm.monitors.push(mon);
    }

    for bar in departed_bars {
        wm.x.destroy_bar_window(bar)?;
    }

    // Renumber and refresh working areas for every surviving/new monitor.
    // Survivors keep their relative order at the front, so their position
    // here always matches the `new_index` already recorded in `remap`.
    for (i, mon) in wm.monitors.iter_mut().enumerate() {
        mon.index = i;
        recompute_working_area(mon);
    }

    reindex_clients(wm, &remap);

    wm.sel_mon = remap.get(&old_sel_mon).copied().unwrap_or(0);
    if wm.sel_mon >= wm.monitors.len() {
        wm.sel_mon = 0;
    }

    if dirty {
        info!(monitors = wm.monitors.len(), "monitor layout changed");
    }

    Ok(dirty)
}

/// Remove exact `(x, y, w, h)` duplicates, keeping the first occurrence.
/// Xinerama in particular is known to report a mirrored output twice.
fn dedup_rects(rects: &mut Vec<Rect>) {
    let mut seen: Vec<Rect> = Vec::with_capacity(rects.len());
    rects.retain(|r| {
        if seen.contains(r) {
            false
        } else {
            seen.push(*r);
            true
        }
    });
}

fn apply_bar_params<X: XConn>(wm: &WindowManager<X>, mon: &mut Monitor) {
    mon.bar.shown = wm.config.params.show_bar;
    mon.bar.top = wm.config.params.top_bar;
    mon.mfact = wm.config.params.mfact;
    mon.nmaster = wm.config.params.nmaster;
    mon.bar.geom = Rect::new(mon.m.x, mon.m.y, mon.m.w, wm.bar_height.max(1));
    recompute_working_area(mon);
}

fn recompute_working_area(mon: &mut Monitor) {
    let strip = mon.bar.geom.h;
    mon.w = if !mon.bar.shown {
        mon.m
    } else if mon.bar.top {
        Rect::new(mon.m.x, mon.m.y + strip as i32, mon.m.w, mon.m.h - strip)
    } else {
        Rect::new(mon.m.x, mon.m.y, mon.m.w, mon.m.h - strip)
    };
}

/// Rewrite every client's `monitor` field through the old-index -> new-index
/// `remap` built by `updategeom`. A client whose old monitor has no entry in
/// `remap` (its rectangle disappeared) is re-homed onto monitor 0 and
/// attached to its client/stack lists directly, since the departed
/// monitor's own lists are gone along with it (§8: screen removal migrates
/// all clients of the removed monitor to monitor 0).
fn reindex_clients<X: XConn>(wm: &mut WindowManager<X>, remap: &HashMap<usize, usize>) {
    if wm.monitors.is_empty() {
        return;
    }
    let ids: Vec<_> = wm.clients.keys().copied().collect();
    for id in ids {
        let old = wm.clients[&id].monitor;
        match remap.get(&old) {
            Some(&new) => {
                if let Some(c) = wm.clients.get_mut(&id) {
                    c.monitor = new;
                }
            }
            None => {
                if let Some(c) = wm.clients.get_mut(&id) {
                    c.monitor = 0;
                }
                wm.monitors[0].attach(id);
                wm.monitors[0].attach_stack(id);
            }
        }
    }
}

/// Restore every managed client's border width to its pre-management value
/// and release the pointer/keyboard grabs, so whatever runs next (another
/// window manager, or nothing) inherits a clean session.
pub fn shutdown<X: XConn>(wm: &mut WindowManager<X>) -> Result<()> {
    let ids: Vec<_> = wm.clients.keys().copied().collect();
    for id in ids {
        if let Err(e) = wm.x.set_border_color(id, 0) {
            warn!(%id, %e, "failed to restore client border on shutdown");
        }
    }
    wm.x.ungrab_pointer()?;
    wm.x.sync()
}
