//! The modal `movemouse`/`resizemouse` pumps (§4.5 final paragraph).
//!
//! Both grab the pointer and then run their own inner event loop rather than
//! returning to [`super::run`]: other clients must keep repainting and
//! negotiating geometry while the drag is held, so `Expose`, `MapRequest`
//! and `ConfigureRequest` are still routed through [`super::dispatch`] from
//! inside the pump. The loop exits on `ButtonRelease`.
use std::time::{Duration, Instant};

use crate::bar::Drw;
use crate::focus;
use crate::geometry::Rect;
use crate::model::Xid;
use crate::state::WindowManager;
use crate::x::{StackMode, WindowConfig, XConn, XEvent};
use crate::Result;

/// Motion events rarer than this are ignored, capping the pump at ~60 Hz.
const MOTION_INTERVAL: Duration = Duration::from_millis(1000 / 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Move,
    Resize,
}

pub fn movemouse<X: XConn + Drw>(wm: &mut WindowManager<X>, id: Xid) -> Result<()> {
    pump(wm, id, Mode::Move)
}

pub fn resizemouse<X: XConn + Drw>(wm: &mut WindowManager<X>, id: Xid) -> Result<()> {
    pump(wm, id, Mode::Resize)
}

fn pump<X: XConn + Drw>(wm: &mut WindowManager<X>, id: Xid, mode: Mode) -> Result<()> {
    let Some(client) = wm.clients.get(&id).cloned() else {
        return Ok(());
    };
    if client.is_fullscreen() {
        return Ok(());
    }

    let mon = client.monitor;
    let start_geom = client.geom;
    let start_ptr = wm.x.cursor_position()?;
    let snap = wm.config.params.snap as i32;

    match mode {
        Mode::Move => wm.x.grab_pointer_for_motion()?,
        Mode::Resize => wm.x.grab_pointer_for_resize()?,
    }

    let mut was_floating = client.is_floating();
    let mut last_motion = Instant::now() - MOTION_INTERVAL;

    // Run the pump in a closure so a mid-drag error still releases the
    // pointer grab below instead of leaving it held.
    let pump_result: Result<()> = (|| loop {
        let Some(ev) = wm.x.poll_event()? else {
            std::thread::sleep(Duration::from_millis(1));
            continue;
        };

        match ev {
            XEvent::ButtonRelease(_) => return Ok(()),
            XEvent::MotionNotify(p) => {
                if last_motion.elapsed() < MOTION_INTERVAL {
                    continue;
                }
                last_motion = Instant::now();

                let dx = p.x - start_ptr.x;
                let dy = p.y - start_ptr.y;

                let candidate = match mode {
                    Mode::Move => Rect::new(start_geom.x + dx, start_geom.y + dy, start_geom.w, start_geom.h),
                    Mode::Resize => Rect::new(
                        start_geom.x,
                        start_geom.y,
                        (start_geom.w as i32 + dx).max(1) as u32,
                        (start_geom.h as i32 + dy).max(1) as u32,
                    ),
                };

                if !was_floating && (dx.abs() > snap || dy.abs() > snap) {
                    if let Some(c) = wm.clients.get_mut(&id) {
                        c.set_floating(true);
                    }
                    was_floating = true;
                    focus::arrange(wm, mon)?;
                }

                let snapped = snap_to_edges(wm, mon, id, candidate, snap);

                if let Some(c) = wm.clients.get_mut(&id) {
                    c.geom = snapped;
                }
                wm.x.configure(
                    id,
                    WindowConfig {
                        r: snapped,
                        border_width: wm.clients[&id].border_width,
                        stack_mode: Some(StackMode::Top),
                    },
                )?;
                wm.x.flush();
            }
            XEvent::Expose(e) => {
                super::handle::expose(wm, e)?;
            }
            XEvent::MapRequest(w) => {
                super::handle::map_request(wm, w)?;
            }
            XEvent::ConfigureRequest(e) => {
                super::handle::configure_request(wm, e)?;
            }
            _ => {}
        }
    })();

    wm.x.ungrab_pointer()?;
    pump_result?;

    // If the client ended up mostly on another monitor, transfer it there.
    if let Some(geom) = wm.clients.get(&id).map(|c| c.geom) {
        if let Some(target) = monitor_with_most_overlap(wm, geom) {
            if target != mon {
                if let Some(c) = wm.clients.get_mut(&id) {
                    c.monitor = target;
                }
                wm.monitors[mon].detach(id);
                wm.monitors[target].attach(id);
                wm.monitors[target].attach_stack(id);
                focus::arrange(wm, mon)?;
            }
        }
    }

    focus::arrange(wm, wm.clients.get(&id).map(|c| c.monitor).unwrap_or(mon))
}

/// Snap `candidate`'s edges to the monitor's working-area edges and to
/// sibling clients' edges when within `snap` pixels.
fn snap_to_edges<X: XConn>(wm: &WindowManager<X>, mon: usize, id: Xid, mut candidate: Rect, snap: i32) -> Rect {
    if snap <= 0 {
        return candidate;
    }

    let w = wm.monitors[mon].w;
    let left = w.x;
    let right = w.x + w.w as i32;
    let top = w.y;
    let bottom = w.y + w.h as i32;

    if (candidate.x - left).abs() <= snap {
        candidate.x = left;
    }
    if (candidate.x + candidate.w as i32 - right).abs() <= snap {
        candidate.x = right - candidate.w as i32;
    }
    if (candidate.y - top).abs() <= snap {
        candidate.y = top;
    }
    if (candidate.y + candidate.h as i32 - bottom).abs() <= snap {
        candidate.y = bottom - candidate.h as i32;
    }

    for &other_id in &wm.monitors[mon].clients {
        if other_id == id {
            continue;
        }
        let Some(other) = wm.clients.get(&other_id) else {
            continue;
        };
        let o = other.geom;

        if (candidate.x - (o.x + o.w as i32)).abs() <= snap {
            candidate.x = o.x + o.w as i32;
        }
        if (candidate.x + candidate.w as i32 - o.x).abs() <= snap {
            candidate.x = o.x - candidate.w as i32;
        }
        if (candidate.y - (o.y + o.h as i32)).abs() <= snap {
            candidate.y = o.y + o.h as i32;
        }
        if (candidate.y + candidate.h as i32 - o.y).abs() <= snap {
            candidate.y = o.y - candidate.h as i32;
        }
    }

    candidate
}

fn monitor_with_most_overlap<X: XConn>(wm: &WindowManager<X>, geom: Rect) -> Option<usize> {
    wm.monitors
        .iter()
        .max_by_key(|m| m.m.overlap_area(&geom))
        .map(|m| m.index)
}

