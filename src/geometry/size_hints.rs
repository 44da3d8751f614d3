//! ICCCM 4.1.2.3 `WM_NORMAL_HINTS` handling.
//!
//! A client's [`SizeHints`] constrain the rectangles the tiler and the
//! interactive resize pump are allowed to hand it: a base/minimum size, an
//! optional maximum, a resize increment grid and a min/max aspect ratio.
use crate::geometry::rect::Rect;

/// Parsed `WM_NORMAL_HINTS` for a single client.
///
/// All fields default to `0`, which the apply routine treats as "no
/// constraint in this dimension" per ICCCM.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SizeHints {
    pub base_w: u32,
    pub base_h: u32,
    pub min_w: u32,
    pub min_h: u32,
    pub max_w: u32,
    pub max_h: u32,
    pub inc_w: u32,
    pub inc_h: u32,
    pub min_aspect: Option<(u32, u32)>,
    pub max_aspect: Option<(u32, u32)>,
}

impl SizeHints {
    /// `true` once this client's normal hints have a fixed size: `maxw ==
    /// minw > 0 && maxh == minh > 0`. Fixed clients are forced floating.
    pub fn is_fixed(&self) -> bool {
        self.max_w > 0 && self.max_w == self.min_w && self.max_h > 0 && self.max_h == self.min_h
    }
}

/// Result of [`apply_size_hints`]: the clamped rectangle plus whether it
/// differs from the client's previously known geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clamped {
    pub r: Rect,
    pub changed: bool,
}

/// Apply ICCCM 4.1.2.3 size-hint and bounding-area clamping to a candidate
/// geometry for `current` (the client's existing geometry).
///
/// `bounds` is the area the window must stay within: the full screen during
/// an interactive move/resize (`interact == true`), or the owning monitor's
/// working area otherwise — in the latter case the window only has to
/// *overlap* `bounds`, it need not be fully contained.
///
/// `apply_hints` controls whether the ICCCM base/min/max/inc/aspect
/// constraints are honored at all: the core only calls this with `true` for
/// floating clients, clients with no active tiling arranger, or when the
/// `resizehints` configuration flag is set; tiled clients under a live
/// arranger otherwise only get the positional clamp.
#[allow(clippy::too_many_arguments)]
pub fn apply_size_hints(
    hints: &SizeHints,
    current: Rect,
    mut x: i32,
    mut y: i32,
    mut w: u32,
    mut h: u32,
    bounds: Rect,
    interact: bool,
    bar_height: u32,
    apply_hints: bool,
) -> Clamped {
    w = w.max(1);
    h = h.max(1).max(bar_height);

    if interact {
        clamp_into_bounds(&mut x, &mut y, w, h, &bounds, true);
    } else {
        clamp_into_bounds(&mut x, &mut y, w, h, &bounds, false);
    }

    if apply_hints {
        (w, h) = apply_icccm(hints, w, h);
    }

    let r = Rect::new(x, y, w, h);
    let changed = r != current;

    Clamped { r, changed }
}

/// Position `(x, y)` so that a `w x h` window remains either fully inside
/// `bounds` (`full == true`, used for interactive moves against the whole
/// screen) or merely overlapping it (the working-area case: a window may
/// hang off the edge of its monitor but must not end up entirely outside
/// it).
fn clamp_into_bounds(x: &mut i32, y: &mut i32, w: u32, h: u32, bounds: &Rect, full: bool) {
    if full {
        *x = (*x).clamp(bounds.x, bounds.x + bounds.w as i32 - w as i32);
        *y = (*y).clamp(bounds.y, bounds.y + bounds.h as i32 - h as i32);
    } else {
        // must keep at least one pixel of overlap with the working area
        if *x > bounds.x + bounds.w as i32 {
            *x = bounds.x + bounds.w as i32 - w as i32;
        }
        if *y > bounds.y + bounds.h as i32 {
            *y = bounds.y + bounds.h as i32 - h as i32;
        }
        if *x + w as i32 < bounds.x {
            *x = bounds.x;
        }
        if *y + h as i32 < bounds.y {
            *y = bounds.y;
        }
    }
}

/// The ICCCM 4.1.2.3 base/min/max/inc/aspect algorithm, applied exactly as
/// dwm's `applysizehints` does it: subtract base before the aspect
/// calculation unless base == min ("baseismin", in which case the last two
/// sentences of 4.1.2.3 say to skip it there and subtract only before the
/// increment calculation instead), re-add base, then clamp to `[min, max]`.
fn apply_icccm(hints: &SizeHints, mut w: u32, mut h: u32) -> (u32, u32) {
    let base_w = if hints.base_w > 0 {
        hints.base_w
    } else {
        hints.min_w
    };
    let base_h = if hints.base_h > 0 {
        hints.base_h
    } else {
        hints.min_h
    };
    let base_is_min = base_w == hints.min_w && base_h == hints.min_h;

    let mut ww = w as f64;
    let mut hh = h as f64;
    if !base_is_min {
        ww -= base_w as f64;
        hh -= base_h as f64;
    }

    if let Some((min_x, min_y)) = hints.min_aspect {
        let min_a = min_x as f64 / min_y as f64;
        if min_a > ww / hh.max(1.0) {
            hh = ww / min_a;
        }
    }
    if let Some((max_x, max_y)) = hints.max_aspect {
        let max_a = max_x as f64 / max_y as f64;
        if max_a < ww / hh.max(1.0) {
            ww = hh * max_a;
        }
    }

    if base_is_min {
        ww -= base_w as f64;
        hh -= base_h as f64;
    }

    if hints.inc_w > 0 {
        ww -= ww % hints.inc_w as f64;
    }
    if hints.inc_h > 0 {
        hh -= hh % hints.inc_h as f64;
    }

    w = (ww + 0.5) as u32 + base_w;
    h = (hh + 0.5) as u32 + base_h;

    if hints.min_w > 0 {
        w = w.max(hints.min_w);
    }
    if hints.min_h > 0 {
        h = h.max(hints.min_h);
    }
    if hints.max_w > 0 {
        w = w.min(hints.max_w);
    }
    if hints.max_h > 0 {
        h = h.min(hints.max_h);
    }

    (w.max(1), h.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> Rect {
        Rect::new(0, 0, 1920, 1080)
    }

    #[test]
    fn idempotent_when_applied_twice() {
        let hints = SizeHints {
            min_w: 100,
            min_h: 100,
            inc_w: 10,
            inc_h: 10,
            base_w: 20,
            base_h: 20,
            ..Default::default()
        };
        let current = Rect::new(10, 10, 237, 237);

        let first = apply_size_hints(&hints, current, 10, 10, 237, 237, screen(), false, 0, true);
        assert!(first.changed);

        let second = apply_size_hints(
            &hints, first.r, first.r.x, first.r.y, first.r.w, first.r.h, screen(), false, 0, true,
        );
        assert!(!second.changed);
        assert_eq!(first.r, second.r);
    }

    #[test]
    fn fixed_size_client_is_fixed() {
        let hints = SizeHints {
            min_w: 400,
            max_w: 400,
            min_h: 300,
            max_h: 300,
            ..Default::default()
        };
        assert!(hints.is_fixed());
    }

    #[test]
    fn min_max_are_respected() {
        let hints = SizeHints {
            min_w: 200,
            min_h: 200,
            max_w: 300,
            max_h: 300,
            ..Default::default()
        };
        let current = Rect::new(0, 0, 100, 100);
        let clamped = apply_size_hints(&hints, current, 0, 0, 100, 500, screen(), true, 0, true);
        assert_eq!(clamped.r.w, 200);
        assert_eq!(clamped.r.h, 300);
    }

    #[test]
    fn no_hints_applied_when_flag_is_false() {
        let hints = SizeHints {
            min_w: 500,
            min_h: 500,
            ..Default::default()
        };
        let current = Rect::new(0, 0, 10, 10);
        let clamped = apply_size_hints(&hints, current, 0, 0, 10, 10, screen(), true, 0, false);
        // tiled clients under a live arranger skip ICCCM sizing entirely
        assert_eq!(clamped.r.w, 10);
        assert_eq!(clamped.r.h, 10);
    }

    #[test]
    fn aspect_is_computed_on_raw_size_when_base_equals_min() {
        // base == min ("baseismin"): the ICCCM 4.1.2.3 aspect calculation
        // must run against the untouched w/h, not w/h with base already
        // subtracted out, so the output aspect ratio lands exactly on
        // max_aspect.
        let hints = SizeHints {
            min_w: 100,
            base_w: 100,
            min_h: 50,
            base_h: 50,
            max_aspect: Some((2, 1)),
            ..Default::default()
        };
        let current = Rect::new(0, 0, 300, 100);
        let clamped = apply_size_hints(&hints, current, 0, 0, 300, 100, screen(), true, 0, true);
        assert_eq!((clamped.r.w, clamped.r.h), (200, 100));
    }
}
