//! The status bar (§4.7).
//!
//! Actual glyph rendering, colormap management and font metrics are treated
//! as a fixed, external drawable API (§1 OUT OF SCOPE): [`Drw`] is the seam,
//! implementations live with the chosen [`crate::x::XConn`] backend. This
//! module owns the *layout* of the bar — which cell goes where, which
//! scheme it uses — and the reverse mapping from a click's x-offset back to
//! a [`crate::bindings::ClickTarget`].
use crate::bindings::ClickTarget;
use crate::color::ColorScheme;
use crate::geometry::Rect;
use crate::model::{TagMask, Xid};
use crate::state::WindowManager;
use crate::x::XConn;
use crate::Result;

/// A drawing surface capable of the small set of primitives a text-only bar
/// needs. Kept as a trait so the core never depends on a particular font or
/// rendering backend.
pub trait Drw {
    fn text_width(&self, s: &str) -> Result<u32>;
    /// The active font's line height, used to size the bar strip (dwm's
    /// `bh = drw->fonts->h + 2`, the +2 folded in by the implementation).
    fn font_height(&self) -> Result<u32>;
    fn fill_rect(&self, id: Xid, x: i32, y: i32, w: u32, h: u32, scheme: ColorScheme) -> Result<()>;
    fn draw_text(&self, id: Xid, x: i32, y: i32, w: u32, scheme: ColorScheme, s: &str) -> Result<()>;
    /// Draw the small top-left "tag occupied" square. Only called for tags
    /// that actually have a client on them. `filled` selects a solid square
    /// (the selected client also carries this tag) versus an outline;
    /// `urgent` additionally asks the implementation to render it inverted,
    /// per dwm's `drw_rect(..., invert=urg)`.
    fn draw_indicator(&self, id: Xid, x: i32, y: i32, filled: bool, urgent: bool, scheme: ColorScheme) -> Result<()>;

    /// Create and map an override-redirect window to back a monitor's bar,
    /// at `r` (the bar's full-width strip), created fresh each time
    /// `updategeom` discovers a monitor with none yet.
    fn create_bar_window(&self, r: Rect, top: bool) -> Result<Xid>;
    /// Unmap and destroy a bar window, called when `updategeom` loses the
    /// monitor it belongs to.
    fn destroy_bar_window(&self, id: Xid) -> Result<()>;
}

/// One horizontal cell in the rendered bar.
#[derive(Debug, Clone, Copy)]
pub struct Cell {
    pub target: ClickTarget,
    pub x: i32,
    pub w: u32,
    /// For `ClickTarget::TagBar` cells, the tag index this cell represents.
    pub tag_ix: Option<usize>,
}

/// Lay out the bar's cells left to right: one per tag, then the layout
/// symbol, then the title (filling the remainder), then (selected monitor
/// only) the status text right-aligned.
///
/// `text_width` is the caller's glyph-measurement hook (`lrpad` already
/// added on top of each piece's raw extent, per §4.7: "text widths = glyph
/// run + lrpad").
pub fn layout_cells(
    bar_width: u32,
    lrpad: u32,
    tags: &[String],
    layout_symbol: &str,
    status: Option<&str>,
    mut text_width: impl FnMut(&str) -> Result<u32>,
) -> Result<Vec<Cell>> {
    let mut cells = Vec::with_capacity(tags.len() + 2);
    let mut x = 0i32;

    for (ix, tag) in tags.iter().enumerate() {
        let w = text_width(tag)? + lrpad;
        cells.push(Cell {
            target: ClickTarget::TagBar,
            x,
            w,
            tag_ix: Some(ix),
        });
        x += w as i32;
    }

    let sym_w = text_width(layout_symbol)? + lrpad;
    cells.push(Cell {
        target: ClickTarget::LayoutSymbol,
        x,
        w: sym_w,
        tag_ix: None,
    });
    x += sym_w as i32;

    let status_w = match status {
        Some(s) => text_width(s)? + lrpad,
        None => 0,
    };

    let title_w = (bar_width as i32 - x - status_w as i32).max(0) as u32;
    cells.push(Cell {
        target: ClickTarget::WinTitle,
        x,
        w: title_w,
        tag_ix: None,
    });
    x += title_w as i32;

    if let Some(_s) = status {
        cells.push(Cell {
            target: ClickTarget::StatusText,
            x,
            w: status_w,
            tag_ix: None,
        });
    }

    Ok(cells)
}

/// Resolve a click's x-offset within the bar back to the cell (and, for a
/// tag cell, the tag index) it landed in.
pub fn click_target(cells: &[Cell], x: i32) -> Option<Cell> {
    cells
        .iter()
        .find(|c| x >= c.x && x < c.x + c.w as i32)
        .copied()
}

/// `true` iff the top-left occupancy indicator for `tag_ix` should render
/// filled: the selected client on the selected monitor carries that tag.
pub fn indicator_filled(selected_client_tags: Option<crate::model::TagMask>, tag_ix: usize) -> bool {
    selected_client_tags
        .map(|t| t.contains(tag_ix))
        .unwrap_or(false)
}

/// `true` iff any urgent client carries `tag_ix`, rendering the indicator
/// hollow instead of empty.
pub fn indicator_urgent(urgent_tags: crate::model::TagMask, tag_ix: usize) -> bool {
    urgent_tags.contains(tag_ix)
}

/// Re-lay-out and paint `mon`'s bar, caching the resulting cells so a
/// subsequent `ButtonPress` on the bar can be resolved back to a click
/// target without re-running layout.
pub fn redraw<X: XConn + Drw>(wm: &mut WindowManager<X>, mon: usize) -> Result<()> {
    let m = wm.monitors[mon].clone();
    let Some(bar) = m.bar_window else {
        return Ok(());
    };
    if !m.bar.shown {
        return Ok(());
    }

    let tags = wm.config.tags.clone();
    let status = if mon == wm.sel_mon {
        Some(wm.status_text.clone())
    } else {
        None
    };
    let lrpad = wm.lrpad;
    let bar_width = m.bar.geom.w;

    let cells = layout_cells(bar_width, lrpad, &tags, &m.layout_symbol, status.as_deref(), |s| {
        wm.x.text_width(s)
    })?;

    let selected_tags = m.selected_tags();
    let selected_client_tags = wm
        .selected_client_on(mon)
        .and_then(|id| wm.clients.get(&id))
        .map(|c| c.tags);
    let urgent_tags = m
        .clients
        .iter()
        .filter_map(|id| wm.clients.get(id))
        .filter(|c| c.is_urgent())
        .fold(TagMask::NONE, |acc, c| acc.union(c.tags));
    let occupied_tags = m
        .clients
        .iter()
        .filter_map(|id| wm.clients.get(id))
        .fold(TagMask::NONE, |acc, c| acc.union(c.tags));

    let title = wm
        .selected_client_on(mon)
        .and_then(|id| wm.clients.get(&id))
        .map(|c| c.name.as_str())
        .unwrap_or("");

    for cell in &cells {
        let scheme = match (cell.target, cell.tag_ix) {
            (ClickTarget::TagBar, Some(ix)) if selected_tags.contains(ix) => wm.config.selected_scheme,
            _ => wm.config.normal_scheme,
        };

        wm.x.fill_rect(bar, cell.x, 0, cell.w, m.bar.geom.h, scheme)?;

        let text = match cell.target {
            ClickTarget::TagBar => tags.get(cell.tag_ix.unwrap_or(0)).map(String::as_str).unwrap_or(""),
            ClickTarget::LayoutSymbol => m.layout_symbol.as_str(),
            ClickTarget::WinTitle => title,
            ClickTarget::StatusText => wm.status_text.as_str(),
            _ => "",
        };
        wm.x.draw_text(bar, cell.x, 0, cell.w, scheme, text)?;

        if let Some(ix) = cell.tag_ix {
            if occupied_tags.contains(ix) {
                let filled = indicator_filled(selected_client_tags, ix);
                let urgent = indicator_urgent(urgent_tags, ix);
                wm.x.draw_indicator(bar, cell.x, 0, filled, urgent, scheme)?;
            }
        }
    }

    if wm.bar_cells.len() <= mon {
        wm.bar_cells.resize(mon + 1, Vec::new());
    }
    wm.bar_cells[mon] = cells;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_fills_remainder_and_status_is_right_aligned() {
        let tags = vec!["1".into(), "2".into()];
        let cells = layout_cells(800, 4, &tags, "[]=", Some("12:00"), |s| {
            Ok(s.len() as u32 * 10)
        })
        .unwrap();

        let status_cell = cells.iter().find(|c| c.target == ClickTarget::StatusText).unwrap();
        assert_eq!(status_cell.x + status_cell.w as i32, 800);

        let title_cell = cells.iter().find(|c| c.target == ClickTarget::WinTitle).unwrap();
        assert!(title_cell.w > 0);
    }

    #[test]
    fn click_target_resolves_to_the_right_cell() {
        let tags = vec!["1".into()];
        let cells = layout_cells(800, 4, &tags, "[]=", None, |s| Ok(s.len() as u32 * 10)).unwrap();
        let tag_cell = click_target(&cells, 1).unwrap();
        assert_eq!(tag_cell.tag_ix, Some(0));
    }
}
