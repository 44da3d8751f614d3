//! Tiling arrangers (§4.3).
mod monocle;
mod tile;

pub use monocle::monocle;
pub use tile::tile;

use crate::geometry::Rect;
use crate::model::Xid;

/// Everything an arranger needs: the monitor's working area (bar strip
/// already excluded), its master-area fraction and master count, and the
/// visible tiled clients in monitor order.
pub struct ArrangeParams<'a> {
    pub working_area: Rect,
    pub mfact: f64,
    pub nmaster: u32,
    pub border_width: u32,
    pub clients: &'a [Xid],
}

/// An arranger maps a set of visible tiled clients to geometries. It may
/// also override the monitor's cached layout symbol (monocle's `[N]`).
pub type Arranger = fn(&ArrangeParams) -> (Vec<(Xid, Rect)>, Option<String>);

/// A (symbol, arranger) pair. `arrange` is `None` for the floating layout:
/// the tiler leaves every client's geometry untouched.
#[derive(Clone, Copy)]
pub struct Layout {
    pub symbol: &'static str,
    pub arrange: Option<Arranger>,
}

impl Layout {
    pub const fn new(symbol: &'static str, arrange: Arranger) -> Self {
        Layout {
            symbol,
            arrange: Some(arrange),
        }
    }

    pub const fn floating() -> Self {
        Layout {
            symbol: "><>",
            arrange: None,
        }
    }
}
