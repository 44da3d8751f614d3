//! The master/stack arranger.
use crate::geometry::Rect;
use crate::layout::ArrangeParams;
use crate::model::Xid;

/// Place `n` visible tiled clients into a master column (up to `nmaster` of
/// them, full working-area width unless there is also a stack column) and a
/// stack column, each client's available height split evenly among its
/// column with the remainder going to the last row (§4.3).
pub fn tile(p: &ArrangeParams) -> (Vec<(Xid, Rect)>, Option<String>) {
    let n = p.clients.len();
    if n == 0 {
        return (Vec::new(), None);
    }

    let ArrangeParams {
        working_area: w,
        mfact,
        nmaster,
        border_width: bw,
        ..
    } = *p;

    let mw = if n > nmaster as usize && nmaster > 0 {
        (w.w as f64 * mfact) as u32
    } else if nmaster > 0 {
        w.w
    } else {
        0
    };

    let mut out = Vec::with_capacity(n);
    let mut my: u32 = 0;
    let mut ty: u32 = 0;

    for (i, &id) in p.clients.iter().enumerate() {
        if i < nmaster as usize {
            let remaining_rows = (n.min(nmaster as usize) - i) as u32;
            let h = (w.h - my) / remaining_rows.max(1);
            let r = Rect::new(
                w.x,
                w.y + my as i32,
                mw.saturating_sub(2 * bw).max(1),
                h.saturating_sub(2 * bw).max(1),
            );
            out.push((id, r));
            my += h;
        } else {
            let remaining_rows = (n - i) as u32;
            let h = (w.h - ty) / remaining_rows.max(1);
            let r = Rect::new(
                w.x + mw as i32,
                w.y + ty as i32,
                (w.w - mw).saturating_sub(2 * bw).max(1),
                h.saturating_sub(2 * bw).max(1),
            );
            out.push((id, r));
            ty += h;
        }
    }

    (out, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Xid;

    #[test]
    fn single_master_takes_full_width_with_one_client() {
        let clients = vec![Xid(1)];
        let p = ArrangeParams {
            working_area: Rect::new(0, 0, 1920, 1080),
            mfact: 0.5,
            nmaster: 1,
            border_width: 2,
            clients: &clients,
        };
        let (positions, symbol) = tile(&p);
        assert!(symbol.is_none());
        assert_eq!(positions.len(), 1);
        let (id, r) = positions[0];
        assert_eq!(id, Xid(1));
        assert_eq!(r.w, 1920 - 4);
        assert_eq!(r.h, 1080 - 4);
    }

    #[test]
    fn splits_master_and_stack_columns() {
        let clients = vec![Xid(1), Xid(2), Xid(3)];
        let p = ArrangeParams {
            working_area: Rect::new(0, 0, 1000, 1000),
            mfact: 0.5,
            nmaster: 1,
            border_width: 0,
            clients: &clients,
        };
        let (positions, _) = tile(&p);
        assert_eq!(positions.len(), 3);
        // master column
        assert_eq!(positions[0].1.w, 500);
        assert_eq!(positions[0].1.h, 1000);
        // stack column split evenly between the two remaining clients
        assert_eq!(positions[1].1.x, 500);
        assert_eq!(positions[1].1.h, 500);
        assert_eq!(positions[2].1.h, 500);
    }

    #[test]
    fn zero_nmaster_gives_stack_full_width() {
        let clients = vec![Xid(1), Xid(2)];
        let p = ArrangeParams {
            working_area: Rect::new(0, 0, 800, 600),
            mfact: 0.5,
            nmaster: 0,
            border_width: 0,
            clients: &clients,
        };
        let (positions, _) = tile(&p);
        assert_eq!(positions[0].1.w, 800);
        assert_eq!(positions[0].1.x, 0);
    }
}
