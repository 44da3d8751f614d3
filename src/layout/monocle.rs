//! The monocle arranger: every visible tiled client fills the working area.
use crate::geometry::Rect;
use crate::layout::ArrangeParams;
use crate::model::Xid;

pub fn monocle(p: &ArrangeParams) -> (Vec<(Xid, Rect)>, Option<String>) {
    let n = p.clients.len();
    if n == 0 {
        return (Vec::new(), Some("[0]".into()));
    }

    let w = p.working_area;
    let bw = p.border_width;
    let r = Rect::new(
        w.x,
        w.y,
        w.w.saturating_sub(2 * bw).max(1),
        w.h.saturating_sub(2 * bw).max(1),
    );

    let positions = p.clients.iter().map(|&id| (id, r)).collect();
    (positions, Some(format!("[{n}]")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_client_fills_the_working_area() {
        let clients = vec![Xid(1), Xid(2)];
        let p = ArrangeParams {
            working_area: Rect::new(0, 0, 1920, 1080),
            mfact: 0.5,
            nmaster: 1,
            border_width: 1,
            clients: &clients,
        };
        let (positions, symbol) = monocle(&p);
        assert_eq!(symbol.as_deref(), Some("[2]"));
        assert_eq!(positions.len(), 2);
        assert!(positions.iter().all(|(_, r)| r.w == 1918 && r.h == 1078));
    }
}
