//! Pattern builder: walks the interior grid lines and picks each tab's
//! apex by the configured alternation rule.
//!
//! All horizontal tabs come first (line by line), then all vertical tabs.
//! Order only matters where strokes overlap; later tabs draw on top.

use crate::config::Pattern;
use crate::grid::GridLayout;
use crate::tab::{Apex, TabCurve};

pub struct PatternBuilder<'a> {
    layout: &'a GridLayout,
    pattern: Pattern,
}

impl<'a> PatternBuilder<'a> {
    pub fn new(layout: &'a GridLayout, pattern: Pattern) -> Self {
        Self { layout, pattern }
    }

    /// Number of tabs [`curves`](Self::curves) yields, saturating at
    /// `usize::MAX`.
    pub fn tab_count(&self) -> usize {
        let rows = self.layout.rows() as usize;
        let cols = self.layout.cols() as usize;
        rows.saturating_sub(1)
            .saturating_mul(cols)
            .saturating_add(cols.saturating_sub(1).saturating_mul(rows))
    }

    /// Apex for tab `i2` on horizontal line `i`.
    pub fn horizontal_apex(&self, i: u32, i2: u32) -> Apex {
        let (alternate, _) = self.pattern.alternation();
        if pick_first(alternate, i, i2) {
            Apex::Up
        } else {
            Apex::Down
        }
    }

    /// Apex for tab `i2` on vertical line `i`.
    pub fn vertical_apex(&self, i: u32, i2: u32) -> Apex {
        let (_, alternate) = self.pattern.alternation();
        if pick_first(alternate, i, i2) {
            Apex::Right
        } else {
            Apex::Left
        }
    }

    /// Lazily generate every tab in draw order.
    pub fn curves(&self) -> impl Iterator<Item = TabCurve> + '_ {
        let rows = self.layout.rows();
        let cols = self.layout.cols();

        let horizontal = (0..rows.saturating_sub(1)).flat_map(move |i| {
            (0..cols).map(move |i2| {
                TabCurve::generate(self.horizontal_apex(i, i2), i, i2, self.layout)
            })
        });
        let vertical = (0..cols.saturating_sub(1)).flat_map(move |i| {
            (0..rows).map(move |i2| {
                TabCurve::generate(self.vertical_apex(i, i2), i, i2, self.layout)
            })
        });
        horizontal.chain(vertical)
    }

    pub fn build(&self) -> Vec<TabCurve> {
        let mut out = Vec::with_capacity(self.tab_count());
        out.extend(self.curves());
        out
    }
}

/// On alternating even lines the first apex goes to odd cells, otherwise
/// to even cells.
#[inline]
fn pick_first(alternate: bool, i: u32, i2: u32) -> bool {
    if alternate && i % 2 == 0 {
        i2 % 2 == 1
    } else {
        i2 % 2 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::RectI;

    fn layout(w: i32, h: i32) -> GridLayout {
        GridLayout::new(RectI::new(0, 0, w, h), 1.0, (0.0, 0.0)).unwrap()
    }

    fn apexes(curves: &[TabCurve], horizontal: bool, line: u32) -> Vec<Apex> {
        curves
            .iter()
            .filter(|c| c.apex.is_horizontal() == horizontal && c.i == line)
            .map(|c| c.apex)
            .collect()
    }

    #[test]
    fn test_300x300_has_twelve_tabs() {
        let g = layout(300, 300);
        let b = PatternBuilder::new(&g, Pattern::AltHorVer);
        let curves = b.build();
        assert_eq!(curves.len(), 12);
        assert_eq!(b.tab_count(), 12);
        assert_eq!(curves.iter().filter(|c| c.apex.is_horizontal()).count(), 6);
    }

    #[test]
    fn test_horizontal_tabs_come_first_row_major() {
        let g = layout(300, 300);
        let curves = PatternBuilder::new(&g, Pattern::AltHorVer).build();
        let order: Vec<(bool, u32, u32)> = curves
            .iter()
            .map(|c| (c.apex.is_horizontal(), c.i, c.i2))
            .collect();
        assert_eq!(
            order,
            vec![
                (true, 0, 0),
                (true, 0, 1),
                (true, 0, 2),
                (true, 1, 0),
                (true, 1, 1),
                (true, 1, 2),
                (false, 0, 0),
                (false, 0, 1),
                (false, 0, 2),
                (false, 1, 0),
                (false, 1, 1),
                (false, 1, 2),
            ]
        );
    }

    #[test]
    fn test_alt_hor_ver_alternates_by_line() {
        let g = layout(300, 300);
        let curves = PatternBuilder::new(&g, Pattern::AltHorVer).build();
        use Apex::*;
        assert_eq!(apexes(&curves, true, 0), vec![Down, Up, Down]);
        assert_eq!(apexes(&curves, true, 1), vec![Up, Down, Up]);
        assert_eq!(apexes(&curves, false, 0), vec![Left, Right, Left]);
        assert_eq!(apexes(&curves, false, 1), vec![Right, Left, Right]);
    }

    #[test]
    fn test_alt_none_depends_only_on_cell_parity() {
        let g = layout(300, 300);
        let curves = PatternBuilder::new(&g, Pattern::AltNone).build();
        assert_eq!(apexes(&curves, true, 0), apexes(&curves, true, 1));
        assert_eq!(apexes(&curves, false, 0), apexes(&curves, false, 1));
        assert_eq!(
            apexes(&curves, true, 0),
            vec![Apex::Up, Apex::Down, Apex::Up]
        );
    }

    #[test]
    fn test_single_axis_alternation() {
        let g = layout(300, 300);
        let hor = PatternBuilder::new(&g, Pattern::AltHor).build();
        assert_ne!(apexes(&hor, true, 0), apexes(&hor, true, 1));
        assert_eq!(apexes(&hor, false, 0), apexes(&hor, false, 1));

        let ver = PatternBuilder::new(&g, Pattern::AltVer).build();
        assert_eq!(apexes(&ver, true, 0), apexes(&ver, true, 1));
        assert_ne!(apexes(&ver, false, 0), apexes(&ver, false, 1));
    }

    #[test]
    fn test_non_square_grid_counts() {
        let g = layout(500, 200);
        assert_eq!((g.rows(), g.cols()), (2, 5));
        let b = PatternBuilder::new(&g, Pattern::AltHorVer);
        let curves = b.build();
        // One horizontal line of 5 tabs, four vertical lines of 2 tabs.
        assert_eq!(curves.len(), 5 + 4 * 2);
        assert_eq!(b.tab_count(), curves.len());
    }

    #[test]
    fn test_tab_count_of_dense_grid() {
        let g = GridLayout::new(RectI::new(0, 0, 1000, 1000), 0.03, (0.0, 0.0)).unwrap();
        assert_eq!((g.rows(), g.cols()), (333, 333));
        let b = PatternBuilder::new(&g, Pattern::AltHorVer);
        assert_eq!(b.tab_count(), 2 * 332 * 333);
        assert!(b.tab_count() as u64 <= crate::grid::MAX_TABS);
    }

    #[test]
    fn test_degenerate_grid_has_no_tabs() {
        for (w, h) in [(80, 80), (150, 150), (80, 500)] {
            let g = layout(w, h);
            assert_eq!(PatternBuilder::new(&g, Pattern::AltHorVer).build().len(), 0);
        }
    }
}
