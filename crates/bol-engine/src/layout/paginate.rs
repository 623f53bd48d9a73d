//! Cargo table pagination
//!
//! Pure arithmetic over heights: decides which cargo rows go on which page
//! and where the footer group lands. Block construction happens elsewhere.

use std::ops::Range;

use tracing::debug;

use super::geometry::PageGeometry;

/// A run of consecutive cargo rows under one table header.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSegment {
    /// 0-based page index
    pub page: usize,
    /// y of the table header
    pub top: f64,
    pub rows: Range<usize>,
}

impl TableSegment {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub segments: Vec<TableSegment>,
    pub footer_page: usize,
    pub footer_top: f64,
    pub page_count: usize,
}

/// Heights the planner needs from the block builders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanInput {
    pub total_rows: usize,
    /// y where the table starts on the first page
    pub first_table_top: f64,
    /// y where the table starts on a rider page, below its header
    pub continuation_top: f64,
    /// Height of the footer group, which is never split
    pub footer_height: f64,
    /// Bottom margin used once the remaining rows likely end on this page
    pub final_bottom_margin: f64,
}

/// Place cargo rows page by page.
///
/// On each page the usable height below the table header is divided by the
/// fixed row height and one row is held back as a safety margin. When at
/// most `last_page_threshold` rows remain the larger final margin applies,
/// keeping room for the footer. A partly filled first page that could only
/// take a handful of rows is abandoned for a fresh page instead.
pub fn plan_pages(input: &PlanInput, geometry: &PageGeometry) -> PagePlan {
    let row_height = geometry.row_height();
    let header_height = geometry.table_header_height;
    let total = input.total_rows;

    let mut segments = Vec::new();
    let mut page = 0;
    let mut y = input.first_table_top;
    let mut next = 0;

    if total == 0 {
        segments.push(TableSegment {
            page,
            top: y,
            rows: 0..0,
        });
        y += header_height;
    }

    while next < total {
        let remaining = total - next;
        let bottom = if remaining <= geometry.last_page_threshold {
            input.final_bottom_margin
        } else {
            geometry.bottom_margin
        };
        let available = geometry.height - bottom - y - header_height;
        let max_rows = if available > 0.0 {
            (available / row_height).floor() as usize
        } else {
            0
        };
        let safe_rows = max_rows.saturating_sub(1).max(1);

        let on_first_page = page == 0;
        if on_first_page
            && (max_rows == 0 || safe_rows < remaining.min(geometry.min_rows_per_page))
        {
            debug!(
                page,
                safe_rows, remaining, "Too little room for cargo rows, starting a new page"
            );
            page += 1;
            y = input.continuation_top;
            continue;
        }

        let take = safe_rows.min(remaining);
        segments.push(TableSegment {
            page,
            top: y,
            rows: next..next + take,
        });
        y += header_height + take as f64 * row_height;
        next += take;

        if next < total {
            page += 1;
            y = input.continuation_top;
        }
    }

    if y + input.footer_height > geometry.limit(geometry.bottom_margin) {
        debug!(page, y, footer = input.footer_height, "Footer moves to a new page");
        page += 1;
        y = input.continuation_top;
    }

    PagePlan {
        segments,
        footer_page: page,
        footer_top: y,
        page_count: page + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    /// Geometry in which a fresh page holds exactly 6.5 rows below the
    /// table header, so one-row safety leaves 5.
    fn five_row_geometry() -> (PageGeometry, PlanInput) {
        let mut g = PageGeometry::default();
        let row = g.row_height();
        g.bottom_margin = 40.0;
        g.final_bottom_margin = 40.0;
        let top = 60.0;
        g.height = top + g.table_header_height + 6.5 * row + g.bottom_margin;
        let input = PlanInput {
            total_rows: 12,
            first_table_top: top,
            continuation_top: top,
            footer_height: row,
            final_bottom_margin: g.final_bottom_margin,
        };
        (g, input)
    }

    fn rows_per_segment(plan: &PagePlan) -> Vec<usize> {
        plan.segments.iter().map(TableSegment::len).collect()
    }

    #[test]
    fn test_twelve_rows_split_five_five_two() {
        let (g, input) = five_row_geometry();
        let plan = plan_pages(&input, &g);
        assert_eq!(rows_per_segment(&plan), vec![5, 5, 2]);
        assert_eq!(
            plan.segments.iter().map(|s| s.page).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(plan.page_count, 3);
        assert_eq!(plan.footer_page, 2);
    }

    #[test]
    fn test_no_cargo_keeps_table_header() {
        let (g, mut input) = five_row_geometry();
        input.total_rows = 0;
        let plan = plan_pages(&input, &g);
        assert_eq!(plan.segments.len(), 1);
        assert!(plan.segments[0].is_empty());
        assert_eq!(plan.page_count, 1);
    }

    #[test]
    fn test_crowded_first_page_breaks_early() {
        let (g, mut input) = five_row_geometry();
        // Only room for 3 rows (2 after the safety margin) on the first page.
        input.first_table_top = g.height - g.bottom_margin - g.table_header_height
            - 3.5 * g.row_height();
        let plan = plan_pages(&input, &g);
        assert_eq!(plan.segments[0].page, 1);
        assert_eq!(rows_per_segment(&plan), vec![5, 5, 2]);
        assert_eq!(plan.page_count, 4);
    }

    #[test]
    fn test_few_rows_may_share_crowded_first_page() {
        let (g, mut input) = five_row_geometry();
        input.total_rows = 2;
        input.footer_height = 0.0;
        input.first_table_top = g.height - g.bottom_margin - g.table_header_height
            - 3.5 * g.row_height();
        let plan = plan_pages(&input, &g);
        assert_eq!(plan.segments[0].page, 0);
        assert_eq!(rows_per_segment(&plan), vec![2]);
        assert_eq!(plan.page_count, 1);
    }

    #[test]
    fn test_footer_rolls_to_new_page() {
        let (g, mut input) = five_row_geometry();
        input.total_rows = 5;
        input.footer_height = 2.0 * g.row_height();
        let plan = plan_pages(&input, &g);
        assert_eq!(plan.page_count, 2);
        assert_eq!(plan.footer_page, 1);
        assert_eq!(plan.footer_top, input.continuation_top);
    }

    #[test]
    fn test_final_margin_applies_near_the_end() {
        let (mut g, mut input) = five_row_geometry();
        g.final_bottom_margin = g.bottom_margin + 3.0 * g.row_height();
        input.final_bottom_margin = g.final_bottom_margin;
        input.total_rows = 8;
        let plan = plan_pages(&input, &g);
        // 8 <= threshold: 3.5 rows of room, 2 after the safety margin, which
        // is too few for the first page.
        assert_eq!(plan.segments[0].page, 1);
        assert_eq!(rows_per_segment(&plan), vec![2, 2, 2, 2]);
    }

    proptest! {
        #[test]
        fn prop_every_row_placed_once_in_order(
            total in 0usize..120,
            first_top in 60.0f64..600.0,
            footer in 0.0f64..300.0,
        ) {
            let g = PageGeometry::default();
            let input = PlanInput {
                total_rows: total,
                first_table_top: first_top,
                continuation_top: 90.0,
                footer_height: footer,
                final_bottom_margin: g.final_bottom_margin,
            };
            let plan = plan_pages(&input, &g);
            let placed: Vec<usize> = plan.segments.iter().flat_map(|s| s.rows.clone()).collect();
            prop_assert_eq!(placed, (0..total).collect::<Vec<_>>());
            prop_assert!(plan.footer_page + 1 == plan.page_count);
            for pair in plan.segments.windows(2) {
                prop_assert!(pair[0].page < pair[1].page);
            }
        }

        #[test]
        fn prop_rows_stay_above_bottom_margin_on_rider_pages(total in 1usize..120) {
            let g = PageGeometry::default();
            let input = PlanInput {
                total_rows: total,
                first_table_top: 400.0,
                continuation_top: 90.0,
                footer_height: 200.0,
                final_bottom_margin: g.final_bottom_margin,
            };
            let plan = plan_pages(&input, &g);
            for segment in &plan.segments {
                let bottom = segment.top + g.table_header_height
                    + segment.len() as f64 * g.row_height();
                prop_assert!(bottom <= g.limit(g.bottom_margin));
            }
        }
    }
}
