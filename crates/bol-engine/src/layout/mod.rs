//! Layout engine
//!
//! Turns a [`BolData`] into a [`RenderTree`] of absolutely positioned
//! blocks. Page 1 carries the header sections, cargo rows flow onto rider
//! pages as needed, and the footer group always closes the last page.
//! Layout is a pure function of the document, the context, the geometry
//! and the text metrics.

pub mod geometry;
pub mod legal;
pub mod metrics;
pub mod paginate;
pub mod sections;
pub mod text;
pub mod tree;

use bol_types::BolData;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::world::DEFAULT_FAMILY;

pub use geometry::{FontSizes, PageGeometry, A4_HEIGHT, A4_WIDTH};
pub use metrics::{FixedWidthMetrics, FontMetrics, TextMetrics};
pub use paginate::{plan_pages, PagePlan, PlanInput, TableSegment};
pub use sections::Composer;
pub use text::{fit_line, fit_text, wrap_text, TextStyle, ELLIPSIS};
pub use tree::{Block, BlockKind, Color, Element, PageKind, PageModel, Rect, RenderTree};

/// Request-level values that are not part of the extracted document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutContext {
    pub bol_number: String,
    /// Used when the document has no booking reference of its own
    pub booking_number: Option<String>,
    /// Default for the issue and shipped-on-board dates, e.g. "March 5, 2025"
    pub issue_date: String,
}

impl LayoutContext {
    pub fn new(bol_number: impl Into<String>, booking_number: Option<String>, date: NaiveDate) -> Self {
        Self {
            bol_number: bol_number.into(),
            booking_number,
            issue_date: format_issue_date(date),
        }
    }
}

/// "March 5, 2025"
pub fn format_issue_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Lay out the document, resolving the rider page count.
///
/// The first pass assumes no rider pages. Its page count gives the rider
/// count for the second and final pass. Two passes only: the rider count is
/// a single short line that never changes any block height.
pub fn layout(
    doc: &BolData,
    ctx: &LayoutContext,
    geometry: &PageGeometry,
    metrics: &dyn TextMetrics,
) -> RenderTree {
    let first = layout_pass(doc, ctx, geometry, metrics, 0);
    let rider_pages = first.page_count().saturating_sub(1) as u32;
    if rider_pages == 0 {
        debug!("Single page document, no second pass needed");
        return first;
    }

    let tree = layout_pass(doc, ctx, geometry, metrics, rider_pages);
    if tree.page_count() != first.page_count() {
        warn!(
            first_pass = first.page_count(),
            second_pass = tree.page_count(),
            "Page count changed between layout passes"
        );
    }
    info!(
        pages = tree.page_count(),
        rider_pages,
        cargo_rows = doc.cargo.len(),
        "Layout complete"
    );
    tree
}

/// One layout pass with a fixed rider page count.
pub fn layout_pass(
    doc: &BolData,
    ctx: &LayoutContext,
    geometry: &PageGeometry,
    metrics: &dyn TextMetrics,
    rider_pages: u32,
) -> RenderTree {
    let composer = Composer::new(geometry, metrics);
    let gap = geometry.section_gap;

    let mut first_page = Vec::new();
    let mut y = geometry.margin_top;
    y = stack(&mut first_page, composer.header(doc, ctx, y), gap);
    y = stack(&mut first_page, composer.tracking(doc, rider_pages, y), gap);
    y = stack(&mut first_page, composer.parties(doc, y), gap);
    y = stack(&mut first_page, composer.transport(doc, ctx, y), gap);
    if let Some(block) = composer.dangerous_goods(doc, y) {
        y = stack(&mut first_page, block, gap);
    }
    let first_table_top = stack(&mut first_page, composer.cargo_disclaimer(y), gap);

    let continuation_top = composer
        .continuation_header(ctx, 1, geometry.margin_top)
        .rect
        .bottom()
        + gap;

    let mut footer = composer.footer(doc, ctx);
    let footer_height = footer.last().map_or(0.0, |b| b.rect.bottom());
    let final_bottom_margin = geometry
        .final_bottom_margin
        .max(geometry.bottom_margin + footer_height);

    let plan = plan_pages(
        &PlanInput {
            total_rows: doc.cargo.len(),
            first_table_top,
            continuation_top,
            footer_height,
            final_bottom_margin,
        },
        geometry,
    );
    debug!(
        pass_rider_pages = rider_pages,
        pages = plan.page_count,
        segments = plan.segments.len(),
        footer_page = plan.footer_page,
        "Pagination planned"
    );

    let mut pages: Vec<PageModel> = (0..plan.page_count)
        .map(|index| {
            if index == 0 {
                PageModel {
                    number: 1,
                    kind: PageKind::First,
                    blocks: std::mem::take(&mut first_page),
                }
            } else {
                PageModel {
                    number: index + 1,
                    kind: PageKind::Rider,
                    blocks: vec![composer.continuation_header(ctx, index, geometry.margin_top)],
                }
            }
        })
        .collect();

    let row_height = geometry.row_height();
    for segment in &plan.segments {
        let blocks = &mut pages[segment.page].blocks;
        blocks.push(composer.cargo_table_header(segment.top));
        let rows_top = segment.top + geometry.table_header_height;
        for (offset, index) in segment.rows.clone().enumerate() {
            let row_y = rows_top + offset as f64 * row_height;
            blocks.push(composer.cargo_row(&doc.cargo[index], index, row_y));
        }
    }

    for block in &mut footer {
        block.translate(plan.footer_top);
    }
    pages[plan.footer_page].blocks.extend(footer);

    RenderTree {
        title: format!("Bill of Lading {}", ctx.bol_number),
        font_family: DEFAULT_FAMILY.to_string(),
        geometry: geometry.clone(),
        rider_pages,
        pages,
    }
}

/// Push `block` and return the top of the next one.
fn stack(blocks: &mut Vec<Block>, block: Block, gap: f64) -> f64 {
    let next = block.rect.bottom() + gap;
    blocks.push(block);
    next
}
