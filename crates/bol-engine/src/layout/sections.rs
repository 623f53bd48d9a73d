//! Block builders for every section of the Bill of Lading
//!
//! Each builder lays its block out at a given top `y`. Variable text is
//! fitted to a per-field line budget, so block heights depend only on the
//! document, the geometry and the metrics.

use bol_types::{BolData, CargoItem, DangerousGoods, Party, TransportType};

use super::geometry::PageGeometry;
use super::legal;
use super::metrics::TextMetrics;
use super::text::{fit_text, TextStyle};
use super::tree::{Block, BlockKind, Color, Element, Rect};
use super::LayoutContext;

/// Cargo table column widths as fractions of the content width.
pub const CARGO_COLUMN_SHARES: [f64; 4] = [0.28, 0.40, 0.16, 0.16];

const NAME_LINES: usize = 2;
const ADDRESS_LINES: usize = 3;
const NOTE_LINES: usize = 2;
const FIELD_LINES: usize = 2;
const LEGAL_LINES: usize = 12;
const STROKE: Color = Color::BLACK;

/// Look of one run of text.
#[derive(Debug, Clone, Copy)]
struct Ink {
    size: f64,
    bold: bool,
    italic: bool,
    color: Color,
}

impl Ink {
    fn new(size: f64) -> Self {
        Self {
            size,
            bold: false,
            italic: false,
            color: Color::BLACK,
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    fn style(&self) -> TextStyle {
        TextStyle {
            size: self.size,
            bold: self.bold,
        }
    }
}

/// A padded box that stacks lines of text from the top down.
struct Column<'a> {
    geometry: &'a PageGeometry,
    metrics: &'a dyn TextMetrics,
    x: f64,
    y: f64,
    width: f64,
    cursor: f64,
    centered: bool,
    fill: Option<Color>,
    stroke: Option<Color>,
    elements: Vec<Element>,
}

impl<'a> Column<'a> {
    fn new(geometry: &'a PageGeometry, metrics: &'a dyn TextMetrics, x: f64, y: f64, width: f64) -> Self {
        Self {
            geometry,
            metrics,
            x,
            y,
            width,
            cursor: y + geometry.cell_padding,
            centered: false,
            fill: None,
            stroke: Some(STROKE),
            elements: Vec::new(),
        }
    }

    fn centered(mut self) -> Self {
        self.centered = true;
        self
    }

    fn fill(mut self, fill: Color) -> Self {
        self.fill = Some(fill);
        self
    }

    fn stroke(mut self, stroke: Option<Color>) -> Self {
        self.stroke = stroke;
        self
    }

    fn inner_width(&self) -> f64 {
        (self.width - 2.0 * self.geometry.cell_padding).max(1.0)
    }

    /// Fit `text` into `max_lines` and stack the lines. Blank text takes no room.
    fn text(&mut self, text: &str, ink: Ink, max_lines: usize) -> &mut Self {
        let padding = self.geometry.cell_padding;
        let inner = self.inner_width();
        let line_height = self.geometry.fonts.line_height(ink.size);
        let lines = fit_text(text, inner, max_lines, ink.style(), self.metrics);
        for line in lines {
            let x = if self.centered {
                let used = self.metrics.text_width(&line, ink.size, ink.bold);
                self.x + padding + ((inner - used) / 2.0).max(0.0)
            } else {
                self.x + padding
            };
            self.elements.push(Element::Text {
                x,
                y: self.cursor,
                size: ink.size,
                bold: ink.bold,
                italic: ink.italic,
                color: ink.color,
                content: line,
            });
            self.cursor += line_height;
        }
        self
    }

    fn label(&mut self, text: &str) -> &mut Self {
        let ink = Ink::new(self.geometry.fonts.label).bold();
        self.text(text, ink, FIELD_LINES)
    }

    fn value(&mut self, text: &str, max_lines: usize) -> &mut Self {
        let ink = Ink::new(self.geometry.fonts.body);
        self.text(text, ink, max_lines)
    }

    fn strong(&mut self, text: &str, max_lines: usize) -> &mut Self {
        let ink = Ink::new(self.geometry.fonts.body).bold();
        self.text(text, ink, max_lines)
    }

    fn note(&mut self, text: &str) -> &mut Self {
        let ink = Ink::new(self.geometry.fonts.small)
            .italic()
            .color(Color::MUTED);
        self.text(text, ink, NOTE_LINES)
    }

    /// Label followed by its value, with an empty line when the value is blank.
    fn field(&mut self, label: &str, value: &str) -> &mut Self {
        self.label(label);
        if value.trim().is_empty() {
            let blank = self.geometry.fonts.line_height(self.geometry.fonts.body);
            self.gap(blank)
        } else {
            self.value(value, FIELD_LINES)
        }
    }

    fn gap(&mut self, height: f64) -> &mut Self {
        self.cursor += height;
        self
    }

    fn content_height(&self) -> f64 {
        self.cursor - self.y + self.geometry.cell_padding
    }
}

/// Builds blocks for one document with fixed geometry and metrics.
pub struct Composer<'a> {
    geometry: &'a PageGeometry,
    metrics: &'a dyn TextMetrics,
}

impl<'a> Composer<'a> {
    pub fn new(geometry: &'a PageGeometry, metrics: &'a dyn TextMetrics) -> Self {
        Self { geometry, metrics }
    }

    fn column(&self, x: f64, y: f64, width: f64) -> Column<'a> {
        Column::new(self.geometry, self.metrics, x, y, width)
    }

    /// Equal-width columns spanning the content width.
    fn split(&self, y: f64, count: usize) -> Vec<Column<'a>> {
        let width = self.geometry.content_width() / count as f64;
        (0..count)
            .map(|i| self.column(self.geometry.margin_left + i as f64 * width, y, width))
            .collect()
    }

    fn full(&self, y: f64) -> Column<'a> {
        self.column(self.geometry.margin_left, y, self.geometry.content_width())
    }

    /// Close a row of columns: every cell gets the height of the tallest.
    fn finish_row(&self, kind: BlockKind, y: f64, columns: Vec<Column<'_>>) -> Block {
        let height = columns
            .iter()
            .map(Column::content_height)
            .fold(0.0, f64::max);
        self.finish_row_at(kind, y, height, columns)
    }

    fn finish_row_at(&self, kind: BlockKind, y: f64, height: f64, columns: Vec<Column<'_>>) -> Block {
        let mut boxes = Vec::with_capacity(columns.len());
        let mut texts = Vec::new();
        for column in columns {
            if column.stroke.is_some() || column.fill.is_some() {
                boxes.push(Element::Rect {
                    x: column.x,
                    y,
                    width: column.width,
                    height,
                    stroke: column.stroke,
                    fill: column.fill,
                });
            }
            texts.extend(column.elements);
        }
        boxes.extend(texts);
        Block {
            kind,
            rect: Rect {
                x: self.geometry.margin_left,
                y,
                width: self.geometry.content_width(),
                height,
            },
            elements: boxes,
        }
    }

    /// Stack several rows into one block.
    fn stack(&self, kind: BlockKind, y: f64, rows: Vec<Block>) -> Block {
        let bottom = rows.last().map_or(y, |r| r.rect.bottom());
        Block {
            kind,
            rect: Rect {
                x: self.geometry.margin_left,
                y,
                width: self.geometry.content_width(),
                height: bottom - y,
            },
            elements: rows.into_iter().flat_map(|r| r.elements).collect(),
        }
    }

    pub fn header(&self, doc: &BolData, ctx: &LayoutContext, y: f64) -> Block {
        let fonts = &self.geometry.fonts;
        let mut columns = self.split(y, 2);

        let company = &mut columns[0];
        company.text(legal::COMPANY_NAME, Ink::new(fonts.title).bold(), 1);
        company.gap(fonts.line_height(fonts.body));
        company.text(legal::COMPANY_LOGO, Ink::new(fonts.heading).color(Color::MUTED), 1);

        let selected = doc.transport_type.unwrap_or(TransportType::PortToPort);
        let info = &mut columns[1];
        info.text(legal::TITLE, Ink::new(fonts.heading).bold(), 1);
        info.text(&ctx.bol_number, Ink::new(fonts.title).bold(), 1);
        info.text(legal::DRAFT, Ink::new(fonts.heading).bold().color(Color::DANGER), 1);
        for transport in TransportType::ALL {
            let mark = if transport == selected { "[X]" } else { "[ ]" };
            info.value(&format!("{mark} {}", transport.label()), 1);
        }

        self.finish_row(BlockKind::Header, y, columns)
    }

    /// Header repeated at the top of every rider page. `rider_index` is 1-based.
    pub fn continuation_header(&self, ctx: &LayoutContext, rider_index: usize, y: f64) -> Block {
        let fonts = &self.geometry.fonts;
        let mut columns = self.split(y, 2);
        columns[0].text(
            &format!("{} {} - RIDER PAGE {}", legal::TITLE, ctx.bol_number, rider_index),
            Ink::new(fonts.heading).bold(),
            2,
        );
        columns[1].text(legal::DRAFT, Ink::new(fonts.heading).bold().color(Color::DANGER), 1);
        if let Some(booking) = &ctx.booking_number {
            columns[1].field("BOOKING REF.", booking);
        }
        self.finish_row(BlockKind::ContinuationHeader, y, columns)
    }

    pub fn tracking(&self, doc: &BolData, rider_pages: u32, y: f64) -> Block {
        let mut columns = self.split(y, 2);
        columns[0].field("NO.& SEQUENCE OF ORIGINAL B/L's", doc.bl_sequence());
        columns[1].field("NO. OF RIDER PAGES", &rider_pages.to_string());
        self.finish_row(BlockKind::Tracking, y, columns)
    }

    fn party_lines(column: &mut Column<'_>, party: &Party) {
        column.strong(&party.name, NAME_LINES);
        column.value(&party.address, ADDRESS_LINES);
        let place = [party.city.trim(), party.country.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        column.value(&place, 1);
        if let Some(phone) = &party.phone {
            column.value(phone, 1);
        }
    }

    pub fn parties(&self, doc: &BolData, y: f64) -> Block {
        let gap = self.geometry.section_gap;
        let mut columns = self.split(y, 2);

        let left = &mut columns[0];
        left.label("SHIPPER:");
        Self::party_lines(left, &doc.shipper);
        left.gap(gap);
        left.label("CONSIGNEE:");
        left.note(legal::CONSIGNEE_NOTE);
        Self::party_lines(left, &doc.consignee.party);
        left.gap(gap);
        left.label("NOTIFY PARTIES:");
        left.note(legal::NOTIFY_NOTE);
        if let Some(notify) = &doc.notify_party {
            left.strong(&notify.name, NAME_LINES);
            left.value(&notify.address, ADDRESS_LINES);
            if let Some(phone) = &notify.phone {
                left.value(phone, 1);
            }
        }

        let right = &mut columns[1];
        right.label("CARRIER'S AGENTS ENDORSEMENTS:");
        if let Some(endorsements) = &doc.carrier_endorsements {
            right.value(endorsements, FIELD_LINES);
        }
        right.gap(gap);
        right.field("IMO Number:", doc.imo_number.as_deref().unwrap_or_default());
        right.gap(gap);
        right.value(legal::CUSTOMS_LIABILITY, 6);
        right.gap(gap);
        right.strong(legal::HS_CODE_DISCLAIMER, 4);
        right.gap(gap);
        right.field(
            "PORT OF DISCHARGE AGENT:",
            doc.discharge_agent.as_deref().unwrap_or_default(),
        );

        self.finish_row(BlockKind::Parties, y, columns)
    }

    pub fn transport(&self, doc: &BolData, ctx: &LayoutContext, y: f64) -> Block {
        let vessel = format!("{} / {}", doc.vessel_name(), doc.voyage_number());
        let booking = doc
            .booking_ref
            .as_deref()
            .or(ctx.booking_number.as_deref())
            .unwrap_or_default();

        let mut first = self.split(y, 2);
        first[0].field("VESSEL AND VOYAGE NO", &vessel);
        first[0].field("BOOKING REF.", booking);
        first[1].field("PORT OF LOADING", &doc.ports.loading);
        first[1].field("SHIPPER'S REF.", doc.shipper_ref.as_deref().unwrap_or_default());
        let first = self.finish_row(BlockKind::Transport, y, first);

        let y2 = first.rect.bottom();
        let mut second = self.split(y2, 2);
        second[0].field(
            "PLACE OF RECEIPT:",
            doc.place_of_receipt.as_deref().unwrap_or_default(),
        );
        second[0].field("PORT OF DISCHARGE", &doc.ports.discharge);
        second[1].field("PLACE OF DELIVERY:", doc.place_of_delivery().unwrap_or_default());
        let second = self.finish_row(BlockKind::Transport, y2, second);

        self.stack(BlockKind::Transport, y, vec![first, second])
    }

    /// `None` unless the document declares dangerous goods.
    pub fn dangerous_goods(&self, doc: &BolData, y: f64) -> Option<Block> {
        if !doc.has_dangerous_goods || doc.dangerous_goods.is_empty() {
            return None;
        }
        let fonts = &self.geometry.fonts;
        let count = doc.dangerous_goods.len();
        let mut column = self
            .full(y)
            .fill(Color::DANGER_FILL)
            .stroke(Some(Color::DANGER));
        let noun = if count == 1 { "Entry" } else { "Entries" };
        column.text(
            &format!("DANGEROUS GOODS DECLARATION ({count} {noun})"),
            Ink::new(fonts.heading).bold().color(Color::DANGER_TEXT),
            1,
        );
        for (i, entry) in doc.dangerous_goods.iter().enumerate() {
            column.gap(self.geometry.section_gap);
            Self::dangerous_goods_entry(&mut column, entry, i + 1, count);
        }
        Some(self.finish_row(BlockKind::DangerousGoods, y, vec![column]))
    }

    fn dangerous_goods_entry(column: &mut Column<'_>, entry: &DangerousGoods, number: usize, count: usize) {
        let red = Ink::new(column.geometry.fonts.body)
            .bold()
            .color(Color::DANGER_TEXT);
        column.text(&format!("Entry {number} of {count}"), red, 1);

        let or_na = |s: &str| if s.trim().is_empty() { "N/A".to_string() } else { s.to_string() };
        let summary = format!(
            "UN Number: {}   Class: {}   Packing Group: {}   Marine Pollutant: {}",
            or_na(&entry.un_number),
            or_na(&entry.hazard_class),
            entry.packing_group.map_or("N/A", |pg| pg.as_str()),
            if entry.marine_pollutant { "YES - P" } else { "NO" },
        );
        column.value(&summary, 2);
        column.strong(
            &format!("Proper Shipping Name: {}", or_na(&entry.proper_shipping_name)),
            FIELD_LINES,
        );

        let present = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("NA"))
                .map(str::to_string)
        };
        let optional = [
            ("Subsidiary Risk", present(&entry.subsidiary_risk)),
            ("Flash Point", present(&entry.flash_point)),
            ("EMS Number", present(&entry.ems_number)),
            ("Segregation Group", present(&entry.segregation_group)),
        ];
        for (label, value) in optional {
            if let Some(value) = value {
                column.value(&format!("{label}: {value}"), 1);
            }
        }
        if entry.limited_quantity {
            column.value("Limited Quantity: YES", 1);
        }
        if let Some(contact) = present(&entry.emergency_contact) {
            column.strong(&format!("24/7 Emergency Contact: {contact}"), 1);
        }
        if let Some(provisions) = present(&entry.special_provisions) {
            column.value(&format!("Special Provisions: {provisions}"), FIELD_LINES);
        }
    }

    pub fn cargo_disclaimer(&self, y: f64) -> Block {
        let fonts = &self.geometry.fonts;
        let mut column = self.full(y).centered().fill(Color::HEADER_FILL);
        column.text(legal::CARGO_DISCLAIMER, Ink::new(fonts.label).bold(), 2);
        column.text(legal::CONTINUATION_NOTE, Ink::new(fonts.small).italic(), 1);
        self.finish_row(BlockKind::CargoDisclaimer, y, vec![column])
    }

    fn cargo_columns(&self, y: f64) -> Vec<Column<'a>> {
        let total = self.geometry.content_width();
        let mut x = self.geometry.margin_left;
        CARGO_COLUMN_SHARES
            .iter()
            .map(|share| {
                let width = total * share;
                let column = self.column(x, y, width);
                x += width;
                column
            })
            .collect()
    }

    pub fn cargo_table_header(&self, y: f64) -> Block {
        let ink = Ink::new(self.geometry.fonts.label).bold();
        let mut columns = self.cargo_columns(y);
        for (column, heading) in columns.iter_mut().zip(legal::CARGO_COLUMNS) {
            column.fill = Some(Color::HEADER_FILL);
            column.text(heading, ink, 2);
        }
        self.finish_row_at(
            BlockKind::CargoTableHeader,
            y,
            self.geometry.table_header_height,
            columns,
        )
    }

    /// One cargo line item at the fixed row height.
    pub fn cargo_row(&self, item: &CargoItem, index: usize, y: f64) -> Block {
        let lines = self.geometry.cargo_row_lines;
        let mut columns = self.cargo_columns(y);
        let cells = [
            container_cell(item),
            item.description.clone(),
            item.gross_weight.clone(),
            item.measurement.clone().unwrap_or_default(),
        ];
        for (column, cell) in columns.iter_mut().zip(cells.iter()) {
            if index % 2 == 1 {
                column.fill = Some(Color::ALT_ROW_FILL);
            }
            column.value(cell, lines);
        }
        self.finish_row_at(
            BlockKind::CargoRow { index },
            y,
            self.geometry.row_height(),
            columns,
        )
    }

    pub fn totals(&self, doc: &BolData, y: f64) -> Block {
        let mut columns = self.cargo_columns(y);
        let gross = if doc.totals.gross_weight.trim().is_empty() {
            "N/A"
        } else {
            doc.totals.gross_weight.as_str()
        };
        columns[0].label("Total:");
        columns[1].strong(&format!("{} PACKAGES", doc.totals.packages), FIELD_LINES);
        columns[2].label("Total:");
        columns[2].strong(gross, FIELD_LINES);
        columns[3].label("Total:");
        columns[3].strong(doc.totals.measurement.as_deref().unwrap_or_default(), FIELD_LINES);
        self.finish_row(BlockKind::Totals, y, columns)
    }

    pub fn commercial(&self, doc: &BolData, y: f64) -> Block {
        let mut columns = self.split(y, 2);
        let freight = &mut columns[0];
        freight.label("FREIGHT & CHARGES");
        freight.strong(doc.freight().unwrap_or(legal::FREIGHT_DEFAULT), FIELD_LINES);
        freight.note(legal::FREIGHT_NOTE);

        let small = Ink::new(self.geometry.fonts.small);
        let received = &mut columns[1];
        received.label("RECEIVED");
        received.text(legal::RECEIVED, small, LEGAL_LINES);
        received.text(legal::ACCEPTANCE, small.bold(), LEGAL_LINES);
        self.finish_row(BlockKind::Commercial, y, columns)
    }

    pub fn legal_text(&self, y: f64) -> Block {
        let small = Ink::new(self.geometry.fonts.small);
        let mut column = self.full(y).stroke(None);
        column.text(legal::SURRENDER, small, LEGAL_LINES);
        column.gap(self.geometry.section_gap);
        column.text(legal::WITNESS, small, LEGAL_LINES);
        self.finish_row(BlockKind::LegalText, y, vec![column])
    }

    pub fn signature(&self, doc: &BolData, y: f64) -> Block {
        let mut columns = self.split(y, 3);
        columns[0].field(
            "DECLARED VALUE",
            doc.declared_value.as_deref().unwrap_or_default(),
        );
        columns[1].field(
            "CARRIER'S RECEIPT",
            doc.carrier_receipt.as_deref().unwrap_or_default(),
        );
        columns[2].label("SIGNED");
        columns[2].note(legal::SIGNED_ON_BEHALF);
        columns[2].value(doc.signed_by.as_deref().unwrap_or_default(), NAME_LINES);
        self.finish_row(BlockKind::Signature, y, columns)
    }

    pub fn issue_dates(&self, doc: &BolData, ctx: &LayoutContext, y: f64) -> Block {
        let mut columns = self.split(y, 2);
        columns[0].field(
            "PLACE AND DATE OF ISSUE",
            doc.place_and_date_of_issue.as_deref().unwrap_or(&ctx.issue_date),
        );
        columns[1].field(
            "SHIPPED ON BOARD DATE",
            doc.shipped_on_board_date.as_deref().unwrap_or(&ctx.issue_date),
        );
        self.finish_row(BlockKind::IssueDates, y, columns)
    }

    pub fn final_notice(&self, y: f64) -> Block {
        let mut column = self.full(y).centered();
        column.text(legal::FINAL_NOTICE, Ink::new(self.geometry.fonts.heading).bold(), 1);
        self.finish_row(BlockKind::FinalNotice, y, vec![column])
    }

    /// Totals through final notice, stacked from `y = 0`.
    pub fn footer(&self, doc: &BolData, ctx: &LayoutContext) -> Vec<Block> {
        let gap = self.geometry.section_gap;
        let mut blocks = Vec::with_capacity(6);

        let totals = self.totals(doc, 0.0);
        let mut y = totals.rect.bottom() + gap;
        blocks.push(totals);

        let commercial = self.commercial(doc, y);
        y = commercial.rect.bottom() + gap;
        blocks.push(commercial);

        let legal_text = self.legal_text(y);
        y = legal_text.rect.bottom() + gap;
        blocks.push(legal_text);

        let signature = self.signature(doc, y);
        y = signature.rect.bottom() + gap;
        blocks.push(signature);

        let dates = self.issue_dates(doc, ctx, y);
        y = dates.rect.bottom() + gap;
        blocks.push(dates);

        blocks.push(self.final_notice(y));
        blocks
    }
}

/// Container, seal and marks stacked on separate lines.
pub fn container_cell(item: &CargoItem) -> String {
    let mut parts = Vec::new();
    if let Some(container) = item.container_numbers.as_deref().filter(|s| !s.trim().is_empty()) {
        parts.push(container.to_string());
    }
    if let Some(seal) = item.seal_numbers.as_deref().filter(|s| !s.trim().is_empty()) {
        parts.push(format!("Seal: {seal}"));
    }
    if let Some(marks) = item.marks.as_deref().filter(|s| !s.trim().is_empty()) {
        parts.push(format!("Marks: {marks}"));
    }
    parts.join("\n")
}
