//! Table formatting for record listings using tabled
//!
//! Columns follow the export header order: ID, Name, Email, CreatedAt.
//! Long values are wrapped rather than truncated.

use tabled::{
    Table,
    builder::Builder,
    settings::{Alignment, Color, Modify, Style, object::Columns, object::Rows, width::Width},
};

use crate::export::writers::csv::{HEADERS, format_timestamp};
use crate::store::Record;

/// Maximum width for a single column (characters)
const DEFAULT_MAX_COLUMN_WIDTH: usize = 40;

/// Shown instead of a table when nothing matched
pub const EMPTY_LISTING: &str = "(no students)";

/// Table formatter for record listings
pub struct TableFormatter {
    /// Maximum column width
    max_column_width: usize,

    /// Table style
    style: TableStyle,

    /// Enable colored output
    use_colors: bool,
}

/// Available table styles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStyle {
    /// Modern style with box-drawing characters
    Modern,
    /// ASCII style with basic characters
    Ascii,
}

impl TableFormatter {
    /// Create a new table formatter with default settings
    pub fn new() -> Self {
        Self {
            max_column_width: DEFAULT_MAX_COLUMN_WIDTH,
            style: TableStyle::Modern,
            use_colors: false,
        }
    }

    /// Create a new table formatter with color support
    ///
    /// # Arguments
    /// * `use_colors` - Color the header row
    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            ..Self::new()
        }
    }

    /// Set the table style
    pub fn with_style(mut self, style: TableStyle) -> Self {
        self.style = style;
        self
    }

    /// Set maximum column width
    pub fn with_max_column_width(mut self, width: usize) -> Self {
        self.max_column_width = width;
        self
    }

    /// Format records as a table
    ///
    /// # Arguments
    /// * `records` - Records in display order
    ///
    /// # Returns
    /// * `String` - Rendered table, or a placeholder for an empty listing
    pub fn format(&self, records: &[Record]) -> String {
        if records.is_empty() {
            return EMPTY_LISTING.to_string();
        }

        let mut builder = Builder::default();
        builder.push_record(HEADERS.iter().map(|h| h.to_string()));

        for record in records {
            builder.push_record([
                record.id.to_string(),
                record.name.clone(),
                record.email.clone(),
                format_timestamp(&record.created_at),
            ]);
        }

        let mut table = builder.build();
        self.apply_style(&mut table);

        for i in 0..HEADERS.len() {
            table.with(Modify::new(Columns::new(i..=i)).with(Width::wrap(self.max_column_width)));
        }

        table.with(Modify::new(Rows::first()).with(Alignment::center()));

        if self.use_colors {
            table.modify(Rows::first(), Color::FG_CYAN | Color::BOLD);
        }

        table.to_string()
    }

    fn apply_style(&self, table: &mut Table) {
        match self.style {
            TableStyle::Modern => table.with(Style::modern()),
            TableStyle::Ascii => table.with(Style::ascii()),
        };
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}
