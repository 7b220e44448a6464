//! Receipt
//!
//! Terminal rendering of a priced cart.

use std::{fmt::Write, io};

use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{catalog::Catalog, discounts::percent_points, pricing::PricingResult};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A priced cart ready for display, with product names from the catalog.
#[derive(Debug, Clone, Copy)]
pub struct Receipt<'r, 'a> {
    result: &'r PricingResult<'a>,
    catalog: &'r Catalog<'a>,
}

impl<'r, 'a> Receipt<'r, 'a> {
    /// Create a receipt for a pricing result.
    pub fn new(result: &'r PricingResult<'a>, catalog: &'r Catalog<'a>) -> Self {
        Self { result, catalog }
    }

    /// Writes the receipt table and summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        if self.result.lines().is_empty() {
            writeln!(out, "\nCart is empty")?;
        } else {
            let builder = self.line_rows();

            write_receipt_table(&mut out, builder)?;
        }

        write_receipt_summary(&mut out, self.result)?;

        if !self.result.unpriced().is_empty() {
            let skus: Vec<&str> = self.result.unpriced().iter().map(|sku| sku.as_str()).collect();

            writeln!(out, " Not in catalog: {}", skus.join(", "))?;
        }

        Ok(())
    }

    fn line_rows(&self) -> Builder {
        let mut builder = Builder::default();

        builder.push_record(["", "SKU", "Item", "Qty", "Unit Price", "Line Total"]);

        for (idx, line) in self.result.lines().iter().enumerate() {
            let name = self
                .catalog
                .get(line.sku.as_str())
                .map_or("<unknown>", |product| product.name.as_str());

            builder.push_record([
                format!("#{:<3}", idx + 1),
                line.sku.to_string(),
                name.to_string(),
                line.quantity.to_string(),
                format!("{}", line.unit_price),
                format!("{}", line.line_total),
            ]);
        }

        builder
    }
}

fn write_receipt_table(out: &mut impl io::Write, builder: Builder) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(
        1,
        HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
    );

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(1..2), color_dark_grey());
    table.modify(Columns::new(3..6), Alignment::right());

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}")?;

    Ok(())
}

fn write_receipt_summary(
    out: &mut impl io::Write,
    result: &PricingResult<'_>,
) -> Result<(), ReceiptError> {
    let points = result.discount_percent_points().normalize();

    let subtotal_label = " Subtotal:";
    let discount_label = format!(" Discount ({points}%):");
    let total_label = " \x1b[1mTotal:\x1b[0m";

    let subtotal_val = format!("{}  ", result.subtotal());
    let discount_val = format!("-{}  ", result.discount_amount());
    let total_val = format!("{}  ", result.total());

    let label_width = visible_width(subtotal_label)
        .max(visible_width(&discount_label))
        .max(visible_width(total_label));

    let value_width = subtotal_val
        .len()
        .max(discount_val.len())
        .max(total_val.len());

    write_summary_line(out, subtotal_label, &subtotal_val, label_width, value_width)?;
    write_summary_line(
        out,
        &discount_label,
        &format!("\x1b[32m{discount_val}\x1b[0m"),
        label_width,
        value_width,
    )?;
    write_summary_line(
        out,
        total_label,
        &format!("\x1b[1m{total_val}\x1b[0m"),
        label_width,
        value_width,
    )?;

    if let Some(hint) = result.next_tier() {
        writeln!(
            out,
            "\n Spend {} more for {}% off",
            hint.shortfall,
            percent_points(hint.tier.percentage()).normalize()
        )?;
    }

    writeln!(out)?;

    Ok(())
}

/// Wraps runs of UTF-8 box-drawing characters in ANSI dark-grey escape codes.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// Writes a summary line with a right-aligned label and a fixed-width value column.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_pad = label_col_width.saturating_sub(visible_width(label));
    let value_pad = value_col_width.saturating_sub(visible_width(value));

    writeln!(
        out,
        "{:>label_pad$}{label}  {value_pad}{value}",
        "",
        value_pad = " ".repeat(value_pad)
    )?;

    Ok(())
}

/// ANSI dark grey foreground.
fn color_dark_grey() -> Color {
    Color::new("\x1b[90m", "\x1b[0m")
}
