//! Best-effort CSV import for holdings.
//!
//! Exported position files vary wildly in header naming, so columns are
//! resolved through priority-ordered synonym tables: adding support for a new
//! export format is a table edit, not a code change. The contract favors
//! lossy import over hard failure: malformed rows are dropped, never raised.

use tracing::debug;

use crate::models::Holding;
use crate::numeric::parse_f64_or_zero;

/// Synonyms per canonical column, in priority order. Matching happens against
/// header cells lower-cased and stripped of whitespace/underscore/hyphen runs,
/// so "Cost Basis", "cost_basis", and "COST-BASIS" all resolve to `costbasis`.
const SYMBOL_SYNONYMS: &[&str] = &["symbol", "asset", "ticker", "coin"];
const QUANTITY_SYNONYMS: &[&str] = &["quantity", "amount", "volume", "holdings"];
const AVG_PRICE_SYNONYMS: &[&str] = &["avgprice", "averageprice", "buyprice", "costbasis"];
const CURRENT_PRICE_SYNONYMS: &[&str] = &["currentprice", "price", "last", "markprice"];

#[derive(Debug, Clone, Copy)]
struct HeaderColumns {
    symbol: usize,
    quantity: usize,
    avg_price: usize,
    /// Optional; rows fall back to the cost basis when absent.
    current_price: Option<usize>,
}

/// Parses free-text CSV content into validated holdings.
///
/// The first non-blank line is the header. If no column resolves to symbol,
/// quantity, or cost basis, the whole import yields an empty result. Data rows
/// with the wrong field count, a missing symbol, or non-positive numeric
/// fields are silently skipped.
pub fn parse_holdings_csv(text: &str) -> Vec<Holding> {
    let mut lines = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty());

    let header = match lines.next() {
        Some(line) => split_fields(line),
        None => return Vec::new(),
    };

    let columns = match resolve_columns(&header) {
        Some(columns) => columns,
        None => {
            debug!("csv import: no symbol/quantity/cost-basis columns in header");
            return Vec::new();
        }
    };

    let mut holdings = Vec::new();

    for line in lines {
        let fields = split_fields(line);
        if fields.len() != header.len() {
            debug!(
                expected = header.len(),
                got = fields.len(),
                "csv import: skipping row with wrong field count"
            );
            continue;
        }

        let avg_price = parse_f64_or_zero(&fields[columns.avg_price]);
        let current_price = match columns.current_price {
            Some(index) => parse_f64_or_zero(&fields[index]),
            None => avg_price,
        };

        let holding = Holding::normalized(
            &fields[columns.symbol],
            parse_f64_or_zero(&fields[columns.quantity]),
            avg_price,
            current_price,
            None,
        );

        if is_importable(&holding) {
            holdings.push(holding);
        } else {
            debug!(symbol = %holding.symbol, "csv import: skipping invalid row");
        }
    }

    holdings
}

/// Import is stricter than the general validity predicate: every numeric
/// field, the current mark included, must be strictly positive.
fn is_importable(holding: &Holding) -> bool {
    !holding.symbol.is_empty()
        && holding.quantity.is_finite()
        && holding.quantity > 0.0
        && holding.avg_price.is_finite()
        && holding.avg_price > 0.0
        && holding.current_price.is_finite()
        && holding.current_price > 0.0
}

/// Lower-cases a header cell and strips whitespace/underscore/hyphen runs.
fn canonical_header(cell: &str) -> String {
    cell.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Resolves each canonical column to the first header cell matching one of its
/// synonyms, trying synonyms in priority order.
fn find_column(header: &[String], synonyms: &[&str]) -> Option<usize> {
    synonyms
        .iter()
        .find_map(|synonym| header.iter().position(|cell| cell == synonym))
}

fn resolve_columns(header: &[String]) -> Option<HeaderColumns> {
    let canonical: Vec<String> = header.iter().map(|cell| canonical_header(cell)).collect();

    Some(HeaderColumns {
        symbol: find_column(&canonical, SYMBOL_SYNONYMS)?,
        quantity: find_column(&canonical, QUANTITY_SYNONYMS)?,
        avg_price: find_column(&canonical, AVG_PRICE_SYNONYMS)?,
        current_price: find_column(&canonical, CURRENT_PRICE_SYNONYMS),
    })
}

/// Splits one CSV line into trimmed fields.
///
/// Double quotes delimit fields that may contain commas; a doubled quote
/// inside a quoted field is an escaped literal quote.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut field));
            }
            _ => field.push(c),
        }
    }
    fields.push(field);

    fields
        .into_iter()
        .map(|field| field.trim().to_string())
        .collect()
}
