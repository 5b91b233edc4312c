//! Per-kilometer (or per-mile) splits from the rendered splits table.
//!
//! Rows need a distance cell and a pace cell; a row whose pace cell holds no
//! run of ASCII digits or colons is dropped whole. Distance and elevation are
//! best-effort.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Selector;
use tracing::trace;

use super::page::{text_of, Page};
use crate::record::{Km, Split};

static SPLITS_BODY_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#splits-container tbody#contents").unwrap());
static MILE_SPLITS_BODY_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".mile-splits tbody").unwrap());
static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

static PACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9:]+").unwrap());
static ELEVATION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-?[0-9]+").unwrap());

/// Splits in table row order; empty when no table is rendered yet.
pub fn extract(page: &Page) -> Vec<Split> {
    let Some(body) = page.select_first(&[&*SPLITS_BODY_SEL, &*MILE_SPLITS_BODY_SEL]) else {
        return Vec::new();
    };

    body.select(&ROW_SEL)
        .enumerate()
        .filter_map(|(i, row)| {
            let cells: Vec<String> = row.select(&CELL_SEL).map(text_of).collect();
            let split = parse_row(&cells);
            if split.is_none() {
                trace!("splits row {} skipped: {:?}", i, cells);
            }
            split
        })
        .collect()
}

/// Build a split from trimmed cell texts `[distance, pace, elevation?]`.
pub fn parse_row(cells: &[String]) -> Option<Split> {
    if cells.len() < 2 {
        return None;
    }
    let pace = PACE_RE.find(&cells[1])?.as_str();

    Some(Split {
        km: parse_km(&cells[0]),
        pace: format!("{}/km", pace),
        elevation: cells.get(2).and_then(|c| parse_elevation(c)),
    })
}

fn parse_km(cell: &str) -> Km {
    let normalized = cell.replacen(',', ".", 1);
    match normalized.parse::<f64>() {
        Ok(km) if km.is_finite() => Km::Number(km),
        _ => Km::Raw(normalized),
    }
}

fn parse_elevation(cell: &str) -> Option<i64> {
    ELEVATION_RE.find(cell)?.as_str().parse().ok()
}
