use std::collections::BTreeMap;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use coltype_corpus::{CacheStatus, ReferenceCorpus};
use coltype_infer::{CacheReportEntry, TypeRegistry};

use crate::types::{ColumnMatches, VerifyOutcome};

/// Distances below this are shown as a confident match.
const STRONG_MATCH: f64 = 0.3;

pub fn print_matches(matches: &[ColumnMatches]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Values"),
        header_cell("Missing"),
        header_cell("Rank"),
        header_cell("Type"),
        header_cell("Mean distance"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);
    for column in matches {
        if column.results.is_empty() {
            table.add_row(vec![
                column_cell(&column.column),
                Cell::new(column.present),
                count_cell(column.missing),
                dim_cell("-"),
                dim_cell("no match"),
                dim_cell("-"),
            ]);
            continue;
        }
        for (rank, result) in column.results.iter().enumerate() {
            let first = rank == 0;
            table.add_row(vec![
                if first {
                    column_cell(&column.column)
                } else {
                    Cell::new("")
                },
                if first {
                    Cell::new(column.present)
                } else {
                    Cell::new("")
                },
                if first {
                    count_cell(column.missing)
                } else {
                    Cell::new("")
                },
                dim_cell(rank + 1),
                type_cell(&result.type_name, first),
                distance_cell(result.mean_distance),
            ]);
        }
    }
    println!("{table}");
}

pub fn print_verify(outcome: &VerifyOutcome) {
    let verdict = if outcome.accepted {
        "accepted"
    } else {
        "rejected"
    };
    println!(
        "Column {:?} {verdict} as {}",
        outcome.column, outcome.type_name
    );
}

pub fn print_types(registry: &TypeRegistry) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Type"),
        header_cell("Description"),
        header_cell("Levels"),
        header_cell("Corpora"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for definition in registry.iter() {
        let corpora: Vec<&str> = definition.corpora().iter().map(ReferenceCorpus::name).collect();
        table.add_row(vec![
            type_cell(definition.name(), true),
            Cell::new(definition.description().unwrap_or_default()),
            Cell::new(definition.categorizers().len()),
            if corpora.is_empty() {
                Cell::new("none").fg(Color::Yellow)
            } else {
                Cell::new(corpora.join(", "))
            },
        ]);
    }
    println!("{table}");
}

/// One row per (type, corpus) with a count of tables in each state.
pub fn print_cache_report(report: &[CacheReportEntry]) {
    let mut grouped: BTreeMap<(&str, &str), StatusCounts> = BTreeMap::new();
    for entry in report {
        grouped
            .entry((entry.type_name.as_str(), entry.corpus.as_str()))
            .or_default()
            .add(entry.status);
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Type"),
        header_cell("Corpus"),
        header_cell("Fresh"),
        header_cell("Stale"),
        header_cell("Missing"),
        header_cell("Note"),
    ]);
    apply_table_style(&mut table);
    for index in 2..5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for ((type_name, corpus), counts) in grouped {
        table.add_row(vec![
            type_cell(type_name, true),
            Cell::new(corpus),
            status_count_cell(counts.fresh, Color::Green),
            status_count_cell(counts.stale, Color::Yellow),
            status_count_cell(counts.missing, Color::Red),
            if counts.unavailable > 0 {
                Cell::new("corpus unavailable").fg(Color::Red)
            } else {
                counts
                    .stale_reason
                    .map_or_else(|| dim_cell("-"), Cell::new)
            },
        ]);
    }
    println!("{table}");
}

#[derive(Debug, Default)]
struct StatusCounts {
    fresh: usize,
    stale: usize,
    missing: usize,
    unavailable: usize,
    stale_reason: Option<String>,
}

impl StatusCounts {
    fn add(&mut self, status: Option<CacheStatus>) {
        match status {
            Some(CacheStatus::Fresh) => self.fresh += 1,
            Some(CacheStatus::Stale(reason)) => {
                self.stale += 1;
                self.stale_reason.get_or_insert_with(|| reason.to_string());
            }
            Some(CacheStatus::Missing) => self.missing += 1,
            None => self.unavailable += 1,
        }
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn column_cell(name: &str) -> Cell {
    Cell::new(name)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn type_cell(name: &str, highlight: bool) -> Cell {
    if highlight {
        Cell::new(name).add_attribute(Attribute::Bold)
    } else {
        Cell::new(name)
    }
}

fn distance_cell(distance: f64) -> Cell {
    let cell = Cell::new(format!("{distance:.4}"));
    if distance < STRONG_MATCH {
        cell.fg(Color::Green)
    } else {
        cell.fg(Color::Yellow)
    }
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).fg(Color::Yellow)
    } else {
        dim_cell(count)
    }
}

fn status_count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
