use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use onco_cli::commands::{LookupOutcome, NormalizedId};
use onco_mapping::MappingResult;
use onco_reconcile::BuildStats;

pub fn print_normalized(ids: &[NormalizedId]) {
    for id in ids {
        match &id.canonical {
            Some(canonical) => println!("{}\t{canonical}", id.raw),
            None => println!("{}\tinvalid", id.raw),
        }
    }
}

pub fn print_lookup(outcome: &LookupOutcome) {
    print_build_stats(&outcome.stats);
    let Some(record) = &outcome.record else {
        println!("{}: not found", outcome.query);
        return;
    };
    let mut table = Table::new();
    table.set_header(vec![header_cell("Field"), header_cell("Value")]);
    apply_table_style(&mut table);
    let rows = [
        ("Accession number", record.identifier.as_str()),
        ("Tumor ID", record.tumor_identifier.as_str()),
        ("Diagnosis date", record.diagnosis_date.as_str()),
        ("ICD-10 code", record.icd10_code.as_str()),
        ("ICD-10 version", record.icd10_version.as_str()),
        ("Body side", record.body_side_code.as_str()),
        ("Diagnosis certainty", record.diagnosis_certainty_code.as_str()),
    ];
    for (field, value) in rows {
        table.add_row(vec![Cell::new(field), value_cell(value)]);
    }
    println!("{table}");
}

pub fn print_mapping(result: &MappingResult, stats: &BuildStats) {
    print_build_stats(stats);
    println!("Key: {}", result.key);
    let mut table = Table::new();
    table.set_header(vec![header_cell(""), header_cell("In"), header_cell("Out")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    table.add_row(count_row("Patients", result.patients_in, result.patients_out));
    table.add_row(count_row("Messages", result.messages_in, result.messages_out));
    println!("{table}");

    let enrichment = &result.enrichment;
    println!(
        "Messages enriched: {} of {} ({} without record, {} unrecognized accession numbers)",
        enrichment.hits, enrichment.entries, enrichment.misses, enrichment.invalid
    );
    if result.has_warning() {
        eprintln!("warning: the mapped document has fewer patients or messages than the input");
    }
}

fn print_build_stats(stats: &BuildStats) {
    println!(
        "Extract: {} rows, {} indexed, {} ambiguous, {} invalid, {} unreadable",
        stats.rows, stats.kept, stats.ambiguous_rows, stats.invalid, stats.skipped
    );
}

fn count_row(label: &str, input: usize, output: usize) -> Vec<Cell> {
    let out = if input == output {
        Cell::new(output)
    } else {
        Cell::new(output)
            .fg(Color::Yellow)
            .add_attribute(Attribute::Bold)
    };
    vec![Cell::new(label), Cell::new(input), out]
}

fn value_cell(value: &str) -> Cell {
    if value.trim().is_empty() {
        Cell::new("-").fg(Color::DarkGrey)
    } else {
        Cell::new(value)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
