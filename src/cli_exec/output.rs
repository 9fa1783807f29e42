use backoffice::model::Record;

const MAX_CELL: usize = 40;

fn clip(s: &str) -> String {
    if s.chars().count() <= MAX_CELL {
        return s.to_string();
    }
    let mut out: String = s.chars().take(MAX_CELL - 1).collect();
    out.push('…');
    out
}

/// Left-aligned text table; one row per record, missing fields blank.
pub(super) fn print_table(columns: &[&str], records: &[Record]) {
    if records.is_empty() {
        println!("(no records)");
        return;
    }
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| columns.iter().map(|c| clip(&r.text(c))).collect())
        .collect();
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(c.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: Vec<&str>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<w$}", cell, w = *w))
            .collect();
        println!("{}", padded.join("  ").trim_end());
    };
    line(columns.to_vec());
    for row in &rows {
        line(row.iter().map(String::as_str).collect());
    }
}

/// `key: value` lines in the record's own field order.
pub(super) fn print_record(record: &Record) {
    let width = record.0.keys().map(|k| k.len()).max().unwrap_or(0);
    for key in record.0.keys() {
        println!("{:<w$}  {}", format!("{}:", key), record.text(key), w = width + 1);
    }
}
