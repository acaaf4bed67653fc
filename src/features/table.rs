//! Delimited text → header + string rows, with delimiter sniffing.

use crate::error::{Result, SentinelError};

const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];
const SNIFF_LINES: usize = 6;

/// Raw string table: headers as written, rows possibly ragged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Rows as (header, cell) pairs. Missing trailing cells are omitted.
    pub fn records(&self) -> impl Iterator<Item = Vec<(&str, &str)>> + '_ {
        self.rows.iter().map(move |row| {
            self.headers
                .iter()
                .zip(row.iter())
                .map(|(h, c)| (h.as_str(), c.as_str()))
                .collect()
        })
    }
}

/// Pick the delimiter that splits the first lines most consistently.
pub(crate) fn sniff_delimiter(text: &str) -> u8 {
    let lines: Vec<&str> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();
    let Some(header) = lines.first() else {
        return b',';
    };

    let mut best: Option<(bool, usize, u8)> = None;
    for d in DELIMITERS {
        let in_header = header.bytes().filter(|b| *b == d).count();
        if in_header == 0 {
            continue;
        }
        let consistent = lines
            .iter()
            .all(|l| l.bytes().filter(|b| *b == d).count() == in_header);
        let candidate = (consistent, in_header, d);
        if best.map_or(true, |(c, n, _)| (consistent, in_header) > (c, n)) {
            best = Some(candidate);
        }
    }
    best.map(|(_, _, d)| d).unwrap_or(b',')
}

fn unreadable(e: impl std::fmt::Display) -> SentinelError {
    SentinelError::input(format!("unable to read table: {}", e))
}

pub fn parse_table(bytes: &[u8]) -> Result<Table> {
    let text = std::str::from_utf8(bytes).map_err(unreadable)?;
    let text = text.trim_start_matches('\u{feff}');
    if text.trim().is_empty() {
        return Err(SentinelError::input("unable to read table: empty upload"));
    }

    let delimiter = sniff_delimiter(text);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(unreadable)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(unreadable)?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    tracing::debug!(
        delimiter = %(delimiter as char).escape_default(),
        columns = headers.len(),
        rows = rows.len(),
        "table parsed"
    );
    Ok(Table { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_common_delimiters() {
        assert_eq!(sniff_delimiter("a,b,c\n1,2,3\n"), b',');
        assert_eq!(sniff_delimiter("a;b;c\n1;2;3\n"), b';');
        assert_eq!(sniff_delimiter("a\tb\n1\t2\n"), b'\t');
        assert_eq!(sniff_delimiter("a|b\n1|2\n"), b'|');
        assert_eq!(sniff_delimiter("single\n1\n"), b',');
    }

    #[test]
    fn consistent_delimiter_beats_frequent_one() {
        // Decimal commas inside semicolon-separated cells
        let text = "a;b\n1,5;2,25\n3;4\n";
        assert_eq!(sniff_delimiter(text), b';');
    }

    #[test]
    fn parses_quoted_and_ragged_rows() {
        let t = parse_table(b"Flow Duration,Note\n5,\"a, b\"\n7\n").unwrap();
        assert_eq!(t.headers, vec!["Flow Duration", "Note"]);
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[0][1], "a, b");
        let recs: Vec<_> = t.records().collect();
        assert_eq!(recs[1], vec![("Flow Duration", "7")]);
    }

    #[test]
    fn strips_byte_order_mark() {
        let t = parse_table("\u{feff}x;y\n1;2\n".as_bytes()).unwrap();
        assert_eq!(t.headers[0], "x");
    }

    #[test]
    fn empty_and_binary_uploads_are_rejected() {
        assert!(matches!(parse_table(b""), Err(SentinelError::Input(_))));
        assert!(matches!(parse_table(b"  \n\n"), Err(SentinelError::Input(_))));
        assert!(matches!(parse_table(&[0xff, 0xfe, 0x00, 0x80]), Err(SentinelError::Input(_))));
    }
}
