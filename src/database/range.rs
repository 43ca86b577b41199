use crate::spreadsheet::reference::col_to_index;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::reference::row_to_index;
use regex::Regex;
use std::fmt::Display;
use std::sync::LazyLock;
use thiserror::Error;

static A1_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z]*)(\d*)(:([A-Z]*)(\d*))?$").expect("Hardcode regex pattern")
});

/// Errors related to range addressing.
#[derive(Error, Debug)]
pub enum RangeError {
    #[error("Invalid range signature: {0} for Sheet.getRange()")]
    BadRangeSignature(String),

    #[error("The expression({0}) did not give a number.")]
    TokenResultNotNumber(String),

    #[error("Incorrect range values. Sheet.getRange({0})")]
    IncorrectRange(String),

    #[error("Invalid range format '{0}'")]
    FormatError(String),
}

/// A rectangular block of the grid: 1-based top-left corner plus height and width.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    pub row: usize,
    pub column: usize,
    pub rows: usize,
    pub columns: usize,
}

impl Span {
    pub const fn new(row: usize, column: usize, rows: usize, columns: usize) -> Self {
        Span { row, column, rows, columns }
    }

    /// Last row covered by the span.
    pub const fn last_row(&self) -> usize {
        self.row + self.rows - 1
    }

    /// Last column covered by the span.
    pub const fn last_column(&self) -> usize {
        self.column + self.columns - 1
    }

    /// Checks that every field is at least 1 and that the span's far edges are addressable.
    pub fn validated(self) -> Result<Self, RangeError> {
        let fields = [self.row, self.column, self.rows, self.columns];
        let in_bounds = fields.iter().all(|field| *field >= 1)
            && self.row.checked_add(self.rows).is_some()
            && self.column.checked_add(self.columns).is_some();
        if !in_bounds {
            let arguments = fields.map(|field| field.to_string()).join(",");
            return Err(RangeError::IncorrectRange(arguments));
        }
        Ok(self)
    }

    /// Returns the A1-style address of the span ("B2" or "B2:D9").
    pub fn a1_notation(&self) -> String {
        let start = index_to_reference(self.row - 1, self.column - 1);
        if self.rows == 1 && self.columns == 1 {
            start
        } else {
            let end = index_to_reference(self.last_row() - 1, self.last_column() - 1);
            format!("{}:{}", start, end)
        }
    }

    /// Parses an A1-style address (e.g. "A1", "B2:C5", "A:C", "2:5").
    ///
    /// Open-ended bounds (whole columns, whole rows, "A2:C") extend to the
    /// grid's allocated extent given by `max_rows` and `max_columns`.
    pub fn parse_a1(value: &str, max_rows: usize, max_columns: usize) -> Result<Self, RangeError> {
        let value = value.trim().to_ascii_uppercase();
        let captures = A1_PATTERN
            .captures(value.as_str())
            .ok_or_else(|| RangeError::FormatError(value.to_owned()))?;
        let bound = |group: usize, parse: fn(&str) -> Option<usize>| {
            captures.get(group).map(|matcher| matcher.as_str()).and_then(parse)
        };
        let col_lower_bound = bound(1, col_to_index);
        let row_lower_bound = bound(2, row_to_index);
        let col_upper_bound = bound(4, col_to_index);
        let row_upper_bound = bound(5, row_to_index);
        let row_limit = max_rows.saturating_sub(1);
        let col_limit = max_columns.saturating_sub(1);

        if col_lower_bound.is_none() && row_lower_bound.is_none() {
            return Err(RangeError::FormatError(value.to_owned()));
        }

        let (rows, cols) = if captures.get(3).is_none() {
            // A lone column ("C") or a lone row ("5") selects the whole line
            let rows = row_lower_bound.map_or((0, row_limit), |row| (row, row));
            let cols = col_lower_bound.map_or((0, col_limit), |col| (col, col));
            (rows, cols)
        } else {
            let rows = (
                row_lower_bound.unwrap_or(0),
                row_upper_bound.unwrap_or(row_limit),
            );
            let cols = (
                col_lower_bound.unwrap_or(0),
                col_upper_bound.unwrap_or(col_limit),
            );
            (rows, cols)
        };
        let (row_lower, row_upper) = (rows.0.min(rows.1), rows.0.max(rows.1));
        let (col_lower, col_upper) = (cols.0.min(cols.1), cols.0.max(cols.1));

        Ok(Span {
            row: row_lower + 1,
            column: col_lower + 1,
            rows: row_upper - row_lower + 1,
            columns: col_upper - col_lower + 1,
        })
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.a1_notation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_bounds() {
        let span = Span::new(2, 3, 4, 2);

        assert_eq!(span.last_row(), 5);
        assert_eq!(span.last_column(), 4);
    }

    #[test]
    fn validated_rejects_degenerate_spans() {
        assert_eq!(Span::new(2, 3, 4, 2).validated().unwrap(), Span::new(2, 3, 4, 2));
        assert!(matches!(Span::new(0, 1, 1, 1).validated(), Err(RangeError::IncorrectRange(_))));
        assert!(matches!(Span::new(1, 1, 1, 0).validated(), Err(RangeError::IncorrectRange(_))));

        let error = Span::new(usize::MAX, 1, 2, 1).validated().unwrap_err();
        assert_eq!(
            error.to_string(),
            format!("Incorrect range values. Sheet.getRange({},1,2,1)", usize::MAX)
        );
    }

    #[test]
    fn a1_notation() {
        assert_eq!(Span::new(1, 1, 1, 1).a1_notation(), "A1");
        assert_eq!(Span::new(2, 2, 8, 3).a1_notation(), "B2:D9");
        assert_eq!(Span::new(10, 27, 1, 2).a1_notation(), "AA10:AB10");
    }

    #[test]
    fn parse_single_cell_and_block() {
        assert_eq!(Span::parse_a1("A1", 100, 26).unwrap(), Span::new(1, 1, 1, 1));
        assert_eq!(Span::parse_a1("b2:d9", 100, 26).unwrap(), Span::new(2, 2, 8, 3));
        assert_eq!(Span::parse_a1("D9:B2", 100, 26).unwrap(), Span::new(2, 2, 8, 3));
    }

    #[test]
    fn parse_open_ended() {
        assert_eq!(Span::parse_a1("A:C", 100, 26).unwrap(), Span::new(1, 1, 100, 3));
        assert_eq!(Span::parse_a1("2:5", 100, 26).unwrap(), Span::new(2, 1, 4, 26));
        assert_eq!(Span::parse_a1("A2:C", 100, 26).unwrap(), Span::new(2, 1, 99, 3));
        assert_eq!(Span::parse_a1("C", 100, 26).unwrap(), Span::new(1, 3, 100, 1));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(Span::parse_a1("", 10, 10), Err(RangeError::FormatError(_))));
        assert!(matches!(Span::parse_a1("A1:B2:C3", 10, 10), Err(RangeError::FormatError(_))));
        assert!(matches!(Span::parse_a1("1A", 10, 10), Err(RangeError::FormatError(_))));
    }

    #[test]
    fn a1_round_trip() {
        let span = Span::new(7, 30, 12, 4);
        assert_eq!(Span::parse_a1(&span.a1_notation(), 1000, 100).unwrap(), span);
    }
}
