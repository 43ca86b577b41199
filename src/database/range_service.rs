use crate::database::builder::LAST_ROW;
use crate::database::builder::MAX_ROWS;
use crate::database::range::Span;
use crate::error::SheetManagerError;
use crate::spreadsheet::cell::Value;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::Grid;
use std::cell::Cell;
use thiserror::Error;

/// Errors raised while validating writes into a range.
#[derive(Error, Debug)]
pub enum RangeServiceError {
    #[error("Data out of range, columns available {available} used {used}")]
    DataOutOfRange { available: usize, used: usize },

    #[error("Values rows of different sizes")]
    UnevenValues,

    #[error("The array must store at least 1 row")]
    InvalidRangeValues,
}

/// Sort request for a range: a 1-based column relative to the range, and a direction.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SortOptions {
    pub column: Option<usize>,
    /// Descending when omitted
    pub ascending: Option<bool>,
}

impl From<usize> for SortOptions {
    fn from(column: usize) -> Self {
        SortOptions { column: Some(column), ascending: None }
    }
}

/// Owns the current span of one entity's data and re-measures it around every mutation.
pub struct RangeService<G: Grid> {
    sheet: Sheet<G>,
    range: Cell<Span>,
}

impl<G: Grid> RangeService<G> {
    pub fn new(sheet: Sheet<G>, range: Span) -> Self {
        Self { sheet, range: Cell::new(range) }
    }

    /// The current span.
    pub fn range(&self) -> Span {
        self.range.get()
    }

    pub fn get_values(&self) -> Result<Vec<Vec<Value>>, SheetManagerError> {
        self.sheet.values(&self.range.get())
    }

    /// Appends `values` below the last populated row of the sheet, at the span's column.
    /// Nothing is written unless the whole payload is valid.
    pub fn append_values(&self, values: &[Vec<Value>]) -> Result<(), SheetManagerError> {
        let first = values.first().ok_or(RangeServiceError::InvalidRangeValues)?;
        self.invalidate_range()?;
        let range = self.range.get();
        let width = first.len();
        if width > range.columns {
            Err(RangeServiceError::DataOutOfRange { available: range.columns, used: width })?
        }
        if values.iter().any(|row| row.len() != width) {
            Err(RangeServiceError::UnevenValues)?
        }
        let target = self
            .sheet
            .range((format!("{} + 1", LAST_ROW), range.column, values.len(), width))?;
        tracing::debug!(
            sheet = %self.sheet.name(),
            range = %target,
            rows = values.len(),
            "Appending rows"
        );
        self.sheet.set_values(&target, values)?;
        self.invalidate_range()
    }

    /// Sorts the span's rows. The column is relative to the span; the first
    /// column of the span is used when none is given.
    pub fn sort(&self, options: impl Into<SortOptions>) -> Result<(), SheetManagerError> {
        self.invalidate_range()?;
        let options = options.into();
        let range = self.range.get();
        let column = match options.column {
            Some(column) if column > 0 => column + range.column - 1,
            _ => range.column,
        };
        let ascending = options.ascending.unwrap_or(false);
        tracing::debug!(sheet = %self.sheet.name(), %range, column, ascending, "Sorting range");
        self.sheet.sort(&range, column, ascending)?;
        self.invalidate_range()
    }

    /// Clears the given 1-based rows of the span, across the span's width, as one batch.
    pub fn clear_rows(&self, rows: &[usize]) -> Result<(), SheetManagerError> {
        if rows.is_empty() {
            return Ok(());
        }
        self.invalidate_range()?;
        let range = self.range.get();
        let offset = range.row - 1;
        let addresses = rows
            .iter()
            .map(|row| {
                self.sheet
                    .range((row + offset, range.column, 1, range.columns))
                    .map(|span| span.a1_notation())
            })
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(sheet = %self.sheet.name(), ranges = ?addresses, "Clearing rows");
        self.sheet.clear(&addresses)?;
        self.invalidate_range()
    }

    /// Re-measures the span down to the grid's current bottom, keeping its
    /// top-left corner and width.
    pub fn invalidate_range(&self) -> Result<(), SheetManagerError> {
        let range = self.range.get();
        self.sheet.invalidate_cache();
        let rows = format!("{} - {}", MAX_ROWS, range.row - 1);
        let measured = self.sheet.range((range.row, range.column, rows, range.columns))?;
        tracing::trace!(from = %range, to = %measured, "Re-measured range");
        self.range.set(measured);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::memory::MemoryGrid;
    use crate::spreadsheet::SharedGrid;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn row(values: &[i32]) -> Vec<Value> {
        values.iter().map(|value| Value::from(*value)).collect()
    }

    /// Header row plus two data rows; data span starts at B2 and is 2 columns wide.
    fn service() -> (SharedGrid<MemoryGrid>, RangeService<MemoryGrid>) {
        let grid = Rc::new(RefCell::new(MemoryGrid::from_rows(
            "data",
            vec![
                vec![Value::Empty, Value::from("a"), Value::from("b")],
                vec![Value::Empty, Value::from(1), Value::from(2)],
                vec![Value::Empty, Value::from(3), Value::from(4)],
            ],
        )));
        let service = RangeService::new(Sheet::new(grid.clone()), Span::new(2, 2, 2, 2));
        (grid, service)
    }

    #[test]
    fn get_values_reads_span() {
        let (_, service) = service();
        assert_eq!(service.get_values().unwrap(), vec![row(&[1, 2]), row(&[3, 4])]);
    }

    #[test]
    fn append_writes_after_last_row() {
        let (grid, service) = service();
        service.append_values(&[row(&[5, 6]), row(&[7, 8])]).unwrap();

        let grid = grid.borrow();
        assert_eq!(grid.max_rows(), 5);
        assert_eq!(
            grid.read_cells(&Span::new(4, 2, 2, 2)).unwrap(),
            vec![row(&[5, 6]), row(&[7, 8])]
        );
        assert_eq!(service.get_values().unwrap().len(), 4);
    }

    #[test]
    fn range_follows_grid_after_append() {
        let (_, service) = service();
        service.append_values(&[row(&[5, 6])]).unwrap();

        assert_eq!(service.range(), Span::new(2, 2, 3, 2));
        assert_eq!(service.get_values().unwrap()[2], row(&[5, 6]));
    }

    #[test]
    fn range_follows_grid_after_external_write() {
        let (grid, service) = service();
        grid.borrow_mut().write_cells(&Span::new(4, 2, 1, 2), &[row(&[5, 6])]).unwrap();
        service.sort(1).unwrap();

        assert_eq!(service.range(), Span::new(2, 2, 3, 2));
        assert_eq!(service.get_values().unwrap()[0], row(&[5, 6]));
    }

    #[test]
    fn append_narrower_rows() {
        let (grid, service) = service();
        service.append_values(&[row(&[9])]).unwrap();
        assert_eq!(grid.borrow().cell(4, 2), Some(&Value::from(9)));
        assert!(grid.borrow().cell(4, 3).unwrap().is_empty());
    }

    #[test]
    fn append_rejects_invalid_payloads() {
        let (grid, service) = service();
        let before = grid.borrow().rows().to_vec();

        let error = service.append_values(&[]).unwrap_err();
        assert!(matches!(
            error,
            SheetManagerError::RangeServiceError(RangeServiceError::InvalidRangeValues)
        ));

        let error = service.append_values(&[row(&[1, 2]), row(&[3, 4, 5])]).unwrap_err();
        assert!(matches!(
            error,
            SheetManagerError::RangeServiceError(RangeServiceError::UnevenValues)
        ));

        let error = service.append_values(&[row(&[1, 2, 3])]).unwrap_err();
        assert_eq!(error.to_string(), "Data out of range, columns available 2 used 3");

        assert_eq!(grid.borrow().rows(), before.as_slice());
    }

    #[test]
    fn sort_translates_relative_column() {
        let (grid, service) = service();
        service.sort(SortOptions { column: Some(2), ascending: None }).unwrap();
        assert_eq!(
            grid.borrow().read_cells(&Span::new(2, 2, 2, 2)).unwrap(),
            vec![row(&[3, 4]), row(&[1, 2])]
        );

        service.sort(SortOptions { column: Some(1), ascending: Some(true) }).unwrap();
        assert_eq!(
            grid.borrow().read_cells(&Span::new(2, 2, 2, 2)).unwrap(),
            vec![row(&[1, 2]), row(&[3, 4])]
        );

        service.sort(1).unwrap();
        assert_eq!(grid.borrow().cell(2, 2), Some(&Value::from(3)));
        assert_eq!(grid.borrow().cell(1, 2), Some(&Value::from("a")));
    }

    #[test]
    fn clear_rows_is_relative_to_span() {
        let (grid, service) = service();
        service.clear_rows(&[2]).unwrap();

        let grid = grid.borrow();
        assert_eq!(grid.cell(2, 2), Some(&Value::from(1)));
        assert!(grid.cell(3, 2).unwrap().is_empty());
        assert!(grid.cell(3, 3).unwrap().is_empty());
    }

    #[test]
    fn clear_no_rows_is_noop() {
        let (grid, service) = service();
        service.clear_rows(&[]).unwrap();
        assert_eq!(grid.borrow().last_row(), 3);
    }
}
