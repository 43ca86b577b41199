//! In-memory grid backend.
//!
//! Keeps every cell in a dense row-major matrix. Writes past the allocated
//! extent grow the grid; reads outside it fail, as they would on a real sheet.
use crate::database::range::Span;
use crate::spreadsheet::cell::Value;
use crate::spreadsheet::Grid;
use crate::spreadsheet::SharedGrid;
use crate::spreadsheet::Workbook;
use anyhow::bail;
use anyhow::Context;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;

#[derive(Clone, Debug)]
pub struct MemoryGrid {
    name: String,
    cells: Vec<Vec<Value>>,
    max_columns: usize,
}

impl MemoryGrid {
    /// Creates a blank grid with the given allocated extent.
    pub fn new(name: &str, max_rows: usize, max_columns: usize) -> Self {
        Self {
            name: name.to_owned(),
            cells: vec![vec![Value::Empty; max_columns]; max_rows],
            max_columns,
        }
    }

    /// Creates a grid sized exactly to `rows`; short rows are padded with blanks.
    pub fn from_rows(name: &str, rows: Vec<Vec<Value>>) -> Self {
        let max_columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        let cells = rows
            .into_iter()
            .map(|mut row| {
                row.resize(max_columns, Value::Empty);
                row
            })
            .collect();
        Self { name: name.to_owned(), cells, max_columns }
    }

    /// All allocated cells, row by row.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.cells
    }

    /// Returns the cell at the 1-based (row, column) position.
    pub fn cell(&self, row: usize, column: usize) -> Option<&Value> {
        self.cells.get(row.checked_sub(1)?)?.get(column.checked_sub(1)?)
    }

    fn grow(&mut self, rows: usize, columns: usize) {
        if columns > self.max_columns {
            self.max_columns = columns;
            for row in self.cells.iter_mut() {
                row.resize(columns, Value::Empty);
            }
        }
        while self.cells.len() < rows {
            self.cells.push(vec![Value::Empty; self.max_columns]);
        }
    }

    fn check_bounds(&self, span: &Span) -> anyhow::Result<()> {
        if span.row == 0 || span.column == 0 || span.rows == 0 || span.columns == 0 {
            bail!("Range {:?} is empty", span);
        }
        if span.last_row() > self.cells.len() || span.last_column() > self.max_columns {
            bail!(
                "Range {} is out of bounds for sheet '{}' ({} x {})",
                span,
                self.name,
                self.cells.len(),
                self.max_columns
            );
        }
        Ok(())
    }
}

impl Grid for MemoryGrid {
    fn name(&self) -> &str {
        &self.name
    }

    fn last_row(&self) -> usize {
        self.cells
            .iter()
            .rposition(|row| row.iter().any(|cell| !cell.is_empty()))
            .map_or(0, |index| index + 1)
    }

    fn last_column(&self) -> usize {
        self.cells
            .iter()
            .filter_map(|row| row.iter().rposition(|cell| !cell.is_empty()))
            .max()
            .map_or(0, |index| index + 1)
    }

    fn max_rows(&self) -> usize {
        self.cells.len()
    }

    fn max_columns(&self) -> usize {
        self.max_columns
    }

    fn read_cells(&self, span: &Span) -> anyhow::Result<Vec<Vec<Value>>> {
        self.check_bounds(span)?;
        let columns = (span.column - 1)..span.last_column();
        Ok(self.cells[(span.row - 1)..span.last_row()]
            .iter()
            .map(|row| row[columns.clone()].to_vec())
            .collect())
    }

    fn write_cells(&mut self, span: &Span, values: &[Vec<Value>]) -> anyhow::Result<()> {
        if values.len() != span.rows || values.iter().any(|row| row.len() != span.columns) {
            bail!("The data does not match the range {} ({} x {})", span, span.rows, span.columns);
        }
        self.grow(span.last_row(), span.last_column());
        for (offset, row) in values.iter().enumerate() {
            let target = &mut self.cells[span.row - 1 + offset];
            target[(span.column - 1)..span.last_column()].clone_from_slice(row);
        }
        Ok(())
    }

    fn clear_ranges(&mut self, addresses: &[String]) -> anyhow::Result<()> {
        let spans = addresses
            .iter()
            .map(|address| {
                let span = Span::parse_a1(address, self.cells.len(), self.max_columns)
                    .with_context(|| format!("Cannot clear range '{}'", address))?;
                self.check_bounds(&span)?;
                Ok(span)
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        for span in spans {
            for row in &mut self.cells[(span.row - 1)..span.last_row()] {
                row[(span.column - 1)..span.last_column()].fill(Value::Empty);
            }
        }
        Ok(())
    }

    fn sort_range(&mut self, span: &Span, column: usize, ascending: bool) -> anyhow::Result<()> {
        self.check_bounds(span)?;
        if column < span.column || column > span.last_column() {
            bail!("Sort column {} is outside of range {}", column, span);
        }
        let key = column - span.column;
        let mut rows = self.read_cells(span)?;
        // Blank keys sink to the bottom in both directions
        rows.sort_by(|left, right| match (left[key].is_empty(), right[key].is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let ordering = sort_order(&left[key], &right[key]);
                if ascending { ordering } else { ordering.reverse() }
            }
        });
        self.write_cells(span, &rows)
    }
}

/// Total order used for sorting: numbers, dates, strings, booleans; same kinds by value.
fn sort_order(left: &Value, right: &Value) -> Ordering {
    let rank = |value: &Value| match value {
        Value::Number(_) => 0,
        Value::Date(_) => 1,
        Value::String(_) | Value::Empty => 2,
        Value::Boolean(_) => 3,
    };
    left.compare(right)
        .unwrap_or_else(|| rank(left).cmp(&rank(right)))
}

/// A named collection of in-memory grids.
#[derive(Debug, Default)]
pub struct MemoryWorkbook {
    id: String,
    sheets: Vec<SharedGrid<MemoryGrid>>,
}

impl MemoryWorkbook {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_owned(), sheets: Vec::new() }
    }

    /// Adds a sheet and returns a shared handle to it.
    pub fn add_sheet(&mut self, grid: MemoryGrid) -> SharedGrid<MemoryGrid> {
        let grid = Rc::new(RefCell::new(grid));
        self.sheets.push(grid.clone());
        grid
    }
}

impl Workbook for MemoryWorkbook {
    type Grid = MemoryGrid;

    fn id(&self) -> &str {
        &self.id
    }

    fn sheet_by_name(&self, name: &str) -> Option<SharedGrid<MemoryGrid>> {
        self.sheets.iter().find(|sheet| sheet.borrow().name() == name).cloned()
    }

    fn sheet_by_index(&self, index: usize) -> Option<SharedGrid<MemoryGrid>> {
        self.sheets.get(index).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(values: &[i32]) -> Vec<Vec<Value>> {
        values.iter().map(|value| vec![Value::from(*value)]).collect()
    }

    #[test]
    fn metrics_track_populated_cells() {
        let mut grid = MemoryGrid::new("s", 10, 4);
        assert_eq!((grid.last_row(), grid.last_column()), (0, 0));

        let row = vec![Value::from(1), Value::from("x")];
        grid.write_cells(&Span::new(3, 2, 1, 2), &[row]).unwrap();
        assert_eq!((grid.last_row(), grid.last_column()), (3, 3));
        assert_eq!((grid.max_rows(), grid.max_columns()), (10, 4));
    }

    #[test]
    fn write_grows_and_read_checks_bounds() {
        let mut grid = MemoryGrid::new("s", 1, 1);
        grid.write_cells(&Span::new(3, 2, 1, 1), &[vec![Value::from(7)]]).unwrap();

        assert_eq!((grid.max_rows(), grid.max_columns()), (3, 2));
        assert_eq!(grid.cell(3, 2), Some(&Value::from(7)));
        assert!(grid.read_cells(&Span::new(1, 1, 4, 1)).is_err());
        assert!(grid.write_cells(&Span::new(1, 1, 2, 1), &[vec![Value::from(1)]]).is_err());
    }

    #[test]
    fn clear_is_all_or_nothing() {
        let mut grid = MemoryGrid::from_rows("s", numbers(&[1, 2, 3]));
        assert!(grid.clear_ranges(&["A1".to_owned(), "A9".to_owned()]).is_err());
        assert_eq!(grid.cell(1, 1), Some(&Value::from(1)));

        grid.clear_ranges(&["A1".to_owned(), "A3".to_owned()]).unwrap();
        assert_eq!(grid.rows(), [vec![Value::Empty], vec![Value::from(2)], vec![Value::Empty]]);
    }

    #[test]
    fn sort_puts_blanks_last() {
        let mut grid = MemoryGrid::from_rows("s", numbers(&[2, 3, 1]));
        grid.write_cells(&Span::new(4, 1, 1, 1), &[vec![Value::Empty]]).unwrap();
        grid.write_cells(&Span::new(2, 1, 1, 1), &[vec![Value::Empty]]).unwrap();

        grid.sort_range(&Span::new(1, 1, 4, 1), 1, true).unwrap();
        assert_eq!(grid.read_cells(&Span::new(1, 1, 2, 1)).unwrap(), numbers(&[1, 2]));
        assert!(grid.cell(3, 1).unwrap().is_empty());

        grid.sort_range(&Span::new(1, 1, 4, 1), 1, false).unwrap();
        assert_eq!(grid.read_cells(&Span::new(1, 1, 2, 1)).unwrap(), numbers(&[2, 1]));
        assert!(grid.cell(4, 1).unwrap().is_empty());
    }

    #[test]
    fn workbook_lookup() {
        let mut workbook = MemoryWorkbook::new("book");
        workbook.add_sheet(MemoryGrid::new("first", 1, 1));
        workbook.add_sheet(MemoryGrid::new("second", 1, 1));

        assert_eq!(workbook.id(), "book");
        assert_eq!(workbook.sheet_by_name("second").unwrap().borrow().name(), "second");
        assert_eq!(workbook.sheet_by_index(0).unwrap().borrow().name(), "first");
        assert!(workbook.sheet_by_name("third").is_none());
        assert!(workbook.sheet_by_index(2).is_none());
    }
}
