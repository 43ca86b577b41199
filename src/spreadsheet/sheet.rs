use crate::database::builder::RangeAddress;
use crate::database::builder::RangeBuilder;
use crate::database::range::Span;
use crate::error::SheetManagerError;
use crate::spreadsheet::cell::Value;
use crate::spreadsheet::Grid;
use crate::spreadsheet::SharedGrid;
use std::cell::Cell;

/// Lazily measured grid metrics, cached until explicitly invalidated.
#[derive(Debug, Default)]
pub struct GridMetrics {
    last_row: Cell<Option<usize>>,
    last_column: Cell<Option<usize>>,
    max_rows: Cell<Option<usize>>,
    max_columns: Cell<Option<usize>>,
}

impl GridMetrics {
    fn cached(slot: &Cell<Option<usize>>, measure: impl FnOnce() -> usize) -> usize {
        slot.get().unwrap_or_else(|| {
            let value = measure();
            slot.set(Some(value));
            value
        })
    }

    pub fn last_row(&self, grid: &dyn Grid) -> usize {
        Self::cached(&self.last_row, || grid.last_row())
    }

    pub fn last_column(&self, grid: &dyn Grid) -> usize {
        Self::cached(&self.last_column, || grid.last_column())
    }

    pub fn max_rows(&self, grid: &dyn Grid) -> usize {
        Self::cached(&self.max_rows, || grid.max_rows())
    }

    pub fn max_columns(&self, grid: &dyn Grid) -> usize {
        Self::cached(&self.max_columns, || grid.max_columns())
    }

    /// Forgets every cached metric; the next read measures the grid again.
    pub fn invalidate(&self) {
        self.last_row.set(None);
        self.last_column.set(None);
        self.max_rows.set(None);
        self.max_columns.set(None);
    }
}

/// A grid handle plus its metrics cache.
/// Every mutation made through the sheet invalidates the cache.
pub struct Sheet<G: Grid> {
    grid: SharedGrid<G>,
    metrics: GridMetrics,
}

impl<G: Grid> Sheet<G> {
    pub fn new(grid: SharedGrid<G>) -> Self {
        Self { grid, metrics: GridMetrics::default() }
    }

    pub fn name(&self) -> String {
        self.grid.borrow().name().to_owned()
    }

    pub fn last_row(&self) -> usize {
        self.metrics.last_row(&*self.grid.borrow())
    }

    pub fn last_column(&self) -> usize {
        self.metrics.last_column(&*self.grid.borrow())
    }

    pub fn max_rows(&self) -> usize {
        self.metrics.max_rows(&*self.grid.borrow())
    }

    pub fn max_columns(&self) -> usize {
        self.metrics.max_columns(&*self.grid.borrow())
    }

    /// Resolves a range address against the current grid metrics.
    pub fn range(&self, address: impl Into<RangeAddress>) -> Result<Span, SheetManagerError> {
        let grid = self.grid.borrow();
        RangeBuilder::new(&*grid, &self.metrics).resolve(&address.into())
    }

    pub fn values(&self, span: &Span) -> Result<Vec<Vec<Value>>, SheetManagerError> {
        Ok(self.grid.borrow().read_cells(span)?)
    }

    pub fn set_values(&self, span: &Span, values: &[Vec<Value>]) -> Result<(), SheetManagerError> {
        let result = self.grid.borrow_mut().write_cells(span, values);
        self.invalidate_cache();
        Ok(result?)
    }

    pub fn clear(&self, addresses: &[String]) -> Result<(), SheetManagerError> {
        let result = self.grid.borrow_mut().clear_ranges(addresses);
        self.invalidate_cache();
        Ok(result?)
    }

    pub fn sort(
        &self,
        span: &Span,
        column: usize,
        ascending: bool,
    ) -> Result<(), SheetManagerError> {
        let result = self.grid.borrow_mut().sort_range(span, column, ascending);
        self.invalidate_cache();
        Ok(result?)
    }

    pub fn invalidate_cache(&self) {
        self.metrics.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::memory::MemoryGrid;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn sheet() -> (SharedGrid<MemoryGrid>, Sheet<MemoryGrid>) {
        let grid = Rc::new(RefCell::new(MemoryGrid::from_rows(
            "people",
            vec![
                vec![Value::from("name"), Value::from("age")],
                vec![Value::from("Ann"), Value::from(31)],
            ],
        )));
        (grid.clone(), Sheet::new(grid))
    }

    #[test]
    fn metrics_are_cached_until_invalidated() {
        let (grid, sheet) = sheet();
        assert_eq!(sheet.last_row(), 2);

        grid.borrow_mut()
            .write_cells(&Span::new(3, 1, 1, 2), &[vec![Value::from("Bob"), Value::from(40)]])
            .unwrap();
        assert_eq!(sheet.last_row(), 2);

        sheet.invalidate_cache();
        assert_eq!(sheet.last_row(), 3);
    }

    #[test]
    fn mutations_invalidate_metrics() {
        let (_, sheet) = sheet();
        assert_eq!(sheet.last_row(), 2);
        assert_eq!(sheet.max_rows(), 2);

        let span = sheet.range("lr + 1, 1, 1, 2").unwrap();
        sheet.set_values(&span, &[vec![Value::from("Bob"), Value::from(40)]]).unwrap();

        assert_eq!(sheet.last_row(), 3);
        assert_eq!(sheet.max_rows(), 3);
        assert_eq!(sheet.values(&Span::new(3, 1, 1, 2)).unwrap()[0][0], Value::from("Bob"));

        sheet.clear(&["A3:B3".to_owned()]).unwrap();
        assert_eq!(sheet.last_row(), 2);
    }
}
