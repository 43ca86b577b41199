use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::Selector;
use crate::spreadsheet::Workbook;
use thiserror::Error;

/// Errors related to locating a workbook and its sheets.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Table by id({0}) not found")]
    IncorrectTableId(String),

    #[error("Sheet by selector({0}) not found")]
    IncorrectSelectorSheet(Selector),
}

/// An opened workbook.
pub struct Table<W: Workbook> {
    workbook: W,
}

impl<W: Workbook> Table<W> {
    /// Opens `workbook`, verifying that it is the one identified by `id` when given.
    pub fn open(workbook: W, id: Option<&str>) -> Result<Self, TableError> {
        match id {
            Some(id) if id != workbook.id() => Err(TableError::IncorrectTableId(id.to_owned())),
            _ => Ok(Self { workbook }),
        }
    }

    pub fn id(&self) -> &str {
        self.workbook.id()
    }

    /// Looks a sheet up by name or by 0-based position.
    pub fn sheet(&self, selector: &Selector) -> Result<Sheet<W::Grid>, TableError> {
        let grid = match selector {
            Selector::Name(name) => self.workbook.sheet_by_name(name),
            Selector::Index(index) => self.workbook.sheet_by_index(*index),
        };
        grid.map(Sheet::new)
            .ok_or_else(|| TableError::IncorrectSelectorSheet(selector.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::memory::MemoryGrid;
    use crate::spreadsheet::memory::MemoryWorkbook;

    fn workbook() -> MemoryWorkbook {
        let mut workbook = MemoryWorkbook::new("book-1");
        workbook.add_sheet(MemoryGrid::new("users", 5, 5));
        workbook
    }

    #[test]
    fn open_checks_id() {
        assert!(Table::open(workbook(), None).is_ok());
        assert!(Table::open(workbook(), Some("book-1")).is_ok());

        let error = Table::open(workbook(), Some("book-2")).err().unwrap();
        assert_eq!(error.to_string(), "Table by id(book-2) not found");
    }

    #[test]
    fn sheet_by_selector() {
        let table = Table::open(workbook(), None).unwrap();

        assert_eq!(table.sheet(&Selector::from("users")).unwrap().name(), "users");
        assert_eq!(table.sheet(&Selector::from(0usize)).unwrap().name(), "users");

        let error = table.sheet(&Selector::from("orders")).err().unwrap();
        assert_eq!(error.to_string(), "Sheet by selector(orders) not found");
    }
}
