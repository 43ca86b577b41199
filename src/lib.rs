//! # Sheet Manager
//!
//! An entity-mapping and query engine that treats a grid of cells as a row store
//! and exposes a repository-style CRUD API over it.
//!
//! ## Features
//!
//! - **Declarative schemas**: map entity fields to columns by header name or index,
//!   from code or from JSON
//! - **Range addressing**: numeric tuples, A1 notation, resolver functions and
//!   arithmetic expressions over `lr`, `lc`, `mr` and `mc` (last row, last column,
//!   max rows, max columns)
//! - **Transforms**: field-level and entity-level `to`/`from` functions applied
//!   while reading and writing
//! - **Filters**: MongoDB-style field conditions with `$gte`, `$lte`, `$gt`, `$lt`,
//!   `$ne`, `$in`, `$nin` and `$and`/`$or` composition
//! - **Pluggable storage**: any backend implementing [`Grid`] and [`Workbook`];
//!   [`MemoryWorkbook`] is provided
//!
//! ## Example
//!
//! ```
//! use sheet_manager::{data_source, DataSourceOptions, EntitySchemaOptions, Filter};
//! use sheet_manager::{MemoryGrid, MemoryWorkbook, Value};
//!
//! let mut workbook = MemoryWorkbook::new("book");
//! workbook.add_sheet(MemoryGrid::from_rows(
//!     "users",
//!     vec![
//!         vec![Value::from("Name"), Value::from("Age")],
//!         vec![Value::from("Ann"), Value::from(31)],
//!         vec![Value::from("Bob"), Value::from(17)],
//!     ],
//! ));
//!
//! let options = DataSourceOptions::new().entity(
//!     EntitySchemaOptions::new("users")
//!         .headers("1, 1, 1, lc")
//!         .column("name", "Name")
//!         .column("age", "Age"),
//! );
//! let mut source = data_source(workbook, options)?;
//! let users = source.get_repository("users")?;
//!
//! let adults = users.find(&Filter::new().gte("age", 18))?;
//! assert_eq!(adults.len(), 1);
//! # Ok::<(), sheet_manager::SheetManagerError>(())
//! ```
pub mod database;
pub mod error;
pub mod mapper;
pub mod repository;
pub mod spreadsheet;

pub use crate::database::column::ColumnOptions;
pub use crate::database::column::Transform;
pub use crate::database::schema::EntitySchemaOptions;
pub use crate::database::source::DataSource;
pub use crate::database::source::DataSourceOptions;
pub use crate::error::ErrorPresenter;
pub use crate::error::SheetManagerError;
pub use crate::mapper::Entity;
pub use crate::repository::criteria::Filter;
pub use crate::repository::DeleteResult;
pub use crate::repository::Repository;
pub use crate::spreadsheet::cell::Value;
pub use crate::spreadsheet::memory::MemoryGrid;
pub use crate::spreadsheet::memory::MemoryWorkbook;
pub use crate::spreadsheet::Grid;
pub use crate::spreadsheet::Selector;
pub use crate::spreadsheet::Workbook;

/// Creates a data source over `workbook`.
///
/// Every entity schema is validated up front; repositories are built lazily by
/// [`DataSource::get_repository`].
pub fn data_source<W: Workbook>(
    workbook: W,
    options: DataSourceOptions,
) -> Result<DataSource<W>, SheetManagerError> {
    DataSource::new(workbook, options)
}
