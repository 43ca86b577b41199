//! # Spreadsheet Collaborator Module
//!
//! Interfaces to the backing grid storage and the thin adapters the engine
//! layers on top of it. The engine never talks to a storage backend directly:
//! everything goes through [`Grid`] (one sheet) and [`Workbook`] (a set of
//! sheets), so any host can plug in its own backend. [`memory`] provides an
//! in-memory implementation.
pub mod cell;
pub mod memory;
pub(crate) mod reference;
pub mod sheet;
pub mod table;

use crate::database::range::Span;
use crate::spreadsheet::cell::Value;
use serde::Deserialize;
use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

/// Shared handle to a grid. The engine is single-threaded and every repository
/// bound to the same sheet mutates it through this handle.
pub type SharedGrid<G> = Rc<RefCell<G>>;

/// One rectangular sheet of cells, addressed with 1-based rows and columns.
pub trait Grid {
    /// Sheet name.
    fn name(&self) -> &str;

    /// Last row holding any non-blank cell, 0 for a blank sheet.
    fn last_row(&self) -> usize;

    /// Last column holding any non-blank cell, 0 for a blank sheet.
    fn last_column(&self) -> usize;

    /// Total allocated rows.
    fn max_rows(&self) -> usize;

    /// Total allocated columns.
    fn max_columns(&self) -> usize;

    /// Reads the cells covered by `span`, row by row.
    fn read_cells(&self, span: &Span) -> anyhow::Result<Vec<Vec<Value>>>;

    /// Writes `values` into `span`; the value matrix must match the span's size.
    fn write_cells(&mut self, span: &Span, values: &[Vec<Value>]) -> anyhow::Result<()>;

    /// Clears the content of every A1-addressed range as a single batch.
    fn clear_ranges(&mut self, addresses: &[String]) -> anyhow::Result<()>;

    /// Sorts the rows of `span` by the absolute grid `column`.
    fn sort_range(&mut self, span: &Span, column: usize, ascending: bool) -> anyhow::Result<()>;
}

/// A collection of sheets identified by an id.
pub trait Workbook {
    type Grid: Grid;

    fn id(&self) -> &str;

    fn sheet_by_name(&self, name: &str) -> Option<SharedGrid<Self::Grid>>;

    fn sheet_by_index(&self, index: usize) -> Option<SharedGrid<Self::Grid>>;
}

/// Identifies a sheet (and the entity bound to it) by name or by 0-based position.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum Selector {
    Index(usize),
    Name(String),
}

impl Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::Index(index) => write!(f, "{}", index),
            Selector::Name(name) => write!(f, "{}", name),
        }
    }
}

impl From<&str> for Selector {
    fn from(value: &str) -> Self {
        Selector::Name(value.to_owned())
    }
}

impl From<String> for Selector {
    fn from(value: String) -> Self {
        Selector::Name(value)
    }
}

impl From<usize> for Selector {
    fn from(value: usize) -> Self {
        Selector::Index(value)
    }
}

impl From<&Selector> for Selector {
    fn from(value: &Selector) -> Self {
        value.clone()
    }
}
