use crate::database::column::ColumnDeclaration;
use crate::database::column::ColumnSelector;
use thiserror::Error;

/// Errors related to resolving column declarations against headers.
#[derive(Error, Debug)]
pub enum MapBuilderError {
    #[error("Bad column selector, column {0} not found")]
    BadColumnSelector(String),
}

/// Field name to 0-based column index, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnMap {
    entries: Vec<(String, usize)>,
}

impl ColumnMap {
    pub fn get(&self, field: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, index)| *index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(name, index)| (name.as_str(), *index))
    }

    /// Largest mapped index, None for an empty map.
    pub fn max_index(&self) -> Option<usize> {
        self.entries.iter().map(|(_, index)| *index).max()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, usize)> for ColumnMap {
    fn from_iter<I: IntoIterator<Item = (S, usize)>>(iter: I) -> Self {
        ColumnMap {
            entries: iter.into_iter().map(|(name, index)| (name.into(), index)).collect(),
        }
    }
}

/// Resolves column declarations to indexes, looking header selectors up in the header row.
pub struct MapBuilder<'a> {
    columns: &'a [(String, ColumnDeclaration)],
    headers: Vec<String>,
}

impl<'a> MapBuilder<'a> {
    /// `headers` is the header row as text; pass an empty list when no header range is configured.
    pub fn new(columns: &'a [(String, ColumnDeclaration)], headers: Vec<String>) -> Self {
        Self { columns, headers }
    }

    pub fn build(&self) -> Result<ColumnMap, MapBuilderError> {
        self.columns
            .iter()
            .map(|(field, column)| {
                let index = match &column.selector {
                    ColumnSelector::Index(index) => *index,
                    ColumnSelector::Header(header) => self
                        .headers
                        .iter()
                        .position(|candidate| candidate == header)
                        .ok_or_else(|| MapBuilderError::BadColumnSelector(header.to_owned()))?,
                };
                Ok((field.to_owned(), index))
            })
            .collect()
    }
}
