use crate::database::schema::SchemaError;
use crate::spreadsheet::cell::Value;
use serde::Deserialize;
use std::fmt::Debug;
use std::fmt::Display;
use std::rc::Rc;

/// Where a field lives in a row: a literal 0-based index, or a header to look up.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ColumnSelector {
    Index(usize),
    Header(String),
}

impl Display for ColumnSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnSelector::Index(index) => write!(f, "{}", index),
            ColumnSelector::Header(header) => write!(f, "{}", header),
        }
    }
}

impl From<usize> for ColumnSelector {
    fn from(value: usize) -> Self {
        ColumnSelector::Index(value)
    }
}

impl From<&str> for ColumnSelector {
    fn from(value: &str) -> Self {
        ColumnSelector::Header(value.to_owned())
    }
}

impl From<String> for ColumnSelector {
    fn from(value: String) -> Self {
        ColumnSelector::Header(value)
    }
}

/// A bidirectional transform: `to` converts toward the stored row, `from` toward the entity.
/// Missing directions are the identity.
pub struct Transform<T> {
    pub to: Option<Rc<dyn Fn(T) -> T>>,
    pub from: Option<Rc<dyn Fn(T) -> T>>,
}

impl<T> Transform<T> {
    pub fn new() -> Self {
        Self { to: None, from: None }
    }

    pub fn to(mut self, transform: impl Fn(T) -> T + 'static) -> Self {
        self.to = Some(Rc::new(transform));
        self
    }

    pub fn from(mut self, transform: impl Fn(T) -> T + 'static) -> Self {
        self.from = Some(Rc::new(transform));
        self
    }

    pub fn apply_to(&self, value: T) -> T {
        match &self.to {
            Some(transform) => transform(value),
            None => value,
        }
    }

    pub fn apply_from(&self, value: T) -> T {
        match &self.from {
            Some(transform) => transform(value),
            None => value,
        }
    }
}

impl<T> Default for Transform<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Transform<T> {
    fn clone(&self) -> Self {
        Self { to: self.to.clone(), from: self.from.clone() }
    }
}

impl<T> Debug for Transform<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transform")
            .field("to", &self.to.is_some())
            .field("from", &self.from.is_some())
            .finish()
    }
}

/// A column as written in schema options: a bare header, a bare index, or the full form.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum ColumnOptions {
    Index(usize),
    Header(String),
    Full {
        #[serde(default)]
        selector: Option<ColumnSelector>,
        #[serde(default)]
        primary: bool,
        #[serde(skip)]
        transform: Transform<Value>,
    },
}

impl ColumnOptions {
    /// Full form with the given selector.
    pub fn new(selector: impl Into<ColumnSelector>) -> Self {
        ColumnOptions::Full {
            selector: Some(selector.into()),
            primary: false,
            transform: Transform::new(),
        }
    }

    pub fn primary(self) -> Self {
        match self.into_full() {
            ColumnOptions::Full { selector, transform, .. } => {
                ColumnOptions::Full { selector, primary: true, transform }
            }
            other => other,
        }
    }

    pub fn transform(self, transform: Transform<Value>) -> Self {
        match self.into_full() {
            ColumnOptions::Full { selector, primary, .. } => {
                ColumnOptions::Full { selector, primary, transform }
            }
            other => other,
        }
    }

    fn into_full(self) -> Self {
        match self {
            ColumnOptions::Index(index) => ColumnOptions::new(index),
            ColumnOptions::Header(header) => ColumnOptions::new(header),
            full => full,
        }
    }
}

impl From<usize> for ColumnOptions {
    fn from(value: usize) -> Self {
        ColumnOptions::Index(value)
    }
}

impl From<&str> for ColumnOptions {
    fn from(value: &str) -> Self {
        ColumnOptions::Header(value.to_owned())
    }
}

impl From<String> for ColumnOptions {
    fn from(value: String) -> Self {
        ColumnOptions::Header(value)
    }
}

/// A normalized column declaration.
#[derive(Clone, Debug)]
pub struct ColumnDeclaration {
    pub selector: ColumnSelector,
    /// Informational only
    pub primary: bool,
    pub transform: Transform<Value>,
}

impl TryFrom<ColumnOptions> for ColumnDeclaration {
    type Error = SchemaError;

    fn try_from(options: ColumnOptions) -> Result<Self, Self::Error> {
        match options {
            ColumnOptions::Index(index) => Ok(ColumnDeclaration {
                selector: ColumnSelector::Index(index),
                primary: false,
                transform: Transform::new(),
            }),
            ColumnOptions::Header(header) => Ok(ColumnDeclaration {
                selector: ColumnSelector::Header(header),
                primary: false,
                transform: Transform::new(),
            }),
            ColumnOptions::Full { selector, primary, transform } => Ok(ColumnDeclaration {
                selector: selector.ok_or(SchemaError::SelectorRequired)?,
                primary,
                transform,
            }),
        }
    }
}
