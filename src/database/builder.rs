//! Range addressing language.
//!
//! A range is described by up to four tokens (row, column, rows, columns).
//! Each token is a number, an arithmetic expression over the symbolic grid
//! metrics `lr` (last row), `lc` (last column), `mr` (max rows) and
//! `mc` (max columns), or a resolver function. A single string token may
//! also be a comma-joined tuple (`"lr + 1, 1, 1, lc"`) or an A1 address.
use crate::database::expression::evaluate;
use crate::database::range::RangeError;
use crate::database::range::Span;
use crate::error::SheetManagerError;
use crate::spreadsheet::sheet::GridMetrics;
use crate::spreadsheet::Grid;
use regex::Regex;
use serde::Deserialize;
use serde::Deserializer;
use std::fmt::Debug;
use std::fmt::Display;
use std::rc::Rc;
use std::sync::LazyLock;

pub const LAST_ROW: &str = "lr";
pub const LAST_COLUMN: &str = "lc";
pub const MAX_ROWS: &str = "mr";
pub const MAX_COLUMNS: &str = "mc";

static LAST_ROW_PATTERN: LazyLock<Regex> = LazyLock::new(|| word_pattern(LAST_ROW));
static LAST_COLUMN_PATTERN: LazyLock<Regex> = LazyLock::new(|| word_pattern(LAST_COLUMN));
static MAX_ROWS_PATTERN: LazyLock<Regex> = LazyLock::new(|| word_pattern(MAX_ROWS));
static MAX_COLUMNS_PATTERN: LazyLock<Regex> = LazyLock::new(|| word_pattern(MAX_COLUMNS));

fn word_pattern(token: &str) -> Regex {
    Regex::new(&format!(r"\b{}\b", token)).expect("Hardcode regex pattern")
}

/// Resolves a span directly from the grid, bypassing token resolution.
pub type RangeResolver = Rc<dyn Fn(&dyn Grid) -> anyhow::Result<Span>>;

/// One position of a range signature.
#[derive(Clone, Default)]
pub enum RangeToken {
    #[default]
    Missing,
    Number(f64),
    Text(String),
    Resolver(RangeResolver),
}

impl RangeToken {
    /// Truthiness of the token: zero, empty text and missing tokens are falsy.
    fn is_present(&self) -> bool {
        match self {
            RangeToken::Missing => false,
            RangeToken::Number(number) => *number != 0.0 && !number.is_nan(),
            RangeToken::Text(text) => !text.is_empty(),
            RangeToken::Resolver(_) => true,
        }
    }

    /// Checks if the token mentions any symbolic grid metric, even inside a larger word.
    pub fn is_symbolic(&self) -> bool {
        match self {
            RangeToken::Text(text) => [LAST_ROW, LAST_COLUMN, MAX_ROWS, MAX_COLUMNS]
                .iter()
                .any(|token| text.contains(token)),
            _ => false,
        }
    }

    /// Kind of the token as reported in range signatures.
    pub fn kind(&self) -> &'static str {
        match self {
            _ if self.is_symbolic() => "token",
            RangeToken::Missing => "undefined",
            RangeToken::Number(_) => "number",
            RangeToken::Text(_) => "string",
            RangeToken::Resolver(_) => "function",
        }
    }
}

impl Debug for RangeToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RangeToken::Missing => write!(f, "Missing"),
            RangeToken::Number(number) => write!(f, "Number({})", number),
            RangeToken::Text(text) => write!(f, "Text({:?})", text),
            RangeToken::Resolver(_) => write!(f, "Resolver"),
        }
    }
}

impl Display for RangeToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RangeToken::Missing => Ok(()),
            RangeToken::Number(number) => write!(f, "{}", number),
            RangeToken::Text(text) => write!(f, "{}", text),
            RangeToken::Resolver(_) => write!(f, "<function>"),
        }
    }
}

impl From<f64> for RangeToken {
    fn from(value: f64) -> Self {
        RangeToken::Number(value)
    }
}

impl From<usize> for RangeToken {
    fn from(value: usize) -> Self {
        RangeToken::Number(value as f64)
    }
}

impl From<i32> for RangeToken {
    fn from(value: i32) -> Self {
        RangeToken::Number(value as f64)
    }
}

impl From<&str> for RangeToken {
    fn from(value: &str) -> Self {
        RangeToken::Text(value.to_owned())
    }
}

impl From<String> for RangeToken {
    fn from(value: String) -> Self {
        RangeToken::Text(value)
    }
}

/// A full range signature of up to four tokens.
#[derive(Clone, Debug, Default)]
pub struct RangeAddress {
    pub row: RangeToken,
    pub column: RangeToken,
    pub rows: RangeToken,
    pub columns: RangeToken,
}

impl RangeAddress {
    /// Builds an address resolved by a function of the grid.
    pub fn resolver<F>(resolver: F) -> Self
    where
        F: Fn(&dyn Grid) -> anyhow::Result<Span> + 'static,
    {
        RangeAddress {
            row: RangeToken::Resolver(Rc::new(resolver)),
            ..Default::default()
        }
    }

    /// Joined token kinds, e.g. "token,number,undefined,undefined".
    pub fn signature(&self) -> String {
        [&self.row, &self.column, &self.rows, &self.columns]
            .iter()
            .map(|token| token.kind())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Splits a comma-joined tuple into its parts; numeric parts become numbers.
    fn split(value: &str) -> Self {
        let mut parts = value.split(',').map(|part| match parse_number(part) {
            Some(number) if number != 0.0 => RangeToken::Number(number),
            _ => RangeToken::Text(part.to_owned()),
        });
        RangeAddress {
            row: parts.next().unwrap_or_default(),
            column: parts.next().unwrap_or_default(),
            rows: parts.next().unwrap_or_default(),
            columns: parts.next().unwrap_or_default(),
        }
    }
}

impl Display for RangeAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{},{}", self.row, self.column, self.rows, self.columns)
    }
}

impl From<&str> for RangeAddress {
    fn from(value: &str) -> Self {
        RangeAddress { row: value.into(), ..Default::default() }
    }
}

impl From<String> for RangeAddress {
    fn from(value: String) -> Self {
        RangeAddress { row: value.into(), ..Default::default() }
    }
}

impl From<Span> for RangeAddress {
    fn from(span: Span) -> Self {
        (span.row, span.column, span.rows, span.columns).into()
    }
}

impl<A: Into<RangeToken>, B: Into<RangeToken>> From<(A, B)> for RangeAddress {
    fn from((row, column): (A, B)) -> Self {
        RangeAddress { row: row.into(), column: column.into(), ..Default::default() }
    }
}

impl<A, B, C> From<(A, B, C)> for RangeAddress
where
    A: Into<RangeToken>,
    B: Into<RangeToken>,
    C: Into<RangeToken>,
{
    fn from((row, column, rows): (A, B, C)) -> Self {
        RangeAddress {
            row: row.into(),
            column: column.into(),
            rows: rows.into(),
            ..Default::default()
        }
    }
}

impl<A, B, C, D> From<(A, B, C, D)> for RangeAddress
where
    A: Into<RangeToken>,
    B: Into<RangeToken>,
    C: Into<RangeToken>,
    D: Into<RangeToken>,
{
    fn from((row, column, rows, columns): (A, B, C, D)) -> Self {
        RangeAddress {
            row: row.into(),
            column: column.into(),
            rows: rows.into(),
            columns: columns.into(),
        }
    }
}

impl<'de> Deserialize<'de> for RangeAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(RangeAddress::from)
    }
}

/// Parses a numeric string the lenient way: surrounding blanks are ignored and
/// a blank string is zero.
fn parse_number(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return Some(0.0);
    }
    let numeric = value
        .chars()
        .all(|char| char.is_ascii_digit() || matches!(char, '.' | '-' | '+' | 'e' | 'E'));
    if numeric {
        value.parse::<f64>().ok()
    } else {
        None
    }
}

/// Resolves range addresses against the live metrics of one grid.
pub(crate) struct RangeBuilder<'a> {
    grid: &'a dyn Grid,
    metrics: &'a GridMetrics,
}

impl<'a> RangeBuilder<'a> {
    pub(crate) fn new(grid: &'a dyn Grid, metrics: &'a GridMetrics) -> Self {
        RangeBuilder { grid, metrics }
    }

    pub(crate) fn resolve(&self, address: &RangeAddress) -> Result<Span, SheetManagerError> {
        if let RangeToken::Text(text) = &address.row {
            if text.contains(',') {
                return self.resolve(&RangeAddress::split(text));
            }
        }

        let signature = address.signature();
        match &address.row {
            RangeToken::Resolver(resolver) => return Ok(resolver(self.grid)?.validated()?),
            row if row.is_present() && address.column.is_present() => (),
            RangeToken::Text(text) if parse_number(text).is_none() => {
                let max_rows = self.metrics.max_rows(self.grid);
                let max_columns = self.metrics.max_columns(self.grid);
                return Ok(Span::parse_a1(text, max_rows, max_columns)?);
            }
            _ => Err(RangeError::BadRangeSignature(signature.to_owned()))?,
        }

        let default = RangeToken::Number(1.0);
        let rows = Some(&address.rows).filter(|token| token.is_present()).unwrap_or(&default);
        let columns = Some(&address.columns).filter(|token| token.is_present()).unwrap_or(&default);
        let coordinates = [
            self.resolve_token(&address.row)?,
            self.resolve_token(&address.column)?,
            self.resolve_token(rows)?,
            self.resolve_token(columns)?,
        ];
        if coordinates.iter().any(|coordinate| *coordinate == 0.0) {
            Err(RangeError::BadRangeSignature(signature))?
        }
        let out_of_bounds =
            |coordinate: &f64| *coordinate < 0.0 || *coordinate >= usize::MAX as f64;
        if coordinates.iter().any(out_of_bounds) {
            let arguments = coordinates.map(|coordinate| coordinate.to_string()).join(",");
            Err(RangeError::IncorrectRange(arguments))?
        }
        let [row, column, rows, columns] = coordinates.map(|coordinate| coordinate as usize);
        Ok(Span::new(row, column, rows, columns).validated()?)
    }

    /// Resolves one token to a number, truncated toward zero.
    fn resolve_token(&self, token: &RangeToken) -> Result<f64, SheetManagerError> {
        let text = match token {
            RangeToken::Number(number) => return Ok(number.trunc()),
            RangeToken::Text(text) => text.to_owned(),
            other => Err(RangeError::TokenResultNotNumber(other.to_string()))?,
        };

        let mut expression = text.clone();
        if expression.contains(LAST_ROW) {
            let value = self.metrics.last_row(self.grid).to_string();
            expression = LAST_ROW_PATTERN.replace_all(&expression, value.as_str()).into_owned();
        }
        if expression.contains(LAST_COLUMN) {
            let value = self.metrics.last_column(self.grid).to_string();
            expression = LAST_COLUMN_PATTERN.replace_all(&expression, value.as_str()).into_owned();
        }
        if expression.contains(MAX_ROWS) {
            let value = self.metrics.max_rows(self.grid).to_string();
            expression = MAX_ROWS_PATTERN.replace_all(&expression, value.as_str()).into_owned();
        }
        if expression.contains(MAX_COLUMNS) {
            let value = self.metrics.max_columns(self.grid).to_string();
            expression = MAX_COLUMNS_PATTERN.replace_all(&expression, value.as_str()).into_owned();
        }

        let result = evaluate(&expression)
            .ok()
            .filter(|result| result.is_finite())
            .ok_or_else(|| RangeError::TokenResultNotNumber(expression.to_owned()))?;
        tracing::trace!(token = %text, %expression, result, "Resolved range token");
        Ok(result.trunc())
    }
}
