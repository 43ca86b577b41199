use crate::database::builder::RangeAddress;
use crate::database::column::ColumnDeclaration;
use crate::database::column::ColumnOptions;
use crate::database::column::Transform;
use crate::mapper::Entity;
use crate::spreadsheet::Selector;
use serde::de::MapAccess;
use serde::de::Visitor;
use serde::Deserialize;
use serde::Deserializer;
use std::fmt;
use thiserror::Error;

/// Errors related to schema configuration.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Selector is required")]
    SelectorRequired,

    #[error("Bad schema options: {0} is required!")]
    RequiredSchemaOption(String),

    #[error("Such a scheme {0} already exists")]
    OptionsSchemaDuplicate(Selector),

    #[error("Bad schema options: {0}")]
    BadSchemaOptions(String),
}

/// Header and data range declarations of an entity.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RangeOptions {
    pub headers: Option<RangeAddress>,
    pub data: Option<RangeAddress>,
}

/// Declarative configuration of one entity kind.
///
/// Everything except transforms can be loaded from JSON; transforms are
/// attached with [`EntitySchemaOptions::transform`] and
/// [`ColumnOptions::transform`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EntitySchemaOptions {
    #[serde(default)]
    pub selector: Option<Selector>,
    #[serde(default)]
    pub ranges: RangeOptions,
    #[serde(default, deserialize_with = "ordered_columns")]
    pub columns: Vec<(String, ColumnOptions)>,
    #[serde(skip)]
    pub transform: Transform<Entity>,
}

impl EntitySchemaOptions {
    pub fn new(selector: impl Into<Selector>) -> Self {
        Self { selector: Some(selector.into()), ..Default::default() }
    }

    /// Parses the declarative part of a schema from JSON.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(json).map_err(|e| SchemaError::BadSchemaOptions(e.to_string()))
    }

    pub fn column(mut self, field: &str, column: impl Into<ColumnOptions>) -> Self {
        self.columns.push((field.to_owned(), column.into()));
        self
    }

    pub fn headers(mut self, range: impl Into<RangeAddress>) -> Self {
        self.ranges.headers = Some(range.into());
        self
    }

    pub fn data(mut self, range: impl Into<RangeAddress>) -> Self {
        self.ranges.data = Some(range.into());
        self
    }

    pub fn transform(mut self, transform: Transform<Entity>) -> Self {
        self.transform = transform;
        self
    }
}

/// Deserializes a JSON object of columns, keeping the document order of its keys.
fn ordered_columns<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<(String, ColumnOptions)>, D::Error> {
    struct ColumnsVisitor;

    impl<'de> Visitor<'de> for ColumnsVisitor {
        type Value = Vec<(String, ColumnOptions)>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an object of column declarations")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut columns = Vec::new();
            while let Some((field, column)) = map.next_entry::<String, ColumnOptions>()? {
                columns.push((field, column));
            }
            Ok(columns)
        }
    }

    deserializer.deserialize_map(ColumnsVisitor)
}

/// Normalized, immutable entity configuration.
#[derive(Clone, Debug)]
pub struct EntitySchema {
    pub selector: Selector,
    pub ranges: RangeOptions,
    pub columns: Vec<(String, ColumnDeclaration)>,
    pub transform: Transform<Entity>,
}

impl EntitySchema {
    /// Returns the declaration of `field`.
    pub fn column(&self, field: &str) -> Option<&ColumnDeclaration> {
        self.columns
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, column)| column)
    }
}

impl TryFrom<EntitySchemaOptions> for EntitySchema {
    type Error = SchemaError;

    fn try_from(options: EntitySchemaOptions) -> Result<Self, Self::Error> {
        let selector = options
            .selector
            .ok_or_else(|| SchemaError::RequiredSchemaOption("EntitySchema.selector".to_owned()))?;
        let columns = options
            .columns
            .into_iter()
            .map(|(field, column)| {
                ColumnDeclaration::try_from(column).map(|column| (field, column))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(EntitySchema {
            selector,
            ranges: options.ranges,
            columns,
            transform: options.transform,
        })
    }
}
