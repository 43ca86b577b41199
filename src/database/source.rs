use crate::database::builder::MAX_COLUMNS;
use crate::database::builder::MAX_ROWS;
use crate::database::data_service::DataService;
use crate::database::map_builder::MapBuilder;
use crate::database::range::Span;
use crate::database::range_service::RangeService;
use crate::database::schema::EntitySchema;
use crate::database::schema::EntitySchemaOptions;
use crate::database::schema::RangeOptions;
use crate::database::schema::SchemaError;
use crate::error::ResultMessage;
use crate::error::SheetManagerError;
use crate::mapper::document::DocumentMapper;
use crate::mapper::strategy::DataStrategy;
use crate::mapper::strategy::DocumentStrategy;
use crate::mapper::strategy::TransformStrategy;
use crate::mapper::DataMapper;
use crate::repository::Repository;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::table::Table;
use crate::spreadsheet::Grid;
use crate::spreadsheet::Selector;
use crate::spreadsheet::Workbook;
use serde::Deserialize;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

/// Errors related to entity lookup in a data source.
#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error("Entity {0} not found")]
    EntityNotFound(Selector),
}

/// Options of a data source: an optional workbook id to verify and the entity schemas.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DataSourceOptions {
    pub id: Option<String>,
    pub entities: Vec<EntitySchemaOptions>,
}

impl DataSourceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_owned());
        self
    }

    pub fn entity(mut self, entity: EntitySchemaOptions) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(json).map_err(|e| SchemaError::BadSchemaOptions(e.to_string()))
    }
}

/// Header and data spans of an entity, resolved against its sheet.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EntityRanges {
    pub headers: Option<Span>,
    pub data: Span,
}

/// Entry point: holds the entity schemas and hands out one repository per entity.
pub struct DataSource<W: Workbook> {
    table: Table<W>,
    entities: HashMap<Selector, Rc<EntitySchema>>,
    repositories: HashMap<Selector, Rc<Repository<W::Grid>>>,
}

impl<W: Workbook> DataSource<W> {
    /// Validates every schema, then opens the workbook.
    pub fn new(workbook: W, options: DataSourceOptions) -> Result<Self, SheetManagerError> {
        let mut entities = HashMap::new();
        for entity in options.entities {
            let schema = EntitySchema::try_from(entity)?;
            if entities.contains_key(&schema.selector) {
                Err(SchemaError::OptionsSchemaDuplicate(schema.selector.clone()))?
            }
            entities.insert(schema.selector.clone(), Rc::new(schema));
        }
        let table = Table::open(workbook, options.id.as_deref())?;
        tracing::debug!(table = table.id(), entities = entities.len(), "Opened data source");
        Ok(Self { table, entities, repositories: HashMap::new() })
    }

    /// Returns the repository of an entity, building it on first access.
    /// Later calls with the same selector return the same instance.
    pub fn get_repository(
        &mut self,
        selector: impl Into<Selector>,
    ) -> Result<Rc<Repository<W::Grid>>, SheetManagerError> {
        let selector = selector.into();
        if let Some(repository) = self.repositories.get(&selector) {
            return Ok(repository.clone());
        }
        let schema = self
            .entities
            .get(&selector)
            .cloned()
            .ok_or_else(|| DataSourceError::EntityNotFound(selector.clone()))?;
        let repository = self
            .create_repository(schema)
            .with_prefix(&format!("Entity {}", selector))?;
        let repository = Rc::new(repository);
        self.repositories.insert(selector, repository.clone());
        Ok(repository)
    }

    fn create_repository(
        &self,
        schema: Rc<EntitySchema>,
    ) -> Result<Repository<W::Grid>, SheetManagerError> {
        let sheet = self.table.sheet(&schema.selector)?;
        let ranges = create_ranges(&sheet, &schema.ranges)?;
        let headers = match &ranges.headers {
            Some(span) => header_names(&sheet, span)?,
            None => Vec::new(),
        };
        let map = MapBuilder::new(&schema.columns, headers).build()?;
        tracing::debug!(
            sheet = %sheet.name(),
            headers = ?ranges.headers,
            data = %ranges.data,
            fields = map.len(),
            "Created repository"
        );

        let strategy = Rc::new(TransformStrategy::new(schema));
        let document_strategies: Vec<Rc<dyn DocumentStrategy>> = vec![strategy.clone()];
        let data_strategies: Vec<Rc<dyn DataStrategy>> = vec![strategy];
        let document_mapper = DocumentMapper::new(map.clone(), document_strategies);
        let data_mapper = DataMapper::new(document_mapper, data_strategies);
        let range_service = RangeService::new(sheet, ranges.data);
        Ok(Repository::new(DataService::new(range_service, data_mapper), map))
    }
}

/// Resolves the header span when declared, and the data span, which defaults
/// to everything below the headers across their width, or the whole sheet.
pub fn create_ranges<G: Grid>(
    sheet: &Sheet<G>,
    ranges: &RangeOptions,
) -> Result<EntityRanges, SheetManagerError> {
    let headers = ranges.headers.as_ref().map(|address| sheet.range(address.clone())).transpose()?;
    let data = match &ranges.data {
        Some(address) => sheet.range(address.clone())?,
        None => {
            let (row, column) = headers.map_or((1, 1), |span| (span.row + 1, span.column));
            let rows = format!("{} - {}", MAX_ROWS, row - 1);
            match headers {
                Some(span) => sheet.range((row, column, rows, span.columns))?,
                None => sheet.range((row, column, rows, MAX_COLUMNS))?,
            }
        }
    };
    Ok(EntityRanges { headers, data })
}

/// The first row of the header span, as text.
fn header_names<G: Grid>(sheet: &Sheet<G>, span: &Span) -> Result<Vec<String>, SheetManagerError> {
    let values = sheet.values(span)?;
    Ok(values
        .into_iter()
        .next()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .unwrap_or_default())
}
