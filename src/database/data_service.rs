use crate::database::range_service::RangeService;
use crate::database::range_service::SortOptions;
use crate::error::SheetManagerError;
use crate::mapper::DataMapper;
use crate::mapper::Entity;
use crate::mapper::Operation;
use crate::spreadsheet::Grid;

/// Entity-level access to one data range. Reads go through the mapper and
/// writes through the range service.
pub struct DataService<G: Grid> {
    range_service: RangeService<G>,
    data_mapper: DataMapper,
}

impl<G: Grid> DataService<G> {
    pub fn new(range_service: RangeService<G>, data_mapper: DataMapper) -> Self {
        Self { range_service, data_mapper }
    }

    /// Reads every row of the current span as an entity, feeding each one to `operation`.
    pub fn get(&self, operation: Option<Operation>) -> Result<Vec<Entity>, SheetManagerError> {
        let values = self.range_service.get_values()?;
        Ok(self.data_mapper.to_entities(&values, operation))
    }

    /// Appends entities after the last populated row. An empty list writes nothing.
    pub fn append(&self, entities: &[Entity]) -> Result<(), SheetManagerError> {
        if entities.is_empty() {
            return Ok(());
        }
        let values = self.data_mapper.to_data(entities);
        self.range_service.append_values(&values)
    }

    pub fn sort(&self, options: impl Into<SortOptions>) -> Result<(), SheetManagerError> {
        self.range_service.sort(options)
    }

    /// Clears the rows at the given 0-based entity indexes.
    pub fn clear(&self, indexes: &[usize]) -> Result<(), SheetManagerError> {
        if indexes.is_empty() {
            return Ok(());
        }
        let rows = indexes.iter().map(|index| index + 1).collect::<Vec<_>>();
        self.range_service.clear_rows(&rows)
    }
}
