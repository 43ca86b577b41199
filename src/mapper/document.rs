use crate::database::map_builder::ColumnMap;
use crate::mapper::strategy::DocumentStrategy;
use crate::mapper::Entity;
use crate::spreadsheet::cell::Value;
use std::rc::Rc;

/// Converts a single row into an entity and back.
pub struct DocumentMapper {
    map: ColumnMap,
    strategies: Vec<Rc<dyn DocumentStrategy>>,
}

impl DocumentMapper {
    pub fn new(map: ColumnMap, strategies: Vec<Rc<dyn DocumentStrategy>>) -> Self {
        Self { map, strategies }
    }

    pub fn map(&self) -> &ColumnMap {
        &self.map
    }

    /// Reads every mapped field from `row`, folding the strategies over each value
    /// in declaration order. Cells past the end of the row read as blank.
    pub fn to_entity(&self, row: &[Value]) -> Entity {
        self.map
            .iter()
            .map(|(field, index)| {
                let value = row.get(index).cloned().unwrap_or_default();
                let value = self
                    .strategies
                    .iter()
                    .fold(value, |value, strategy| strategy.to_entity(value, field));
                (field.to_owned(), value)
            })
            .collect()
    }

    /// Builds a row wide enough for every mapped column. Unmapped cells are
    /// blank and unmapped entity fields are dropped.
    pub fn to_row(&self, entity: &Entity) -> Vec<Value> {
        let width = self.map.max_index().map_or(0, |index| index + 1);
        let mut row = vec![Value::Empty; width];
        for (field, value) in entity {
            if let Some(index) = self.map.get(field) {
                row[index] = self
                    .strategies
                    .iter()
                    .fold(value.clone(), |value, strategy| strategy.to_row(value, field));
            }
        }
        row
    }
}
