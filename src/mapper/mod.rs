//! Row to entity conversion.
//!
//! A [`DocumentMapper`] converts one row using the column map and field-level
//! strategies; a [`DataMapper`] converts whole row lists, applying entity-level
//! strategies and an optional per-row callback that can stop the scan.
pub mod document;
pub mod strategy;

use crate::mapper::document::DocumentMapper;
use crate::mapper::strategy::DataStrategy;
use crate::spreadsheet::cell::Value;
use std::collections::BTreeMap;
use std::rc::Rc;

/// An entity: field name to value.
pub type Entity = BTreeMap<String, Value>;

/// Per-row callback invoked during a scan with the entity and its 0-based index.
pub type Operation<'a> = &'a mut dyn FnMut(&Entity, usize, &mut Abort);

/// Stop flag handed to strategies and callbacks during a scan.
#[derive(Debug, Default)]
pub struct Abort {
    aborted: bool,
}

impl Abort {
    /// Stops the scan. The row being processed is left out of the result.
    pub fn abort(&mut self) {
        self.aborted = true;
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}

pub struct DataMapper {
    document: DocumentMapper,
    strategies: Vec<Rc<dyn DataStrategy>>,
}

impl DataMapper {
    pub fn new(document: DocumentMapper, strategies: Vec<Rc<dyn DataStrategy>>) -> Self {
        Self { document, strategies }
    }

    /// Converts rows to entities in order until a strategy or the callback aborts.
    pub fn to_entities(
        &self,
        rows: &[Vec<Value>],
        mut operation: Option<Operation>,
    ) -> Vec<Entity> {
        let mut entities = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let mut abort = Abort::default();
            let mut entity = self.document.to_entity(row);
            for strategy in &self.strategies {
                entity = strategy.to_entities(entity, index, &mut abort);
            }
            if let Some(operation) = operation.as_mut() {
                operation(&entity, index, &mut abort);
            }
            if abort.is_aborted() {
                tracing::trace!(index, "Scan aborted");
                break;
            }
            entities.push(entity);
        }
        entities
    }

    /// Converts entities to rows. Entity-level strategies see a copy of each entity.
    pub fn to_data(&self, entities: &[Entity]) -> Vec<Vec<Value>> {
        entities
            .iter()
            .enumerate()
            .map(|(index, entity)| {
                let entity = self
                    .strategies
                    .iter()
                    .fold(entity.clone(), |entity, strategy| strategy.to_data(entity, index));
                self.document.to_row(&entity)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::map_builder::ColumnMap;

    struct StopAt(usize);

    impl DataStrategy for StopAt {
        fn to_entities(&self, entity: Entity, index: usize, abort: &mut Abort) -> Entity {
            if index == self.0 {
                abort.abort();
            }
            entity
        }
    }

    struct Tag;

    impl DataStrategy for Tag {
        fn to_data(&self, mut entity: Entity, index: usize) -> Entity {
            entity.insert("index".to_owned(), Value::from(index as i64));
            entity
        }
    }

    fn mapper(strategies: Vec<Rc<dyn DataStrategy>>) -> DataMapper {
        let map: ColumnMap = [("name", 0), ("index", 1)].into_iter().collect();
        DataMapper::new(DocumentMapper::new(map, Vec::new()), strategies)
    }

    fn rows() -> Vec<Vec<Value>> {
        ["a", "b", "c"].iter().map(|name| vec![Value::from(*name)]).collect()
    }

    #[test]
    fn converts_every_row() {
        let entities = mapper(Vec::new()).to_entities(&rows(), None);
        assert_eq!(entities.len(), 3);
        assert_eq!(entities[2]["name"], Value::from("c"));
        assert!(entities[2]["index"].is_empty());
    }

    #[test]
    fn callback_abort_stops_scan() {
        let mut seen = Vec::new();
        let mut operation = |entity: &Entity, index: usize, abort: &mut Abort| {
            seen.push(index);
            if entity["name"] == Value::from("b") {
                abort.abort();
            }
        };
        let entities = mapper(Vec::new()).to_entities(&rows(), Some(&mut operation));

        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0]["name"], Value::from("a"));
        assert_eq!(seen, [0, 1]);
    }

    #[test]
    fn strategy_abort_stops_scan() {
        let entities = mapper(vec![Rc::new(StopAt(0))]).to_entities(&rows(), None);
        assert!(entities.is_empty());
    }

    #[test]
    fn to_data_applies_strategies_on_copies() {
        let mapper = mapper(vec![Rc::new(Tag)]);
        let entities = mapper.to_entities(&rows(), None);
        let data = mapper.to_data(&entities);

        assert_eq!(data[1], vec![Value::from("b"), Value::from(1)]);
        assert!(entities[1]["index"].is_empty());
    }
}
