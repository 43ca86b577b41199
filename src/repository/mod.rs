//! Public CRUD and query facade over one entity's data range.
pub mod criteria;

use crate::database::data_service::DataService;
use crate::database::map_builder::ColumnMap;
use crate::database::range_service::SortOptions;
use crate::error::SheetManagerError;
use crate::mapper::Abort;
use crate::mapper::Entity;
use crate::repository::criteria::Filter;
use crate::repository::criteria::FindBuilder;
use crate::spreadsheet::Grid;
use serde::Serialize;

/// Outcome of a delete operation. `indexes` are 0-based positions in the scanned data range.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DeleteResult {
    pub deleted: bool,
    pub counter: usize,
    pub indexes: Vec<usize>,
}

impl DeleteResult {
    fn new(indexes: Vec<usize>) -> Self {
        Self { deleted: !indexes.is_empty(), counter: indexes.len(), indexes }
    }
}

pub struct Repository<G: Grid> {
    data_service: DataService<G>,
    map: ColumnMap,
}

impl<G: Grid> Repository<G> {
    pub fn new(data_service: DataService<G>, map: ColumnMap) -> Self {
        Self { data_service, map }
    }

    pub fn map(&self) -> &ColumnMap {
        &self.map
    }

    /// All matching entities, in row order.
    pub fn find(&self, filter: &Filter) -> Result<Vec<Entity>, SheetManagerError> {
        let finder = FindBuilder::new(filter);
        let mut result = Vec::new();
        self.data_service.get(Some(&mut |entity: &Entity, _: usize, _: &mut Abort| {
            if finder.compare(entity) {
                result.push(entity.clone());
            }
        }))?;
        tracing::debug!(matched = result.len(), "find");
        Ok(result)
    }

    /// The first matching entity. The scan stops at the match.
    pub fn find_one(&self, filter: &Filter) -> Result<Option<Entity>, SheetManagerError> {
        let finder = FindBuilder::new(filter);
        let mut result = None;
        self.data_service.get(Some(&mut |entity: &Entity, _: usize, abort: &mut Abort| {
            if finder.compare(entity) {
                result = Some(entity.clone());
                abort.abort();
            }
        }))?;
        tracing::debug!(found = result.is_some(), "find_one");
        Ok(result)
    }

    /// Clears every matching row in one batch.
    pub fn find_and_delete(&self, filter: &Filter) -> Result<DeleteResult, SheetManagerError> {
        let indexes = self.matching_indexes(filter, false)?;
        self.data_service.clear(&indexes)?;
        tracing::debug!(?indexes, "find_and_delete");
        Ok(DeleteResult::new(indexes))
    }

    /// Clears the first matching row.
    pub fn delete_one(&self, filter: &Filter) -> Result<DeleteResult, SheetManagerError> {
        let indexes = self.matching_indexes(filter, true)?;
        self.data_service.clear(&indexes)?;
        tracing::debug!(?indexes, "delete_one");
        Ok(DeleteResult::new(indexes))
    }

    fn matching_indexes(
        &self,
        filter: &Filter,
        first_only: bool,
    ) -> Result<Vec<usize>, SheetManagerError> {
        let finder = FindBuilder::new(filter);
        let mut indexes = Vec::new();
        self.data_service.get(Some(&mut |entity: &Entity, index: usize, abort: &mut Abort| {
            if finder.compare(entity) {
                indexes.push(index);
                if first_only {
                    abort.abort();
                }
            }
        }))?;
        Ok(indexes)
    }

    pub fn insert(&self, entity: Entity) -> Result<(), SheetManagerError> {
        self.insert_many(&[entity])
    }

    /// Appends entities below the last populated row. An empty list writes nothing.
    pub fn insert_many(&self, entities: &[Entity]) -> Result<(), SheetManagerError> {
        if entities.is_empty() {
            return Ok(());
        }
        tracing::debug!(count = entities.len(), "insert_many");
        self.data_service.append(entities)
    }

    /// Sorts the data range by `field`, or by its first column when the field
    /// is omitted or unmapped. Descending unless `ascending` is given.
    pub fn sort(
        &self,
        field: Option<&str>,
        ascending: Option<bool>,
    ) -> Result<(), SheetManagerError> {
        let column = field
            .and_then(|field| self.map.get(field))
            .map_or(1, |index| index + 1);
        self.data_service.sort(SortOptions {
            column: Some(column),
            ascending: Some(ascending.unwrap_or(false)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::range::Span;
    use crate::database::range_service::RangeService;
    use crate::mapper::document::DocumentMapper;
    use crate::mapper::DataMapper;
    use crate::spreadsheet::cell::Value;
    use crate::spreadsheet::memory::MemoryGrid;
    use crate::spreadsheet::sheet::Sheet;
    use crate::spreadsheet::SharedGrid;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn repository() -> (SharedGrid<MemoryGrid>, Repository<MemoryGrid>) {
        let grid = Rc::new(RefCell::new(MemoryGrid::from_rows(
            "people",
            vec![
                vec![Value::from("Name"), Value::from("Age")],
                vec![Value::from("Ann"), Value::from(31)],
                vec![Value::from("Bob"), Value::from(17)],
                vec![Value::from("Cid"), Value::from(45)],
            ],
        )));
        let map: ColumnMap = [("name", 0), ("age", 1)].into_iter().collect();
        let mapper = DataMapper::new(DocumentMapper::new(map.clone(), Vec::new()), Vec::new());
        let range_service = RangeService::new(Sheet::new(grid.clone()), Span::new(2, 1, 3, 2));
        (grid, Repository::new(DataService::new(range_service, mapper), map))
    }

    fn names(entities: &[Entity]) -> Vec<String> {
        entities.iter().map(|entity| entity["name"].to_string()).collect()
    }

    #[test]
    fn find_filters_in_row_order() {
        let (_, repository) = repository();
        let adults = repository.find(&Filter::new().gte("age", 18)).unwrap();
        assert_eq!(names(&adults), ["Ann", "Cid"]);
    }

    #[test]
    fn find_one_returns_first_match() {
        let (_, repository) = repository();
        let found = repository.find_one(&Filter::new().gte("age", 18)).unwrap().unwrap();
        assert_eq!(found["name"], Value::from("Ann"));
        assert!(repository.find_one(&Filter::new().eq("name", "Zed")).unwrap().is_none());
    }

    #[test]
    fn find_and_delete_clears_all_matches() {
        let (grid, repository) = repository();
        let result = repository.find_and_delete(&Filter::new().gte("age", 18)).unwrap();

        assert_eq!(result, DeleteResult { deleted: true, counter: 2, indexes: vec![0, 2] });
        assert!(grid.borrow().cell(2, 1).unwrap().is_empty());
        assert_eq!(grid.borrow().cell(3, 1), Some(&Value::from("Bob")));
        assert!(grid.borrow().cell(4, 2).unwrap().is_empty());
    }

    #[test]
    fn delete_one_clears_first_match() {
        let (grid, repository) = repository();
        let result = repository.delete_one(&Filter::new().gte("age", 18)).unwrap();

        assert_eq!(result.indexes, [0]);
        assert_eq!(result.counter, 1);
        assert!(grid.borrow().cell(2, 1).unwrap().is_empty());
        assert_eq!(grid.borrow().cell(4, 1), Some(&Value::from("Cid")));
    }

    #[test]
    fn delete_without_match() {
        let (grid, repository) = repository();
        let before = grid.borrow().rows().to_vec();
        let result = repository.find_and_delete(&Filter::new().eq("name", "Zed")).unwrap();

        assert_eq!(result, DeleteResult::default());
        assert_eq!(grid.borrow().rows(), before.as_slice());
    }

    #[test]
    fn insert_appends() {
        let (grid, repository) = repository();
        let entity = Entity::from([
            ("name".to_owned(), Value::from("Dee")),
            ("age".to_owned(), Value::from(22)),
        ]);
        repository.insert(entity).unwrap();
        repository.insert_many(&[]).unwrap();

        assert_eq!(grid.borrow().cell(5, 1), Some(&Value::from("Dee")));
        assert_eq!(grid.borrow().max_rows(), 5);
    }

    #[test]
    fn inserted_rows_are_found_immediately() {
        let (_, repository) = repository();
        let entity = Entity::from([
            ("name".to_owned(), Value::from("Dee")),
            ("age".to_owned(), Value::from(22)),
        ]);
        repository.insert(entity).unwrap();

        let found = repository.find_one(&Filter::new().eq("name", "Dee")).unwrap().unwrap();
        assert_eq!(found["age"], Value::from(22));
        assert_eq!(names(&repository.find(&Filter::new()).unwrap()), ["Ann", "Bob", "Cid", "Dee"]);
    }

    #[test]
    fn sort_by_mapped_field() {
        let (_, repository) = repository();
        repository.sort(Some("age"), Some(true)).unwrap();
        assert_eq!(names(&repository.find(&Filter::new()).unwrap()), ["Bob", "Ann", "Cid"]);

        repository.sort(Some("age"), None).unwrap();
        assert_eq!(names(&repository.find(&Filter::new()).unwrap()), ["Cid", "Ann", "Bob"]);
    }

    #[test]
    fn sort_falls_back_to_first_column() {
        let (_, repository) = repository();
        repository.sort(Some("unknown"), Some(false)).unwrap();
        assert_eq!(names(&repository.find(&Filter::new()).unwrap()), ["Cid", "Bob", "Ann"]);
    }

    #[test]
    fn delete_result_serializes() {
        let json = serde_json::to_string(&DeleteResult::new(vec![1])).unwrap();
        assert_eq!(json, r#"{"deleted":true,"counter":1,"indexes":[1]}"#);
    }
}
