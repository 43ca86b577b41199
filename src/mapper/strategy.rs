//! Transform strategies applied while converting between rows and entities.
use crate::database::schema::EntitySchema;
use crate::mapper::Abort;
use crate::mapper::Entity;
use crate::spreadsheet::cell::Value;
use std::rc::Rc;

/// Field-level transform. Identity by default.
pub trait DocumentStrategy {
    /// Row cell value to entity field value.
    fn to_entity(&self, value: Value, _field: &str) -> Value {
        value
    }

    /// Entity field value to row cell value.
    fn to_row(&self, value: Value, _field: &str) -> Value {
        value
    }
}

/// Entity-level transform. Identity by default.
pub trait DataStrategy {
    /// Applied to each entity read during a scan; may abort the scan.
    fn to_entities(&self, entity: Entity, _index: usize, _abort: &mut Abort) -> Entity {
        entity
    }

    /// Applied to each entity before it is written.
    fn to_data(&self, entity: Entity, _index: usize) -> Entity {
        entity
    }
}

/// Applies the transforms declared in an entity schema.
pub struct TransformStrategy {
    schema: Rc<EntitySchema>,
}

impl TransformStrategy {
    pub fn new(schema: Rc<EntitySchema>) -> Self {
        Self { schema }
    }
}

impl DocumentStrategy for TransformStrategy {
    fn to_entity(&self, value: Value, field: &str) -> Value {
        match self.schema.column(field) {
            Some(column) => column.transform.apply_from(value),
            None => value,
        }
    }

    fn to_row(&self, value: Value, field: &str) -> Value {
        match self.schema.column(field) {
            Some(column) => column.transform.apply_to(value),
            None => value,
        }
    }
}

impl DataStrategy for TransformStrategy {
    fn to_entities(&self, entity: Entity, _index: usize, _abort: &mut Abort) -> Entity {
        self.schema.transform.apply_from(entity)
    }

    fn to_data(&self, entity: Entity, _index: usize) -> Entity {
        self.schema.transform.apply_to(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::column::ColumnOptions;
    use crate::database::column::Transform;
    use crate::database::schema::EntitySchemaOptions;

    fn strategy() -> TransformStrategy {
        let options = EntitySchemaOptions::new("orders")
            .column(
                "status",
                ColumnOptions::new("Status").transform(
                    Transform::new()
                        .from(|value: Value| Value::from(value.as_number() == Some(1.0)))
                        .to(|value: Value| Value::from(i32::from(value.as_bool() == Some(true)))),
                ),
            )
            .column("sum", "Sum")
            .transform(Transform::new().from(|mut entity: Entity| {
                entity.insert("loaded".to_owned(), Value::from(true));
                entity
            }));
        TransformStrategy::new(Rc::new(EntitySchema::try_from(options).unwrap()))
    }

    #[test]
    fn field_transforms() {
        let strategy = strategy();

        assert_eq!(strategy.to_entity(Value::from(1), "status"), Value::from(true));
        assert_eq!(strategy.to_row(Value::from(false), "status"), Value::from(0));
        assert_eq!(strategy.to_entity(Value::from(7), "sum"), Value::from(7));
        assert_eq!(strategy.to_entity(Value::from(7), "unknown"), Value::from(7));
    }

    #[test]
    fn entity_transforms() {
        let strategy = strategy();
        let mut abort = Abort::default();

        let entity = strategy.to_entities(Entity::new(), 0, &mut abort);
        assert_eq!(entity.get("loaded"), Some(&Value::from(true)));
        assert!(!abort.is_aborted());

        let entity = strategy.to_data(Entity::new(), 0);
        assert!(entity.is_empty());
    }
}
