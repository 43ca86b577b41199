use crate::mapper::Entity;
use crate::spreadsheet::cell::Value;
use std::fmt::Display;
use thiserror::Error;

/// Errors related to parsing filter objects.
#[derive(Error, Debug)]
pub enum CriteriaError {
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
}

const AND: &str = "$and";
const OR: &str = "$or";

/// Comparison operators of an operator object.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operator {
    Gte,
    Lte,
    Gt,
    Lt,
    Ne,
    In,
    Nin,
}

impl Operator {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "$gte" => Some(Operator::Gte),
            "$lte" => Some(Operator::Lte),
            "$gt" => Some(Operator::Gt),
            "$lt" => Some(Operator::Lt),
            "$ne" => Some(Operator::Ne),
            "$in" => Some(Operator::In),
            "$nin" => Some(Operator::Nin),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Operator::Gte => "$gte",
            Operator::Lte => "$lte",
            Operator::Gt => "$gt",
            Operator::Lt => "$lt",
            Operator::Ne => "$ne",
            Operator::In => "$in",
            Operator::Nin => "$nin",
        }
    }

    /// Applies the operator to a field value; `None` is an unmapped field.
    fn test(&self, value: Option<&Value>, operand: &Operand) -> bool {
        match (self, operand) {
            (Operator::Ne, Operand::Value(operand)) => value != Some(operand),
            (Operator::Ne, Operand::List(_) | Operand::Null) => true,
            (_, Operand::Null) => false,
            (Operator::In, Operand::List(items)) => {
                value.is_some_and(|value| items.contains(value))
            }
            (Operator::Nin, Operand::List(items)) => {
                !value.is_some_and(|value| items.contains(value))
            }
            (Operator::In | Operator::Nin, Operand::Value(_)) => false,
            (_, Operand::List(_)) => false,
            (_, Operand::Value(operand)) => {
                let Some(ordering) = value.and_then(|value| value.compare(operand)) else {
                    return false;
                };
                match self {
                    Operator::Gte => ordering.is_ge(),
                    Operator::Lte => ordering.is_le(),
                    Operator::Gt => ordering.is_gt(),
                    _ => ordering.is_lt(),
                }
            }
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Right-hand side of an operator.
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Value(Value),
    List(Vec<Value>),
    /// JSON `null`, which no cell value equals or orders against
    Null,
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Operand::Value(value)
    }
}

impl<T: Into<Value>> FromIterator<T> for Operand {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Operand::List(iter.into_iter().map(Into::into).collect())
    }
}

impl Operand {
    /// Arrays become lists without their `null` items; anything else is a single value.
    fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Operand::Null,
            serde_json::Value::Array(items) => {
                items.into_iter().filter(|item| !item.is_null()).collect()
            }
            other => Operand::Value(Value::from(other)),
        }
    }
}

/// The condition placed on one field.
#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    /// Strict equality
    Equals(Value),
    /// Every operator must pass
    Operators(Vec<(Operator, Operand)>),
    /// Equality with JSON `null`; never matches
    Null,
}

impl Condition {
    pub fn matches(&self, value: Option<&Value>) -> bool {
        match self {
            Condition::Equals(expected) => value == Some(expected),
            Condition::Null => false,
            Condition::Operators(operators) => operators
                .iter()
                .all(|(operator, operand)| operator.test(value, operand)),
        }
    }
}

/// A declarative query over entities.
///
/// Field conditions are AND-ed; `$and` requires every nested filter to match;
/// `$or`, when present, requires at least one. A filter with no conditions and
/// no `$or` matches everything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Condition)>,
    and: Option<Vec<Filter>>,
    or: Option<Vec<Filter>>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.push((field.to_owned(), Condition::Equals(value.into())));
        self
    }

    /// Adds an operator on `field`, merging with the field's existing operator object.
    pub fn op(mut self, field: &str, operator: Operator, operand: impl Into<Operand>) -> Self {
        let operand = operand.into();
        let existing = self.conditions.iter_mut().find_map(|(name, condition)| match condition {
            Condition::Operators(operators) if name == field => Some(operators),
            _ => None,
        });
        match existing {
            Some(operators) => operators.push((operator, operand)),
            None => self
                .conditions
                .push((field.to_owned(), Condition::Operators(vec![(operator, operand)]))),
        }
        self
    }

    pub fn gte(self, field: &str, value: impl Into<Value>) -> Self {
        self.op(field, Operator::Gte, value.into())
    }

    pub fn lte(self, field: &str, value: impl Into<Value>) -> Self {
        self.op(field, Operator::Lte, value.into())
    }

    pub fn gt(self, field: &str, value: impl Into<Value>) -> Self {
        self.op(field, Operator::Gt, value.into())
    }

    pub fn lt(self, field: &str, value: impl Into<Value>) -> Self {
        self.op(field, Operator::Lt, value.into())
    }

    pub fn ne(self, field: &str, value: impl Into<Value>) -> Self {
        self.op(field, Operator::Ne, value.into())
    }

    pub fn is_in<T: Into<Value>>(self, field: &str, values: impl IntoIterator<Item = T>) -> Self {
        self.op(field, Operator::In, values.into_iter().collect::<Operand>())
    }

    pub fn not_in<T: Into<Value>>(self, field: &str, values: impl IntoIterator<Item = T>) -> Self {
        self.op(field, Operator::Nin, values.into_iter().collect::<Operand>())
    }

    pub fn and(mut self, filters: Vec<Filter>) -> Self {
        self.and = Some(filters);
        self
    }

    pub fn or(mut self, filters: Vec<Filter>) -> Self {
        self.or = Some(filters);
        self
    }

    /// Parses a filter object such as `{"age": {"$gte": 18}, "$or": [{"a": 1}]}`.
    ///
    /// `null` never equals a field, so `{"f": null}` matches nothing while
    /// `{"f": {"$ne": null}}` matches everything. `null` list items are dropped.
    pub fn from_json(json: &str) -> Result<Self, CriteriaError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| CriteriaError::InvalidFilter(e.to_string()))?;
        Filter::try_from(value)
    }

    fn nested(filters: Vec<serde_json::Value>) -> Result<Vec<Filter>, CriteriaError> {
        filters.into_iter().map(Filter::try_from).collect()
    }
}

impl TryFrom<serde_json::Value> for Filter {
    type Error = CriteriaError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        let object = match value {
            serde_json::Value::Object(object) => object,
            other => {
                let message = format!("expected an object, found {}", other);
                Err(CriteriaError::InvalidFilter(message))?
            }
        };
        let mut filter = Filter::new();
        for (key, value) in object {
            match value {
                serde_json::Value::Array(filters) if key == OR => {
                    filter.or = Some(Filter::nested(filters)?)
                }
                serde_json::Value::Array(filters) if key == AND => {
                    filter.and = Some(Filter::nested(filters)?)
                }
                serde_json::Value::Object(operators) => {
                    let operators = operators
                        .into_iter()
                        .filter_map(|(key, operand)| {
                            Some((Operator::from_key(&key)?, Operand::from_json(operand)))
                        })
                        .collect();
                    filter.conditions.push((key, Condition::Operators(operators)));
                }
                serde_json::Value::Array(_) => {
                    filter.conditions.push((key, Condition::Operators(Vec::new())))
                }
                serde_json::Value::Null => filter.conditions.push((key, Condition::Null)),
                scalar => filter.conditions.push((key, Condition::Equals(Value::from(scalar)))),
            }
        }
        Ok(filter)
    }
}

type Predicate = Box<dyn Fn(&Entity) -> bool>;

/// A filter compiled once into a reusable predicate.
pub struct FindBuilder {
    predicate: Predicate,
}

impl FindBuilder {
    pub fn new(filter: &Filter) -> Self {
        Self { predicate: compile(filter) }
    }

    pub fn compare(&self, entity: &Entity) -> bool {
        (self.predicate)(entity)
    }

    /// True when every entity matches.
    pub fn compare_all(&self, entities: &[Entity]) -> bool {
        entities.iter().all(|entity| self.compare(entity))
    }
}

fn compile(filter: &Filter) -> Predicate {
    let direct = filter
        .conditions
        .iter()
        .cloned()
        .map(|(field, condition)| -> Predicate {
            Box::new(move |entity: &Entity| condition.matches(entity.get(&field)))
        })
        .collect::<Vec<_>>();
    let and = filter.and.iter().flatten().map(compile).collect::<Vec<_>>();
    let or = filter
        .or
        .as_ref()
        .map(|filters| filters.iter().map(compile).collect::<Vec<_>>());

    Box::new(move |entity: &Entity| {
        direct.iter().all(|predicate| predicate(entity))
            && and.iter().all(|predicate| predicate(entity))
            && or.as_ref().map_or(true, |or| or.iter().any(|predicate| predicate(entity)))
    })
}
