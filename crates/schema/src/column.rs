//! Listing columns
//!
//! Columns describe what an entity listing shows and how it can be
//! ordered. `proto` columns read a database column, `computed` columns are
//! produced by an optional raw SQL clause.

use crate::attribute::{Attribute, AttributeBuilder, SchemaAttribute};
use crate::collection::{AttributeFactory, ItemConfig};
use crate::query::Query;
use cruddy_core::{Arrayable, EngineResult, SortDirection};
use serde_json::{Map, Value, json};

/// Factory building column collections
pub type ColumnFactory = AttributeFactory<Column>;

// ============================================================================
// Column
// ============================================================================

/// An attribute shown in the entity listing
#[derive(Debug, Clone)]
pub struct Column {
    base: Attribute,
    kind: ColumnKind,
    width: Option<u64>,
    format: Option<String>,
}

/// Type-specific column settings
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnKind {
    /// Reads `column` from the model table; `relation.column` reads through a relation
    Proto { column: String },
    /// Value produced by a raw clause, when given
    Computed { clause: Option<String> },
}

impl Column {
    /// Type-specific settings
    pub fn kind(&self) -> &ColumnKind {
        &self.kind
    }

    /// Column title: `columns` translation, then `fields` translation, then generated
    pub fn title(&self) -> String {
        self.base
            .translate(Some("columns"), None)
            .or_else(|| self.base.translate(Some("fields"), None))
            .unwrap_or_else(|| self.base.generate_label())
    }
}

impl Arrayable for Column {
    fn to_array(&self) -> Map<String, Value> {
        let mut map = self.base.to_array();
        map.insert("title".into(), Value::String(self.title()));
        map.insert("width".into(), json!(self.width));
        map.insert("format".into(), json!(self.format));
        map
    }
}

impl SchemaAttribute for Column {
    fn attribute(&self) -> &Attribute {
        &self.base
    }

    fn modify_query(&self, query: &mut Query) {
        match &self.kind {
            ColumnKind::Proto { column } => match column.rsplit_once('.') {
                Some((relation, _)) => {
                    query.with(relation);
                }
                None => {
                    query.select(column.as_str());
                }
            },
            ColumnKind::Computed {
                clause: Some(clause),
            } => {
                query.select_raw(format!("{} as {}", clause, self.base.id()));
            }
            ColumnKind::Computed { clause: None } => {}
        }
    }

    fn order(&self, query: &mut Query, direction: SortDirection) {
        match &self.kind {
            ColumnKind::Proto { column } => {
                query.order_by(column.as_str(), direction);
            }
            ColumnKind::Computed {
                clause: Some(clause),
            } => {
                query.order_by_raw(clause.as_str(), direction);
            }
            // Never orderable
            ColumnKind::Computed { clause: None } => {}
        }
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl AttributeFactory<Column> {
    /// Factory with the built-in column types; untyped items become `proto`
    pub fn columns() -> Self {
        Self::new("columns", "proto")
            .with("proto", proto)
            .with("computed", computed)
    }
}

fn configure(
    builder: AttributeBuilder,
    item: &ItemConfig,
    class: &str,
    can_order: bool,
    kind: ColumnKind,
) -> EngineResult<Column> {
    let can_order = item.flag("orderable", can_order)?;

    Ok(Column {
        base: builder.class(class).can_order(can_order).build(),
        kind,
        width: item.integer("width")?,
        format: item.string("format")?,
    })
}

fn proto(builder: AttributeBuilder, item: &ItemConfig) -> EngineResult<Column> {
    let column = item
        .string("column")?
        .unwrap_or_else(|| item.id().to_string());

    // Relation columns are eager-loaded, never joined
    let is_relation = column.contains('.');
    if is_relation && item.flag("orderable", false)? {
        return Err(item.invalid(format!(
            "relation column '{}' cannot order data",
            column
        )));
    }
    configure(builder, item, "Proto", !is_relation, ColumnKind::Proto { column })
}

fn computed(builder: AttributeBuilder, item: &ItemConfig) -> EngineResult<Column> {
    let clause = item.string("clause")?;
    if clause.is_none() && item.flag("orderable", false)? {
        return Err(item.invalid("computed column without a clause cannot order data"));
    }
    let can_order = clause.is_some();
    configure(builder, item, "Computed", can_order, ColumnKind::Computed { clause })
}

// ============================================================================
// Tests
// ============================================================================
