//! Listing query model
//!
//! A small description of the query an entity listing runs: the table,
//! the selected expressions, relations to eager-load and the order clauses.
//! Attributes adjust it through [`SchemaAttribute::modify_query`] and
//! [`SchemaAttribute::order`].
//!
//! [`SchemaAttribute::modify_query`]: crate::attribute::SchemaAttribute::modify_query
//! [`SchemaAttribute::order`]: crate::attribute::SchemaAttribute::order

use cruddy_core::SortDirection;
use std::fmt;

// ============================================================================
// Query
// ============================================================================

/// A listing query under construction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    table: Option<String>,
    selects: Vec<Select>,
    eager: Vec<String>,
    orders: Vec<Order>,
}

/// A selected expression
#[derive(Debug, Clone, PartialEq)]
pub enum Select {
    /// A plain column
    Column(String),
    /// A raw SQL expression
    Raw(String),
}

/// An order clause
#[derive(Debug, Clone, PartialEq)]
pub enum Order {
    /// Order by a plain column
    Column {
        column: String,
        direction: SortDirection,
    },
    /// Order by a raw SQL expression
    Raw {
        expression: String,
        direction: SortDirection,
    },
}

impl Query {
    /// Create an empty query
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a query over a table
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            ..Self::default()
        }
    }

    /// Select a column; selecting the same column twice is a no-op
    pub fn select(&mut self, column: impl Into<String>) -> &mut Self {
        let select = Select::Column(column.into());
        if !self.selects.contains(&select) {
            self.selects.push(select);
        }
        self
    }

    /// Select a raw expression
    pub fn select_raw(&mut self, expression: impl Into<String>) -> &mut Self {
        self.selects.push(Select::Raw(expression.into()));
        self
    }

    /// Eager-load a relation; loading the same relation twice is a no-op
    pub fn with(&mut self, relation: impl Into<String>) -> &mut Self {
        let relation = relation.into();
        if !self.eager.contains(&relation) {
            self.eager.push(relation);
        }
        self
    }

    /// Append an order clause on a column
    pub fn order_by(&mut self, column: impl Into<String>, direction: SortDirection) -> &mut Self {
        self.orders.push(Order::Column {
            column: column.into(),
            direction,
        });
        self
    }

    /// Append an order clause on a raw expression
    pub fn order_by_raw(
        &mut self,
        expression: impl Into<String>,
        direction: SortDirection,
    ) -> &mut Self {
        self.orders.push(Order::Raw {
            expression: expression.into(),
            direction,
        });
        self
    }

    /// The table, if set
    pub fn table_name(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Selected expressions in insertion order
    pub fn selects(&self) -> &[Select] {
        &self.selects
    }

    /// Relations to eager-load
    pub fn eager_loads(&self) -> &[String] {
        &self.eager
    }

    /// Order clauses in insertion order
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Render the query as SQL
    pub fn to_sql(&self) -> String {
        let selects = if self.selects.is_empty() {
            "*".to_string()
        } else {
            self.selects
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut sql = format!("SELECT {}", selects);
        if let Some(table) = &self.table {
            sql.push_str(&format!(" FROM {}", table));
        }
        if !self.orders.is_empty() {
            let orders = self
                .orders
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(&format!(" ORDER BY {}", orders));
        }
        sql
    }
}

impl fmt::Display for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Select::Column(column) | Select::Raw(column) => f.write_str(column),
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Order::Column { column, direction } => write!(f, "{} {}", column, direction.as_sql()),
            Order::Raw {
                expression,
                direction,
            } => write!(f, "{} {}", expression, direction.as_sql()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
