use std::fmt;
use serde::{Serialize, Deserialize};
use crate::query::ast::{Operand, Reference};

/// Parsed NXQL `SELECT` statement, the optimizer's input and output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlQuery {
    pub select: SelectClause,
    pub from: FromClause,
    pub where_clause: Option<Operand>,
    pub order_by: Vec<OrderByExpr>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectClause {
    pub distinct: bool,
    pub elements: Vec<Reference>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FromClause {
    pub types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderByExpr {
    pub reference: Reference,
    pub descending: bool,
}

/// Facets a document must carry (`required`) or must not carry (`excluded`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetFilter {
    pub required: Vec<String>,
    pub excluded: Vec<String>,
}

impl FacetFilter {
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.excluded.is_empty()
    }
}

impl SqlQuery {
    /// `SELECT ecm:uuid FROM <types>`
    pub fn select_from(types: &[&str]) -> Self {
        SqlQuery {
            select: SelectClause {
                distinct: false,
                elements: vec![Reference::new(crate::query::nxql::ECM_UUID)],
            },
            from: FromClause {
                types: types.iter().map(|t| t.to_string()).collect(),
            },
            where_clause: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn with_select(mut self, elements: Vec<Reference>) -> Self {
        self.select.elements = elements;
        self
    }

    pub fn with_where(mut self, predicate: impl Into<Operand>) -> Self {
        self.where_clause = Some(predicate.into());
        self
    }
}

impl fmt::Display for SqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        if self.select.distinct {
            f.write_str("DISTINCT ")?;
        }
        let select: Vec<String> = self.select.elements.iter().map(|r| r.to_string()).collect();
        write!(f, "{} FROM {}", select.join(", "), self.from.types.join(", "))?;
        if let Some(predicate) = &self.where_clause {
            write!(f, " WHERE {}", predicate)?;
        }
        if !self.order_by.is_empty() {
            let order: Vec<String> = self
                .order_by
                .iter()
                .map(|o| format!("{}{}", o.reference, if o.descending { " DESC" } else { "" }))
                .collect();
            write!(f, " ORDER BY {}", order.join(", "))?;
        }
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {}", limit)?;
        }
        if let Some(offset) = self.offset {
            write!(f, " OFFSET {}", offset)?;
        }
        Ok(())
    }
}
