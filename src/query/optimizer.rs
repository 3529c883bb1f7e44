use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;
use crate::core::error::{Error, Result};
use crate::query::ast::{Expression, Literal, MultiExpression, Operand, Operator, Reference};
use crate::query::nxql;
use crate::query::prefix::{self, Annotated};
use crate::query::sql::{FacetFilter, SelectClause, SqlQuery};
use crate::schema::schema::TypeRegistry;

/// Working set the rules rewrite: the top-level conjuncts of the WHERE
/// clause plus what the rules need to know about the rest of the query.
#[derive(Debug, Clone)]
pub struct ClauseSet {
    pub clauses: Vec<Operand>,
    pub select: SelectClause,
    /// Types allowed by FROM, `None` when FROM includes `Document`.
    pub from_types: Option<BTreeSet<String>>,
}

/// Trait for query optimization rules
pub trait OptimizationRule: Send + Sync {
    fn name(&self) -> &str;
    fn apply(&self, set: &mut ClauseSet) -> Result<()>;
}

/// Rule: fold primary type and static mixin constraints into one type clause
pub struct SimplifyTypesRule {
    types: Arc<dyn TypeRegistry>,
}

enum TypeConstraint {
    Restrict(BTreeSet<String>),
    Exclude(BTreeSet<String>),
}

impl SimplifyTypesRule {
    pub fn new(types: Arc<dyn TypeRegistry>) -> Self {
        SimplifyTypesRule { types }
    }

    fn constraint(&self, clause: &Operand) -> Option<TypeConstraint> {
        let Operand::Expression(expr) = clause else {
            return None;
        };
        let reference = expr.lvalue.as_reference().filter(|r| r.cast.is_none())?;
        let names = string_values(expr.rvalue.as_ref()?)?;
        let single = names.len() == 1;
        match (reference.name.as_str(), expr.operator) {
            (nxql::ECM_PRIMARY_TYPE, Operator::Eq) if single => Some(TypeConstraint::Restrict(names)),
            (nxql::ECM_PRIMARY_TYPE, Operator::NotEq) if single => Some(TypeConstraint::Exclude(names)),
            (nxql::ECM_PRIMARY_TYPE, Operator::In) => Some(TypeConstraint::Restrict(names)),
            (nxql::ECM_PRIMARY_TYPE, Operator::NotIn) => Some(TypeConstraint::Exclude(names)),
            (nxql::ECM_MIXIN_TYPE, op) => {
                if !names.iter().all(|m| self.types.is_no_per_instance_facet(m)) {
                    return None;
                }
                let with_facet: BTreeSet<String> = names
                    .iter()
                    .flat_map(|m| self.types.types_with_facet(m))
                    .collect();
                match op {
                    Operator::Eq if single => Some(TypeConstraint::Restrict(with_facet)),
                    Operator::In => Some(TypeConstraint::Restrict(with_facet)),
                    Operator::NotEq if single => Some(TypeConstraint::Exclude(with_facet)),
                    Operator::NotIn => Some(TypeConstraint::Exclude(with_facet)),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

impl OptimizationRule for SimplifyTypesRule {
    fn name(&self) -> &str {
        "simplify_types"
    }

    fn apply(&self, set: &mut ClauseSet) -> Result<()> {
        let mut types = set.from_types.clone();
        let mut folded = 0usize;
        let mut kept = Vec::with_capacity(set.clauses.len());
        for clause in std::mem::take(&mut set.clauses) {
            match self.constraint(&clause) {
                Some(TypeConstraint::Restrict(allowed)) => {
                    let current = types.take().unwrap_or_else(|| self.types.all_types());
                    types = Some(current.intersection(&allowed).cloned().collect());
                    folded += 1;
                }
                Some(TypeConstraint::Exclude(excluded)) => {
                    let current = types.take().unwrap_or_else(|| self.types.all_types());
                    types = Some(current.difference(&excluded).cloned().collect());
                    folded += 1;
                }
                None => kept.push(clause),
            }
        }
        if let Some(types) = types {
            debug!(folded = folded, types = types.len(), "folded type constraints");
            kept.push(type_clause(types));
        }
        set.clauses = kept;
        Ok(())
    }
}

/// Rule: give uncorrelated projected wildcards their own correlation and
/// require them to be non-null
pub struct WildcardNotNullRule;

impl OptimizationRule for WildcardNotNullRule {
    fn name(&self) -> &str {
        "wildcard_not_null"
    }

    fn apply(&self, set: &mut ClauseSet) -> Result<()> {
        let mut next = max_correlation(set) + 1;
        let mut added = Vec::new();
        for element in &mut set.select.elements {
            if !element.name.split('/').any(nxql::is_wildcard) {
                continue;
            }
            let renamed: Vec<String> = element
                .name
                .split('/')
                .map(|segment| {
                    if segment == "*" {
                        let correlated = format!("*{}", next);
                        next += 1;
                        correlated
                    } else {
                        segment.to_string()
                    }
                })
                .collect();
            element.name = renamed.join("/");
            added.push(Operand::from(Expression::unary(
                Operator::IsNotNull,
                Operand::Reference(Reference::new(element.name.clone())),
            )));
        }
        set.clauses.extend(added);
        Ok(())
    }
}

/// Rule: group conjuncts sharing a correlated wildcard prefix
pub struct GroupByPrefixRule;

impl OptimizationRule for GroupByPrefixRule {
    fn name(&self) -> &str {
        "group_by_prefix"
    }

    fn apply(&self, set: &mut ClauseSet) -> Result<()> {
        let before = set.clauses.len();
        set.clauses = prefix::group_by_prefix(std::mem::take(&mut set.clauses));
        if set.clauses.len() != before {
            debug!(before = before, after = set.clauses.len(), "grouped clauses by wildcard prefix");
        }
        Ok(())
    }
}

/// Optimizer output: the rewritten query and the prefix annotation of its
/// WHERE clause.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizedQuery {
    pub query: SqlQuery,
    pub annotations: Option<Annotated>,
}

/// Query optimizer
pub struct QueryOptimizer {
    pub rules: Vec<Box<dyn OptimizationRule>>,
    types: Arc<dyn TypeRegistry>,
}

impl QueryOptimizer {
    /// Type folding sees the whole flattened list, and wildcard renaming runs
    /// before prefix grouping reads reference names.
    pub fn new(types: Arc<dyn TypeRegistry>) -> Self {
        QueryOptimizer {
            rules: vec![
                Box::new(SimplifyTypesRule::new(types.clone())),
                Box::new(WildcardNotNullRule),
                Box::new(GroupByPrefixRule),
            ],
            types,
        }
    }

    pub fn optimize(&self, query: &SqlQuery) -> Result<OptimizedQuery> {
        self.optimize_with_facets(query, &FacetFilter::default())
    }

    pub fn optimize_with_facets(&self, query: &SqlQuery, facets: &FacetFilter) -> Result<OptimizedQuery> {
        let mut set = ClauseSet {
            clauses: Vec::new(),
            select: query.select.clone(),
            from_types: self.from_types(&query.from.types)?,
        };
        if let Some(predicate) = &query.where_clause {
            flatten(predicate.clone(), &mut set.clauses);
        }
        set.clauses.extend(facet_clauses(facets));

        for rule in &self.rules {
            rule.apply(&mut set)?;
            debug!(rule = rule.name(), clauses = set.clauses.len(), "applied optimization rule");
        }

        let mut optimized = query.clone();
        optimized.select = set.select;
        optimized.where_clause = match set.clauses.len() {
            0 => None,
            1 => set.clauses.pop(),
            _ => Some(Operand::MultiExpression(MultiExpression::and(set.clauses))),
        };
        let annotations = optimized.where_clause.as_ref().and_then(prefix::annotate);
        Ok(OptimizedQuery {
            query: optimized,
            annotations,
        })
    }

    fn from_types(&self, names: &[String]) -> Result<Option<BTreeSet<String>>> {
        if names.is_empty() || names.iter().any(|n| n == nxql::TYPE_DOCUMENT) {
            return Ok(None);
        }
        let mut types = BTreeSet::new();
        for name in names {
            let subtypes = self
                .types
                .subtypes_of(name)
                .ok_or_else(|| Error::query_parse(format!("Unknown type in FROM: {}", name)))?;
            types.extend(subtypes);
        }
        Ok(Some(types))
    }
}

/// Top-level AND operands, in order.
pub fn flatten(predicate: Operand, out: &mut Vec<Operand>) {
    let mut stack = vec![predicate];
    while let Some(operand) = stack.pop() {
        match operand {
            Operand::Expression(expr) if expr.operator == Operator::And => {
                let Expression { lvalue, rvalue, .. } = *expr;
                stack.extend(rvalue);
                stack.push(lvalue);
            }
            Operand::MultiExpression(multi) if multi.operator == Operator::And => {
                stack.extend(multi.operands.into_iter().rev());
            }
            other => out.push(other),
        }
    }
}

fn facet_clauses(facets: &FacetFilter) -> Vec<Operand> {
    let mut clauses: Vec<Operand> = facets
        .required
        .iter()
        .map(|facet| {
            Expression::new(Operand::reference(nxql::ECM_MIXIN_TYPE), Operator::Eq, Operand::string(facet.as_str()))
                .into()
        })
        .collect();
    if !facets.excluded.is_empty() {
        clauses.push(
            Expression::new(
                Operand::reference(nxql::ECM_MIXIN_TYPE),
                Operator::NotIn,
                Operand::strings(facets.excluded.iter().cloned()),
            )
            .into(),
        );
    }
    clauses
}

fn type_clause(types: BTreeSet<String>) -> Operand {
    let reference = Operand::reference(nxql::ECM_PRIMARY_TYPE);
    let expr = match types.len() {
        0 => Expression::new(reference, Operator::Eq, Operand::string(nxql::TYPE_NO_SUCH)),
        1 => {
            let only = types.into_iter().next().unwrap_or_default();
            Expression::new(reference, Operator::Eq, Operand::string(only))
        }
        _ => Expression::new(reference, Operator::In, Operand::strings(types)),
    };
    expr.into()
}

fn string_values(operand: &Operand) -> Option<BTreeSet<String>> {
    match operand {
        Operand::Literal(Literal::String(s)) => Some(BTreeSet::from([s.clone()])),
        Operand::LiteralList(list) => list.iter().map(|l| l.as_str().map(String::from)).collect(),
        _ => None,
    }
}

fn max_correlation(set: &ClauseSet) -> u32 {
    let mut max = 0;
    let mut note = |name: &str| {
        for segment in name.split('/') {
            if let Some(n) = segment.strip_prefix('*').and_then(|d| d.parse::<u32>().ok()) {
                max = max.max(n);
            }
        }
    };
    for element in &set.select.elements {
        note(&element.name);
    }
    let mut stack: Vec<&Operand> = set.clauses.iter().collect();
    while let Some(operand) = stack.pop() {
        match operand {
            Operand::Reference(r) => note(&r.name),
            Operand::Expression(e) => {
                stack.push(&e.lvalue);
                stack.extend(e.rvalue.as_ref());
            }
            Operand::MultiExpression(m) => stack.extend(m.operands.iter()),
            Operand::Function(f) => stack.extend(f.args.iter()),
            Operand::Literal(_) | Operand::LiteralList(_) => {}
        }
    }
    max
}
