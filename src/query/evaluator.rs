//! Three-valued evaluation of NXQL predicates against one document.
//!
//! Pseudo-properties (`ecm:path`, `ecm:ancestorId`, `ecm:isTrashed`,
//! `ecm:fulltext*`, `ecm:mixinType`) are recognized by name on the left-hand
//! side before generic dispatch; everything else is resolved through the
//! caller's [`ReferenceResolver`].

use std::sync::Arc;
use chrono::{DateTime, NaiveTime, Utc};
use crate::analysis::fulltext;
use crate::analysis::matcher::FulltextMatcher;
use crate::core::config::{EngineConfig, TrashStrategy};
use crate::core::error::{Error, Result};
use crate::query::ast::{Cast, Expression, Literal, MultiExpression, Operand, Operator, Reference};
use crate::query::compare::{compare, in_list, like_text};
use crate::query::like::{escape_like, LikeCache};
use crate::query::nxql;
use crate::query::resolver::{PathResolver, ReferenceResolver};
use crate::query::tri::Tri;
use crate::state::value::{Number, StateValue};

pub struct ExpressionEvaluator {
    config: EngineConfig,
    path_resolver: Arc<dyn PathResolver>,
    matcher: FulltextMatcher,
    like_cache: LikeCache,
}

impl ExpressionEvaluator {
    pub fn new(config: EngineConfig, path_resolver: Arc<dyn PathResolver>) -> Self {
        let matcher = FulltextMatcher::new(&config.fulltext);
        let like_cache = LikeCache::new(config.like_cache_size);
        ExpressionEvaluator {
            config,
            path_resolver,
            matcher,
            like_cache,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn like_cache(&self) -> &LikeCache {
        &self.like_cache
    }

    /// Evaluates a WHERE predicate: an expression, a multi-expression, or a
    /// boolean-valued reference or literal.
    pub fn evaluate(&self, predicate: &Operand, resolver: &mut dyn ReferenceResolver) -> Result<Tri> {
        self.truth_of(predicate, resolver)
    }

    pub fn walk(&self, expr: &Expression, resolver: &mut dyn ReferenceResolver) -> Result<Tri> {
        if let Some(name) = expr.reference_name() {
            if let Some(result) = self.walk_pseudo_property(name, expr, resolver)? {
                return Ok(result);
            }
        }
        match expr.operator {
            Operator::And | Operator::Or => {
                // both sides are evaluated so that every reference is resolved
                let left = self.truth_of(&expr.lvalue, resolver)?;
                let right = self.truth_of(self.rvalue(expr)?, resolver)?;
                Ok(if expr.operator == Operator::And { left.and(right) } else { left.or(right) })
            }
            Operator::Not => Ok(!self.truth_of(&expr.lvalue, resolver)?),
            Operator::Eq
            | Operator::NotEq
            | Operator::Lt
            | Operator::Gt
            | Operator::LtEq
            | Operator::GtEq => {
                let rvalue = self.rvalue(expr)?;
                self.check_date_cast(&expr.lvalue, std::slice::from_ref(rvalue))?;
                let left = self.value_of(&expr.lvalue, resolver)?;
                let right = self.value_of(rvalue, resolver)?;
                Ok(compare(expr.operator, &left, &right))
            }
            Operator::Like | Operator::NotLike => {
                let result = self.walk_like(&expr.lvalue, self.rvalue(expr)?, false, resolver)?;
                Ok(if expr.operator == Operator::Like { result } else { !result })
            }
            Operator::ILike | Operator::NotILike => {
                let result = self.walk_like(&expr.lvalue, self.rvalue(expr)?, true, resolver)?;
                Ok(if expr.operator == Operator::ILike { result } else { !result })
            }
            Operator::In | Operator::NotIn => {
                let list = self.literal_list(expr)?;
                self.check_date_cast(&expr.lvalue, list)?;
                let left = self.value_of(&expr.lvalue, resolver)?;
                let values: Vec<StateValue> = list.iter().map(literal_value).collect();
                let result = in_list(&left, &values);
                Ok(if expr.operator == Operator::In { result } else { !result })
            }
            Operator::Between | Operator::NotBetween => {
                let list = self.literal_list(expr)?;
                let [low, high] = list else {
                    return Err(Error::query_parse(format!(
                        "{} requires a list of two values: {}",
                        expr.operator.symbol(),
                        expr
                    )));
                };
                self.check_date_cast(&expr.lvalue, list)?;
                let left = self.value_of(&expr.lvalue, resolver)?;
                let result = compare(Operator::GtEq, &left, &literal_value(low))
                    .and(compare(Operator::LtEq, &left, &literal_value(high)));
                Ok(if expr.operator == Operator::Between { result } else { !result })
            }
            Operator::IsNull | Operator::IsNotNull => {
                let value = self.value_of(&expr.lvalue, resolver)?;
                let null = value.is_null() || value.as_array().is_some_and(|a| a.is_empty());
                Ok(Tri::from_bool(null == (expr.operator == Operator::IsNull)))
            }
            Operator::StartsWith => self.walk_starts_with(expr, resolver),
            Operator::Sum | Operator::Sub | Operator::Mul | Operator::Div => Err(Error::query_parse(
                format!("Not a boolean expression: {}", expr),
            )),
        }
    }

    /// `AND` and `OR` over all operands; every operand is evaluated.
    pub fn walk_multi(&self, multi: &MultiExpression, resolver: &mut dyn ReferenceResolver) -> Result<Tri> {
        let mut results = Vec::with_capacity(multi.operands.len());
        for operand in &multi.operands {
            results.push(self.truth_of(operand, resolver)?);
        }
        match multi.operator {
            Operator::And => Ok(Tri::all(results)),
            Operator::Or => Ok(Tri::any(results)),
            other => Err(Error::query_parse(format!(
                "Multi-expression operator must be AND or OR, got {}",
                other.symbol()
            ))),
        }
    }

    fn truth_of(&self, operand: &Operand, resolver: &mut dyn ReferenceResolver) -> Result<Tri> {
        match operand {
            Operand::Expression(expr) => self.walk(expr, resolver),
            Operand::MultiExpression(multi) => self.walk_multi(multi, resolver),
            other => match self.value_of(other, resolver)? {
                StateValue::Null => Ok(Tri::Unknown),
                StateValue::Boolean(b) => Ok(Tri::from_bool(b)),
                StateValue::Long(v) if v == 0 || v == 1 => Ok(Tri::from_bool(v == 1)),
                value => Err(Error::query_parse(format!(
                    "Operand {} of kind {} is not a boolean",
                    other,
                    value.kind()
                ))),
            },
        }
    }

    /// Value of a non-boolean operand. Boolean sub-expressions yield
    /// `Boolean` or `Null` for unknown.
    pub fn value_of(&self, operand: &Operand, resolver: &mut dyn ReferenceResolver) -> Result<StateValue> {
        match operand {
            Operand::Reference(reference) => self.resolve_reference(reference, resolver),
            Operand::Literal(literal) => Ok(literal_value(literal)),
            Operand::LiteralList(_) => Err(Error::query_parse(format!(
                "Literal list {} only allowed on the right of IN or BETWEEN",
                operand
            ))),
            Operand::Expression(expr) if expr.operator.is_arithmetic() => {
                self.walk_arithmetic(expr, resolver)
            }
            Operand::Expression(_) | Operand::MultiExpression(_) => {
                let result = self.truth_of(operand, resolver)?;
                Ok(result.to_option().map_or(StateValue::Null, StateValue::Boolean))
            }
            Operand::Function(function) => Err(Error::query_parse(format!(
                "Function not supported: {}",
                function.name
            ))),
        }
    }

    fn resolve_reference(&self, reference: &Reference, resolver: &mut dyn ReferenceResolver) -> Result<StateValue> {
        let value = resolver.resolve(&reference.name)?;
        match reference.cast {
            None => Ok(value),
            Some(Cast::Date) => Ok(cast_to_date(value)),
        }
    }

    fn walk_arithmetic(&self, expr: &Expression, resolver: &mut dyn ReferenceResolver) -> Result<StateValue> {
        let left = self.value_of(&expr.lvalue, resolver)?;
        let right = self.value_of(self.rvalue(expr)?, resolver)?;
        if left.is_null() || right.is_null() {
            return Ok(StateValue::Null);
        }
        let (Some(a), Some(b)) = (left.as_number(), right.as_number()) else {
            return Err(Error::query_parse(format!("Arithmetic on non-numeric values: {}", expr)));
        };
        Ok(match (expr.operator, a, b) {
            (Operator::Sum, _, _) => a.add(b).into_value(),
            (Operator::Sub, Number::Long(x), Number::Long(y)) => StateValue::Long(x.wrapping_sub(y)),
            (Operator::Sub, _, _) => StateValue::Double(a.as_f64() - b.as_f64()),
            (Operator::Mul, Number::Long(x), Number::Long(y)) => StateValue::Long(x.wrapping_mul(y)),
            (Operator::Mul, _, _) => StateValue::Double(a.as_f64() * b.as_f64()),
            (Operator::Div, _, Number::Long(0)) => StateValue::Null,
            (Operator::Div, _, Number::Double(y)) if y == 0.0 => StateValue::Null,
            (Operator::Div, Number::Long(x), Number::Long(y)) => StateValue::Long(x.wrapping_div(y)),
            (Operator::Div, _, _) => StateValue::Double(a.as_f64() / b.as_f64()),
            _ => return Err(Error::query_parse(format!("Not an arithmetic expression: {}", expr))),
        })
    }

    fn walk_like(
        &self,
        lvalue: &Operand,
        rvalue: &Operand,
        case_insensitive: bool,
        resolver: &mut dyn ReferenceResolver,
    ) -> Result<Tri> {
        let Some(Literal::String(pattern)) = rvalue.as_literal() else {
            return Err(Error::query_parse(format!(
                "LIKE requires a string literal pattern, got {}",
                rvalue
            )));
        };
        let value = self.value_of(lvalue, resolver)?;
        self.like_value(&value, pattern, case_insensitive)
    }

    fn like_value(&self, value: &StateValue, pattern: &str, case_insensitive: bool) -> Result<Tri> {
        if let StateValue::Array(values) = value {
            if values.is_empty() {
                return Ok(Tri::Unknown);
            }
            let mut matched = false;
            for v in values {
                matched |= self.like_value(v, pattern, case_insensitive)?.is_true();
            }
            return Ok(Tri::from_bool(matched));
        }
        match like_text(value) {
            Some(text) => Ok(Tri::from_bool(self.like_cache.matches(pattern, &text, case_insensitive)?)),
            None => Ok(Tri::Unknown),
        }
    }

    fn walk_starts_with(&self, expr: &Expression, resolver: &mut dyn ReferenceResolver) -> Result<Tri> {
        let Some(name) = expr.reference_name() else {
            return Err(Error::query_parse(format!(
                "STARTSWITH requires a reference on the left: {}",
                expr
            )));
        };
        let path = self.string_literal(expr, "STARTSWITH")?;
        let path = trim_trailing_slash(path);
        if name == nxql::ECM_PATH {
            let Some(ancestor) = self.path_resolver.get_id_for_path(path) else {
                // an unknown path must not read as unknown
                return Ok(Tri::False);
            };
            let ancestors = resolver.resolve(nxql::ECM_ANCESTOR_IDS)?;
            let found = ancestors
                .as_array()
                .is_some_and(|ids| ids.iter().any(|id| id.as_str() == Some(ancestor.as_str())));
            return Ok(Tri::from_bool(found));
        }
        let value = self.value_of(&expr.lvalue, resolver)?;
        let exact = compare(Operator::Eq, &value, &StateValue::from(path));
        let below = self.like_value(&value, &format!("{}/%", escape_like(path)), false)?;
        Ok(exact.or(below))
    }

    /// Handles pseudo-properties; `None` falls through to generic evaluation.
    fn walk_pseudo_property(
        &self,
        name: &str,
        expr: &Expression,
        resolver: &mut dyn ReferenceResolver,
    ) -> Result<Option<Tri>> {
        if matches!(
            expr.operator,
            Operator::StartsWith | Operator::And | Operator::Or | Operator::Not
        ) {
            return Ok(None);
        }
        match name {
            nxql::ECM_PATH => self.walk_ecm_path(expr, resolver).map(Some),
            nxql::ECM_ANCESTOR_ID => self.walk_ancestor_id(expr, resolver).map(Some),
            nxql::ECM_IS_TRASHED => self.walk_is_trashed(expr, resolver).map(Some),
            nxql::ECM_MIXIN_TYPE => self.walk_mixin_type(expr, resolver).map(Some),
            _ if nxql::is_fulltext(name) => self.walk_fulltext(name, expr, resolver).map(Some),
            _ => Ok(None),
        }
    }

    fn walk_ecm_path(&self, expr: &Expression, resolver: &mut dyn ReferenceResolver) -> Result<Tri> {
        let positive = self.eq_or_not_eq(expr, nxql::ECM_PATH)?;
        let path = trim_trailing_slash(self.string_literal(expr, nxql::ECM_PATH)?);
        let Some(id) = self.path_resolver.get_id_for_path(path) else {
            return Ok(Tri::from_bool(!positive));
        };
        let uuid = resolver.resolve(nxql::ECM_UUID)?;
        let result = compare(Operator::Eq, &uuid, &StateValue::String(id));
        Ok(if positive { result } else { !result })
    }

    fn walk_ancestor_id(&self, expr: &Expression, resolver: &mut dyn ReferenceResolver) -> Result<Tri> {
        let positive = self.eq_or_not_eq(expr, nxql::ECM_ANCESTOR_ID)?;
        let id = self.string_literal(expr, nxql::ECM_ANCESTOR_ID)?;
        let ancestors = resolver.resolve(nxql::ECM_ANCESTOR_IDS)?;
        let found = ancestors
            .as_array()
            .is_some_and(|ids| ids.iter().any(|a| a.as_str() == Some(id)));
        Ok(Tri::from_bool(found == positive))
    }

    fn walk_is_trashed(&self, expr: &Expression, resolver: &mut dyn ReferenceResolver) -> Result<Tri> {
        let positive = self.eq_or_not_eq(expr, nxql::ECM_IS_TRASHED)?;
        let wanted = match expr.rvalue.as_ref().and_then(Operand::as_literal) {
            Some(Literal::Integer(v @ (0 | 1))) => *v == 1,
            Some(Literal::Boolean(b)) => *b,
            _ => {
                return Err(Error::query_parse(format!(
                    "{} requires literal 0 or 1 as right argument",
                    nxql::ECM_IS_TRASHED
                )));
            }
        };
        let trashed = match self.config.trash_strategy {
            TrashStrategy::Lifecycle => self.trashed_by_lifecycle(resolver)?,
            TrashStrategy::DedicatedProperty => self.trashed_by_flag(resolver)?,
            TrashStrategy::Migration => {
                let lifecycle = self.trashed_by_lifecycle(resolver)?;
                let flag = self.trashed_by_flag(resolver)?;
                lifecycle || flag
            }
        };
        Ok(Tri::from_bool((trashed == wanted) == positive))
    }

    fn trashed_by_lifecycle(&self, resolver: &mut dyn ReferenceResolver) -> Result<bool> {
        let state = resolver.resolve(nxql::ECM_LIFECYCLE_STATE)?;
        Ok(state.as_str() == Some(nxql::DELETED_STATE))
    }

    fn trashed_by_flag(&self, resolver: &mut dyn ReferenceResolver) -> Result<bool> {
        let flag = resolver.resolve(nxql::ECM_IS_TRASHED)?;
        Ok(matches!(flag, StateValue::Boolean(true) | StateValue::Long(1)))
    }

    fn walk_mixin_type(&self, expr: &Expression, resolver: &mut dyn ReferenceResolver) -> Result<Tri> {
        let (mixins, include) = match expr.operator {
            Operator::Eq | Operator::NotEq => {
                let mixin = self.string_literal(expr, nxql::ECM_MIXIN_TYPE)?;
                (vec![mixin.to_string()], expr.operator == Operator::Eq)
            }
            Operator::In | Operator::NotIn => {
                let list = self.literal_list(expr)?;
                let mixins = list
                    .iter()
                    .map(|l| l.as_str().map(String::from))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| {
                        Error::query_parse(format!("{} requires string literals: {}", nxql::ECM_MIXIN_TYPE, expr))
                    })?;
                (mixins, expr.operator == Operator::In)
            }
            // IS NULL and friends see the resolved facet array
            _ => {
                return match expr.operator {
                    Operator::IsNull | Operator::IsNotNull => {
                        let value = resolver.resolve(nxql::ECM_MIXIN_TYPE)?;
                        let empty = value.as_array().is_none_or(|a| a.is_empty());
                        Ok(Tri::from_bool(empty == (expr.operator == Operator::IsNull)))
                    }
                    _ => Err(Error::query_parse(format!(
                        "{} requires =, <>, IN or NOT IN: {}",
                        nxql::ECM_MIXIN_TYPE,
                        expr
                    ))),
                };
            }
        };
        resolver.match_mixin_types(&mixins, include)
    }

    fn walk_fulltext(&self, name: &str, expr: &Expression, resolver: &mut dyn ReferenceResolver) -> Result<Tri> {
        if !matches!(expr.operator, Operator::Eq | Operator::Like) {
            return Err(Error::query_parse(format!("{} requires = or LIKE operator", nxql::ECM_FULLTEXT)));
        }
        let query = self.string_literal(expr, nxql::ECM_FULLTEXT)?;
        if self.config.fulltext.disabled {
            return Err(Error::query_parse("Fulltext search disabled by configuration"));
        }
        if let Some(property) = nxql::fulltext_property(name) {
            let value = resolver.resolve(property)?;
            return self.like_value(&value, &query.replace(' ', "%"), true);
        }
        let simple = resolver.resolve(nxql::ECM_FULLTEXT_SIMPLE)?;
        let binary = resolver.resolve(nxql::ECM_FULLTEXT_BINARY)?;
        let Some(parsed) = fulltext::analyze(query)? else {
            return Ok(Tri::False);
        };
        let text = format!(
            "{} {}",
            simple.as_str().unwrap_or_default(),
            binary.as_str().unwrap_or_default()
        );
        Ok(Tri::from_bool(self.matcher.matches(&parsed, &text)))
    }

    fn eq_or_not_eq(&self, expr: &Expression, name: &str) -> Result<bool> {
        match expr.operator {
            Operator::Eq => Ok(true),
            Operator::NotEq => Ok(false),
            other => Err(Error::query_parse(format!(
                "{} requires = or <> operator, got {}",
                name,
                other.symbol()
            ))),
        }
    }

    fn rvalue<'e>(&self, expr: &'e Expression) -> Result<&'e Operand> {
        expr.rvalue.as_ref().ok_or_else(|| {
            Error::query_parse(format!("Operator {} requires a right operand", expr.operator.symbol()))
        })
    }

    fn string_literal<'e>(&self, expr: &'e Expression, name: &str) -> Result<&'e str> {
        match self.rvalue(expr)?.as_literal() {
            Some(Literal::String(s)) => Ok(s),
            _ => Err(Error::query_parse(format!(
                "{} requires literal string as right argument: {}",
                name, expr
            ))),
        }
    }

    fn literal_list<'e>(&self, expr: &'e Expression) -> Result<&'e [Literal]> {
        match self.rvalue(expr)? {
            Operand::LiteralList(list) => Ok(list),
            other => Err(Error::query_parse(format!(
                "{} requires a literal list, got {}",
                expr.operator.symbol(),
                other
            ))),
        }
    }

    /// A `DATE(x)` reference may only be compared with `DATE '...'` literals.
    fn check_date_cast(&self, lvalue: &Operand, rvalues: &[impl AsLiteral]) -> Result<()> {
        let Some(Reference { cast: Some(Cast::Date), name }) = lvalue.as_reference() else {
            return Ok(());
        };
        for rvalue in rvalues {
            match rvalue.literal() {
                Some(Literal::Date(d)) if d.only_date => {}
                _ => {
                    return Err(Error::query_parse(format!(
                        "DATE() cast on {} requires a DATE literal",
                        name
                    )));
                }
            }
        }
        Ok(())
    }
}

trait AsLiteral {
    fn literal(&self) -> Option<&Literal>;
}

impl AsLiteral for Literal {
    fn literal(&self) -> Option<&Literal> {
        Some(self)
    }
}

impl AsLiteral for Operand {
    fn literal(&self) -> Option<&Literal> {
        self.as_literal()
    }
}

pub fn literal_value(literal: &Literal) -> StateValue {
    match literal {
        Literal::String(s) => StateValue::String(s.clone()),
        Literal::Boolean(b) => StateValue::Boolean(*b),
        Literal::Integer(v) => StateValue::Long(*v),
        Literal::Double(v) => StateValue::Double(*v),
        Literal::Date(d) => StateValue::Date(d.value),
    }
}

fn cast_to_date(value: StateValue) -> StateValue {
    match value {
        StateValue::Date(d) => StateValue::Date(truncate_to_day(d)),
        StateValue::Array(values) => StateValue::Array(values.into_iter().map(cast_to_date).collect()),
        other => other,
    }
}

fn truncate_to_day(value: DateTime<Utc>) -> DateTime<Utc> {
    value.date_naive().and_time(NaiveTime::MIN).and_utc()
}

fn trim_trailing_slash(path: &str) -> &str {
    if path.len() > 1 { path.strip_suffix('/').unwrap_or(path) } else { path }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::resolver::StaticPathResolver;
    use crate::state::state::State;

    struct MapResolver {
        doc: State,
        resolved: Vec<String>,
    }

    impl ReferenceResolver for MapResolver {
        fn resolve(&mut self, name: &str) -> Result<StateValue> {
            self.resolved.push(name.to_string());
            Ok(self.doc.get(name).cloned().unwrap_or(StateValue::Null))
        }

        fn match_mixin_types(&mut self, mixins: &[String], include: bool) -> Result<Tri> {
            let has = mixins.iter().any(|m| m == "Folderish");
            Ok(Tri::from_bool(has == include))
        }
    }

    fn evaluator() -> ExpressionEvaluator {
        let paths = StaticPathResolver::new().with_path("/ws", "id-ws");
        ExpressionEvaluator::new(EngineConfig::default(), Arc::new(paths))
    }

    fn resolver(pairs: &[(&str, StateValue)]) -> MapResolver {
        MapResolver {
            doc: pairs.iter().cloned().collect(),
            resolved: Vec::new(),
        }
    }

    fn eq(name: &str, value: Operand) -> Expression {
        Expression::new(Operand::reference(name), Operator::Eq, value)
    }

    #[test]
    fn and_evaluates_every_operand() {
        let expr = Expression::and(eq("a", Operand::integer(1)), eq("b", Operand::integer(2)));
        let mut res = resolver(&[("a", 0i64.into())]);
        assert_eq!(evaluator().walk(&expr, &mut res).unwrap(), Tri::False);
        assert_eq!(res.resolved, ["a", "b"]);
    }

    #[test]
    fn path_equality_goes_through_the_path_resolver() {
        let ev = evaluator();
        let mut res = resolver(&[("ecm:uuid", "id-ws".into())]);
        assert_eq!(ev.walk(&eq("ecm:path", Operand::string("/ws/")), &mut res).unwrap(), Tri::True);
        let unknown = Expression::new(Operand::reference("ecm:path"), Operator::NotEq, Operand::string("/nope"));
        assert_eq!(ev.walk(&unknown, &mut res).unwrap(), Tri::True);
        let bad = Expression::new(Operand::reference("ecm:path"), Operator::Like, Operand::string("/ws"));
        assert!(ev.walk(&bad, &mut res).unwrap_err().is_query_parse());
    }

    #[test]
    fn date_cast_requires_date_literal() {
        let expr = Expression::new(
            Operand::Reference(Reference::with_cast("dc:created", Cast::Date)),
            Operator::Eq,
            Operand::string("2024-01-01"),
        );
        let err = evaluator().walk(&expr, &mut resolver(&[])).unwrap_err();
        assert!(err.is_query_parse());
    }

    #[test]
    fn arithmetic_propagates_null_and_division_by_zero() {
        let ev = evaluator();
        let sum = Expression::new(Operand::reference("a"), Operator::Sum, Operand::integer(2));
        let gt = Expression::new(sum.into(), Operator::Gt, Operand::integer(4));
        assert_eq!(ev.walk(&gt, &mut resolver(&[("a", 3i64.into())])).unwrap(), Tri::True);
        assert_eq!(ev.walk(&gt, &mut resolver(&[])).unwrap(), Tri::Unknown);
        let div = Expression::new(Operand::integer(1), Operator::Div, Operand::integer(0));
        let cmp = Expression::new(div.into(), Operator::Eq, Operand::integer(0));
        assert_eq!(ev.walk(&cmp, &mut resolver(&[])).unwrap(), Tri::Unknown);
    }

    #[test]
    fn mixin_tests_use_the_resolver_hook() {
        let ev = evaluator();
        let expr = Expression::new(
            Operand::reference("ecm:mixinType"),
            Operator::NotIn,
            Operand::strings(["Folderish", "Hidden"]),
        );
        assert_eq!(ev.walk(&expr, &mut resolver(&[])).unwrap(), Tri::False);
    }

    #[test]
    fn truncate_keeps_the_day() {
        let ts = DateTime::parse_from_rfc3339("2024-03-05T17:45:00Z").unwrap().with_timezone(&Utc);
        assert_eq!(truncate_to_day(ts).to_rfc3339(), "2024-03-05T00:00:00+00:00");
    }
}
