//! Correlated wildcard prefixes.
//!
//! In `files/*1/name = 'a' AND files/*1/size > 10` both clauses must hold
//! for the same element of `files`. The part of a reference up to its last
//! correlated wildcard (`files/*1`) is its prefix; clauses sharing a prefix
//! are grouped into one conjunct so a backend can translate each group as a
//! single element match.

use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use crate::query::ast::{MultiExpression, Operand};
use crate::query::nxql::is_correlated_wildcard;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrefixInfo {
    pub prefix: String,
    pub count: usize,
}

impl PrefixInfo {
    pub fn new(prefix: impl Into<String>, count: usize) -> Self {
        PrefixInfo {
            prefix: prefix.into(),
            count,
        }
    }

    /// Shared prefix if both agree, `""` otherwise; counts add up.
    pub fn combine(self, other: PrefixInfo) -> PrefixInfo {
        let prefix = if self.prefix == other.prefix { self.prefix } else { String::new() };
        PrefixInfo::new(prefix, self.count + other.count)
    }
}

/// Prefix annotation of an expression node and of its expression children,
/// in operand order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotated {
    pub info: PrefixInfo,
    pub children: Vec<Annotated>,
}

/// `foo/*1/bar/*2/baz` -> `foo/*1/bar/*2`, `""` without correlated wildcard.
pub fn correlated_prefix(name: &str) -> &str {
    let mut end = None;
    let mut pos = 0;
    for segment in name.split('/') {
        let segment_end = pos + segment.len();
        if is_correlated_wildcard(segment) {
            end = Some(segment_end);
        }
        pos = segment_end + 1;
    }
    end.map_or("", |e| &name[..e])
}

/// Prefix info of an operand; `None` for literals, which carry no reference.
pub fn operand_info(operand: &Operand) -> Option<PrefixInfo> {
    visit(operand).0
}

/// Builds the annotation tree for an expression operand.
pub fn annotate(operand: &Operand) -> Option<Annotated> {
    visit(operand).1
}

fn visit(operand: &Operand) -> (Option<PrefixInfo>, Option<Annotated>) {
    let children: Vec<&Operand> = match operand {
        Operand::Reference(r) => {
            return (Some(PrefixInfo::new(correlated_prefix(&r.name), 1)), None);
        }
        Operand::Literal(_) | Operand::LiteralList(_) => return (None, None),
        Operand::Function(f) => f.args.iter().collect(),
        Operand::Expression(e) => std::iter::once(&e.lvalue).chain(e.rvalue.as_ref()).collect(),
        Operand::MultiExpression(m) => m.operands.iter().collect(),
    };
    let mut info: Option<PrefixInfo> = None;
    let mut annotated = Vec::new();
    for child in children {
        let (child_info, child_annotated) = visit(child);
        if let Some(child_info) = child_info {
            info = Some(match info {
                None => child_info,
                Some(acc) => acc.combine(child_info),
            });
        }
        annotated.extend(child_annotated);
    }
    match operand {
        Operand::Function(_) => (info, None),
        _ => {
            let node = Annotated {
                info: info.clone().unwrap_or_default(),
                children: annotated,
            };
            (info, Some(node))
        }
    }
}

fn extends(prefix: &str, base: &str) -> bool {
    prefix.len() > base.len() && prefix.starts_with(base) && prefix.as_bytes()[base.len()] == b'/'
}

/// Groups a flat conjunct list by correlated prefix.
///
/// Clauses without prefix stay at top level. When a prefix is extended by
/// exactly one other prefix, that group is nested inside it, so at most two
/// levels are produced. A list whose clauses all share one prefix is
/// returned untouched.
pub fn group_by_prefix(operands: Vec<Operand>) -> Vec<Operand> {
    let prefixes: Vec<String> = operands
        .iter()
        .map(|op| operand_info(op).map(|i| i.prefix).unwrap_or_default())
        .collect();
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<Operand>> = HashMap::new();
    for (operand, prefix) in operands.into_iter().zip(prefixes) {
        groups
            .entry(prefix)
            .or_insert_with_key(|p| {
                order.push(p.clone());
                Vec::new()
            })
            .push(operand);
    }
    if order.len() <= 1 {
        return groups.into_values().flatten().collect();
    }

    let mut parent_of: HashMap<&str, &str> = HashMap::new();
    for base in order.iter().filter(|p| !p.is_empty()) {
        let mut extensions = order.iter().filter(|p| extends(p, base));
        if let (Some(only), None) = (extensions.next(), extensions.next()) {
            parent_of.entry(only.as_str()).or_insert(base.as_str());
        }
    }
    let mut child_of: HashMap<String, String> = HashMap::new();
    for (child, parent) in &parent_of {
        child_of.insert(parent.to_string(), child.to_string());
    }

    let mut result = Vec::new();
    for prefix in &order {
        if parent_of.contains_key(prefix.as_str()) {
            continue;
        }
        let mut members = groups.remove(prefix).unwrap_or_default();
        if prefix.is_empty() {
            result.extend(members);
            continue;
        }
        if let Some(child) = child_of.get(prefix) {
            let nested = groups.remove(child).unwrap_or_default();
            members.push(conjunction(nested));
        }
        result.push(conjunction(members));
    }
    result
}

fn conjunction(mut operands: Vec<Operand>) -> Operand {
    if operands.len() == 1 {
        if let Some(single) = operands.pop() {
            return single;
        }
    }
    Operand::MultiExpression(MultiExpression::and(operands))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ast::{Expression, Operator};

    fn eq(name: &str) -> Operand {
        Expression::new(Operand::reference(name), Operator::Eq, Operand::string("v")).into()
    }

    #[test]
    fn prefix_ends_at_last_correlated_wildcard() {
        assert_eq!(correlated_prefix("files/*1/name"), "files/*1");
        assert_eq!(correlated_prefix("a/*1/b/*2/c"), "a/*1/b/*2");
        assert_eq!(correlated_prefix("a/*/b"), "");
        assert_eq!(correlated_prefix("dc:title"), "");
    }

    #[test]
    fn infos_combine() {
        let both = MultiExpression::and(vec![eq("f/*1/a"), eq("f/*1/b")]).into();
        assert_eq!(operand_info(&both), Some(PrefixInfo::new("f/*1", 2)));
        let mixed = MultiExpression::and(vec![eq("f/*1/a"), eq("title")]).into();
        assert_eq!(operand_info(&mixed), Some(PrefixInfo::new("", 2)));
        let annotated = annotate(&mixed).unwrap();
        assert_eq!(annotated.children.len(), 2);
        assert_eq!(annotated.children[0].info, PrefixInfo::new("f/*1", 1));
    }

    #[test]
    fn single_prefix_is_not_grouped() {
        let ops = vec![eq("f/*1/a"), eq("f/*1/b")];
        assert_eq!(group_by_prefix(ops.clone()), ops);
    }

    #[test]
    fn groups_and_nests() {
        let ops = vec![
            eq("title"),
            eq("files/*1/name"),
            eq("files/*1/tags/*2/label"),
            eq("other/*3/x"),
            eq("files/*1/size"),
        ];
        let grouped = group_by_prefix(ops);
        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped[0], eq("title"));
        let expected_files: Operand = MultiExpression::and(vec![
            eq("files/*1/name"),
            eq("files/*1/size"),
            eq("files/*1/tags/*2/label"),
        ])
        .into();
        assert_eq!(grouped[1], expected_files);
        assert_eq!(grouped[2], eq("other/*3/x"));
    }
}
