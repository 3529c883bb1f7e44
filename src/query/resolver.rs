use std::collections::{BTreeSet, HashMap};
use crate::core::error::Result;
use crate::query::nxql;
use crate::query::tri::Tri;
use crate::schema::schema::TypeRegistry;
use crate::state::state::State;
use crate::state::value::StateValue;

/// Supplies property values for one document or row.
///
/// Resolution may have side effects visible to the caller (dependency
/// tracking), hence `&mut self`.
pub trait ReferenceResolver {
    /// Value of a reference, `Null` when absent. Wildcard references yield an
    /// `Array` of every matching value.
    fn resolve(&mut self, name: &str) -> Result<StateValue>;

    /// Whether the document has any of `mixins` (`include`) or none of them
    /// (`!include`).
    fn match_mixin_types(&mut self, mixins: &[String], include: bool) -> Result<Tri>;
}

/// Hierarchical path to document id resolution.
pub trait PathResolver: Send + Sync {
    fn get_id_for_path(&self, path: &str) -> Option<String>;
}

/// Fixed path table.
#[derive(Debug, Clone, Default)]
pub struct StaticPathResolver {
    paths: HashMap<String, String>,
}

impl StaticPathResolver {
    pub fn new() -> Self {
        StaticPathResolver::default()
    }

    pub fn with_path(mut self, path: &str, id: &str) -> Self {
        self.paths.insert(path.to_string(), id.to_string());
        self
    }
}

impl PathResolver for StaticPathResolver {
    fn get_id_for_path(&self, path: &str) -> Option<String> {
        self.paths.get(path).cloned()
    }
}

enum Node<'a> {
    Value(&'a StateValue),
    State(&'a State),
}

/// Resolves references against a stored document.
///
/// System properties are stored under their NXQL names (`ecm:uuid`,
/// `ecm:primaryType`, `ecm:__ancestorIds`, ...). Per-instance mixins live in
/// an `ecm:mixinType` array; resolving `ecm:mixinType` adds the facets of the
/// primary type.
pub struct StateReferenceResolver<'a> {
    doc: &'a State,
    types: &'a dyn TypeRegistry,
}

impl<'a> StateReferenceResolver<'a> {
    pub fn new(doc: &'a State, types: &'a dyn TypeRegistry) -> Self {
        StateReferenceResolver { doc, types }
    }

    fn mixins(&self) -> BTreeSet<String> {
        let mut mixins = self
            .doc
            .get(nxql::ECM_PRIMARY_TYPE)
            .and_then(StateValue::as_str)
            .map(|t| self.types.type_facets(t))
            .unwrap_or_default();
        if let Some(values) = self.doc.get(nxql::ECM_MIXIN_TYPE).and_then(StateValue::as_array) {
            mixins.extend(values.iter().filter_map(StateValue::as_str).map(String::from));
        }
        mixins
    }

    fn resolve_path(&self, name: &str) -> StateValue {
        let mut segments = name.split('/');
        let Some(first) = segments.next() else {
            return StateValue::Null;
        };
        let mut nodes: Vec<Node<'a>> = self.doc.get(first).map(Node::Value).into_iter().collect();
        let mut multi = false;

        for segment in segments {
            let wildcard = nxql::is_wildcard(segment);
            let index = segment.parse::<usize>().ok();
            multi |= wildcard;
            let mut next = Vec::new();
            for node in nodes {
                match node {
                    Node::State(state) => next.extend(state.get(segment).map(Node::Value)),
                    Node::Value(StateValue::State(state)) => {
                        next.extend(state.get(segment).map(Node::Value))
                    }
                    Node::Value(StateValue::List(states)) => {
                        if wildcard {
                            next.extend(states.iter().map(Node::State));
                        } else if let Some(i) = index {
                            next.extend(states.get(i).map(Node::State));
                        }
                    }
                    Node::Value(StateValue::Array(values)) => {
                        if wildcard {
                            next.extend(values.iter().map(Node::Value));
                        } else if let Some(i) = index {
                            next.extend(values.get(i).map(Node::Value));
                        }
                    }
                    Node::Value(_) => {}
                }
            }
            nodes = next;
        }

        if !multi {
            return match nodes.into_iter().next() {
                Some(Node::Value(value)) => value.clone(),
                Some(Node::State(state)) => StateValue::State(state.clone()),
                None => StateValue::Null,
            };
        }
        let mut values = Vec::new();
        for node in nodes {
            match node {
                Node::Value(StateValue::Array(items)) => {
                    values.extend(items.iter().filter(|v| !v.is_null()).cloned())
                }
                Node::Value(value) if value.is_scalar() => values.push(value.clone()),
                _ => {}
            }
        }
        StateValue::Array(values)
    }
}

impl ReferenceResolver for StateReferenceResolver<'_> {
    fn resolve(&mut self, name: &str) -> Result<StateValue> {
        if name == nxql::ECM_MIXIN_TYPE {
            let mixins = self.mixins();
            return Ok(StateValue::array(mixins));
        }
        Ok(self.resolve_path(name))
    }

    fn match_mixin_types(&mut self, mixins: &[String], include: bool) -> Result<Tri> {
        let present = self.mixins();
        let matched = mixins.iter().any(|m| present.contains(m));
        Ok(Tri::from_bool(matched == include))
    }
}
