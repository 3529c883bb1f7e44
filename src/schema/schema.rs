use std::collections::{BTreeMap, BTreeSet};
use serde::{Serialize, Deserialize};
use crate::core::error::{Error, ErrorKind, Result};

/// Document type knowledge the query layer needs but does not own.
pub trait TypeRegistry: Send + Sync {
    /// Every registered document type.
    fn all_types(&self) -> BTreeSet<String>;

    /// The type itself and all of its descendants, `None` for an unknown type.
    fn subtypes_of(&self, type_name: &str) -> Option<BTreeSet<String>>;

    /// Types declaring `facet` statically.
    fn types_with_facet(&self, facet: &str) -> BTreeSet<String>;

    /// Facets declared by the type (including inherited ones).
    fn type_facets(&self, type_name: &str) -> BTreeSet<String>;

    /// Whether documents never receive `facet` per instance, so that a mixin
    /// test can be answered by primary type alone.
    fn is_no_per_instance_facet(&self, facet: &str) -> bool;
}

/// Document type definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTypeDef {
    pub name: String,
    pub parent: Option<String>,
    #[serde(default)]
    pub facets: BTreeSet<String>,
}

impl DocumentTypeDef {
    pub fn new(name: &str) -> Self {
        DocumentTypeDef {
            name: name.to_string(),
            parent: None,
            facets: BTreeSet::new(),
        }
    }

    pub fn extends(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    pub fn with_facet(mut self, facet: &str) -> Self {
        self.facets.insert(facet.to_string());
        self
    }
}

/// In-memory type hierarchy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaRegistry {
    types: BTreeMap<String, DocumentTypeDef>,
    no_per_instance_facets: BTreeSet<String>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        SchemaRegistry::default()
    }

    /// Registers a type; its parent must already be known.
    pub fn add_type(mut self, def: DocumentTypeDef) -> Result<Self> {
        if let Some(parent) = &def.parent {
            if !self.types.contains_key(parent) {
                return Err(Error::new(
                    ErrorKind::InvalidArgument,
                    format!("Type '{}' extends unknown type '{}'", def.name, parent),
                ));
            }
        }
        self.types.insert(def.name.clone(), def);
        Ok(self)
    }

    pub fn add_no_per_instance_facet(mut self, facet: &str) -> Self {
        self.no_per_instance_facets.insert(facet.to_string());
        self
    }

    pub fn get(&self, type_name: &str) -> Option<&DocumentTypeDef> {
        self.types.get(type_name)
    }

    fn is_subtype(&self, type_name: &str, ancestor: &str) -> bool {
        let mut current = Some(type_name);
        while let Some(name) = current {
            if name == ancestor {
                return true;
            }
            current = self.types.get(name).and_then(|t| t.parent.as_deref());
        }
        false
    }
}

impl TypeRegistry for SchemaRegistry {
    fn all_types(&self) -> BTreeSet<String> {
        self.types.keys().cloned().collect()
    }

    fn subtypes_of(&self, type_name: &str) -> Option<BTreeSet<String>> {
        if !self.types.contains_key(type_name) {
            return None;
        }
        Some(
            self.types
                .keys()
                .filter(|name| self.is_subtype(name, type_name))
                .cloned()
                .collect(),
        )
    }

    fn types_with_facet(&self, facet: &str) -> BTreeSet<String> {
        self.types
            .keys()
            .filter(|name| self.type_facets(name).contains(facet))
            .cloned()
            .collect()
    }

    fn type_facets(&self, type_name: &str) -> BTreeSet<String> {
        let mut facets = BTreeSet::new();
        let mut current = self.types.get(type_name);
        while let Some(def) = current {
            facets.extend(def.facets.iter().cloned());
            current = def.parent.as_deref().and_then(|p| self.types.get(p));
        }
        facets
    }

    fn is_no_per_instance_facet(&self, facet: &str) -> bool {
        self.no_per_instance_facets.contains(facet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new()
            .add_type(DocumentTypeDef::new("Document")).unwrap()
            .add_type(DocumentTypeDef::new("Folder").extends("Document").with_facet("Folderish")).unwrap()
            .add_type(DocumentTypeDef::new("Workspace").extends("Folder")).unwrap()
            .add_type(DocumentTypeDef::new("File").extends("Document")).unwrap()
            .add_no_per_instance_facet("Folderish")
    }

    #[test]
    fn subtypes_include_the_type_itself() {
        let reg = registry();
        let folders = reg.subtypes_of("Folder").unwrap();
        assert_eq!(folders.into_iter().collect::<Vec<_>>(), ["Folder", "Workspace"]);
        assert!(reg.subtypes_of("Nope").is_none());
    }

    #[test]
    fn facets_are_inherited() {
        let reg = registry();
        assert!(reg.type_facets("Workspace").contains("Folderish"));
        assert_eq!(reg.types_with_facet("Folderish").len(), 2);
        assert!(reg.is_no_per_instance_facet("Folderish"));
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let err = SchemaRegistry::new().add_type(DocumentTypeDef::new("X").extends("Y")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }
}
