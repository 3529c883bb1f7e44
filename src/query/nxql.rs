//! Reserved NXQL names.

pub const ECM_PREFIX: &str = "ecm:";
pub const ECM_UUID: &str = "ecm:uuid";
pub const ECM_PATH: &str = "ecm:path";
pub const ECM_ANCESTOR_ID: &str = "ecm:ancestorId";
pub const ECM_PRIMARY_TYPE: &str = "ecm:primaryType";
pub const ECM_MIXIN_TYPE: &str = "ecm:mixinType";
pub const ECM_IS_TRASHED: &str = "ecm:isTrashed";
pub const ECM_LIFECYCLE_STATE: &str = "ecm:currentLifeCycleState";
pub const ECM_FULLTEXT: &str = "ecm:fulltext";
pub const ECM_FULLTEXT_JOBID: &str = "ecm:fulltextJobId";

// Stored-only names, never written by query authors.
pub const ECM_ANCESTOR_IDS: &str = "ecm:__ancestorIds";
pub const ECM_FULLTEXT_SIMPLE: &str = "ecm:__fulltextSimple";
pub const ECM_FULLTEXT_BINARY: &str = "ecm:__fulltextBinary";

pub const DELETED_STATE: &str = "deleted";

/// FROM type meaning "any document type".
pub const TYPE_DOCUMENT: &str = "Document";

/// Type name that no document has; an emptied type set becomes this.
pub const TYPE_NO_SUCH: &str = "__NOSUCHTYPE__";

/// Secondary fulltext index reference such as `ecm:fulltext.dc:title`,
/// returning the targeted property.
pub fn fulltext_property(name: &str) -> Option<&str> {
    name.strip_prefix(ECM_FULLTEXT)?.strip_prefix('.')
}

pub fn is_fulltext(name: &str) -> bool {
    name == ECM_FULLTEXT || fulltext_property(name).is_some()
}

/// Whether a path segment is a wildcard, correlated (`*1`) or not (`*`).
pub fn is_wildcard(segment: &str) -> bool {
    segment
        .strip_prefix('*')
        .is_some_and(|rest| rest.chars().all(|c| c.is_ascii_digit()))
}

pub fn is_correlated_wildcard(segment: &str) -> bool {
    segment.len() > 1 && is_wildcard(segment)
}
