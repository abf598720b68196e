//! Seams to the relation catalog and the relation-naming service.
//!
//! The engine never touches a catalog itself; it consumes a parent relation
//! whose partition key has already been resolved, and asks a naming
//! collaborator to compose and de-duplicate child names. In-memory
//! implementations are provided for tests and for embedders that resolve
//! everything up front.

use partition_types::{Collation, PartType, PartitionStrategy};
use std::collections::HashSet;

/// Identifier length cap applied when composing child names, byte-compatible
/// with NAMEDATALEN-style catalogs.
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// One resolved partition-key column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionKeyColumn {
    pub name: String,
    pub part_type: PartType,
    pub typmod: i32,
    pub collation: Collation,
}

impl PartitionKeyColumn {
    pub fn new(name: impl Into<String>, part_type: PartType) -> Self {
        Self {
            name: name.into(),
            part_type,
            typmod: -1,
            collation: Collation::Default,
        }
    }

    pub fn with_collation(mut self, collation: Collation) -> Self {
        self.collation = collation;
        self
    }
}

/// The resolved partition key of a parent relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionKey {
    pub strategy: PartitionStrategy,
    pub columns: Vec<PartitionKeyColumn>,
}

impl PartitionKey {
    pub fn new(strategy: PartitionStrategy, columns: Vec<PartitionKeyColumn>) -> Self {
        Self { strategy, columns }
    }

    /// A single-column key, the common case.
    pub fn single(strategy: PartitionStrategy, column: PartitionKeyColumn) -> Self {
        Self::new(strategy, vec![column])
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }
}

/// A parent relation as the engine needs to see it: name, resolved key, and
/// position in the partition hierarchy.
pub trait ParentRelation {
    fn name(&self) -> &str;

    fn partition_key(&self) -> &PartitionKey;

    /// Number of partitioning ancestors above this relation. The expansion
    /// level is one greater.
    fn ancestor_count(&self) -> usize;

    /// Tablespace children inherit when their element does not set one.
    fn tablespace(&self) -> Option<&str> {
        None
    }
}

/// A fully resolved parent relation, for embedders that look everything up
/// before invoking the engine.
#[derive(Debug, Clone)]
pub struct ResolvedRelation {
    pub name: String,
    pub key: PartitionKey,
    pub ancestors: usize,
    pub tablespace: Option<String>,
}

impl ResolvedRelation {
    pub fn new(name: impl Into<String>, key: PartitionKey) -> Self {
        Self {
            name: name.into(),
            key,
            ancestors: 0,
            tablespace: None,
        }
    }
}

impl ParentRelation for ResolvedRelation {
    fn name(&self) -> &str {
        &self.name
    }

    fn partition_key(&self) -> &PartitionKey {
        &self.key
    }

    fn ancestor_count(&self) -> usize {
        self.ancestors
    }

    fn tablespace(&self) -> Option<&str> {
        self.tablespace.as_deref()
    }
}

/// Composes child relation names from parent name, level and suffix.
pub trait PartitionNamer {
    /// Compose a name for an explicitly named partition. Not de-duplicated;
    /// a clash with an existing relation surfaces at creation time.
    fn object_name(&mut self, parent: &str, level: &str, suffix: &str) -> String;

    /// Compose a name for an auto-numbered partition, de-duplicated against
    /// relations already in use.
    fn relation_name(&mut self, parent: &str, level: &str, suffix: &str) -> String;
}

/// Namer that tracks the set of taken relation names in memory.
#[derive(Debug, Default)]
pub struct InMemoryNamer {
    used: HashSet<String>,
}

impl InMemoryNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the namer with relation names that already exist.
    pub fn with_existing<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            used: names.into_iter().map(Into::into).collect(),
        }
    }

    fn compose(parent: &str, level: &str, suffix: &str) -> String {
        let mut name = format!("{parent}_{level}_{suffix}");
        while name.len() > MAX_IDENTIFIER_LEN {
            name.pop();
        }
        name
    }
}

impl PartitionNamer for InMemoryNamer {
    fn object_name(&mut self, parent: &str, level: &str, suffix: &str) -> String {
        Self::compose(parent, level, suffix)
    }

    fn relation_name(&mut self, parent: &str, level: &str, suffix: &str) -> String {
        let mut pass = 0;
        let mut label = suffix.to_owned();
        loop {
            let candidate = Self::compose(parent, level, &label);
            if !self.used.contains(&candidate) {
                self.used.insert(candidate.clone());
                return candidate;
            }
            pass += 1;
            label = format!("{suffix}{pass}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namer_dedups_against_existing_relations() {
        let mut namer = InMemoryNamer::with_existing(["sales_1_prt_2"]);
        assert_eq!(namer.relation_name("sales", "1", "prt_1"), "sales_1_prt_1");
        assert_eq!(namer.relation_name("sales", "1", "prt_2"), "sales_1_prt_21");
    }

    #[test]
    fn object_name_is_not_deduplicated() {
        let mut namer = InMemoryNamer::with_existing(["sales_1_prt_jan"]);
        assert_eq!(
            namer.object_name("sales", "1", "prt_jan"),
            "sales_1_prt_jan"
        );
    }

    #[test]
    fn long_names_are_truncated() {
        let mut namer = InMemoryNamer::new();
        let parent = "p".repeat(80);
        let name = namer.relation_name(&parent, "1", "prt_1");
        assert_eq!(name.len(), MAX_IDENTIFIER_LEN);
    }
}
