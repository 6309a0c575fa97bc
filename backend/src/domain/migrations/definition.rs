//! Migration definitions, log records and the ordered registry.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Code-defined, reversible schema change.
///
/// `up` and `down` are executed statement by statement inside one
/// transaction. The name follows the `{timestamp}-{Description}` convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationDefinition {
    pub name: &'static str,
    pub timestamp: i64,
    pub up: &'static [&'static str],
    pub down: &'static [&'static str],
}

impl MigrationDefinition {
    /// Log record written when this migration is applied.
    #[must_use]
    pub fn record(&self) -> MigrationRecord {
        MigrationRecord {
            name: self.name.to_owned(),
            timestamp: self.timestamp,
        }
    }
}

/// Row of the migration log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MigrationRecord {
    #[schema(example = "1722000000000-InitialMigration")]
    pub name: String,
    #[schema(example = 1_722_000_000_000_i64)]
    pub timestamp: i64,
}

/// Errors raised while assembling a [`MigrationRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate migration name: {name}")]
    DuplicateName { name: String },
    #[error("duplicate migration timestamp {timestamp} ({first} and {second})")]
    DuplicateTimestamp {
        timestamp: i64,
        first: String,
        second: String,
    },
}

/// Immutable set of known migrations in ascending timestamp order.
///
/// # Examples
/// ```
/// use qna_backend::domain::migrations::{MigrationDefinition, MigrationRegistry};
///
/// const B: MigrationDefinition = MigrationDefinition { name: "200-B", timestamp: 200, up: &[], down: &[] };
/// const A: MigrationDefinition = MigrationDefinition { name: "100-A", timestamp: 100, up: &[], down: &[] };
///
/// let registry = MigrationRegistry::new(vec![B, A]).expect("unique migrations");
/// let names: Vec<_> = registry.iter().map(|m| m.name).collect();
/// assert_eq!(names, ["100-A", "200-B"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationRegistry {
    definitions: Vec<MigrationDefinition>,
}

impl MigrationRegistry {
    /// Sort `definitions` and reject duplicate names or timestamps.
    pub fn new(mut definitions: Vec<MigrationDefinition>) -> Result<Self, RegistryError> {
        let mut names = HashSet::with_capacity(definitions.len());
        for definition in &definitions {
            if !names.insert(definition.name) {
                return Err(RegistryError::DuplicateName {
                    name: definition.name.to_owned(),
                });
            }
        }

        definitions.sort_by_key(|definition| definition.timestamp);
        let clash = definitions.windows(2).find_map(|pair| match pair {
            [first, second] if first.timestamp == second.timestamp => Some((first, second)),
            _ => None,
        });
        if let Some((first, second)) = clash {
            return Err(RegistryError::DuplicateTimestamp {
                timestamp: first.timestamp,
                first: first.name.to_owned(),
                second: second.name.to_owned(),
            });
        }

        Ok(Self { definitions })
    }

    pub fn iter(&self) -> impl Iterator<Item = &MigrationDefinition> {
        self.definitions.iter()
    }

    pub fn as_slice(&self) -> &[MigrationDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&MigrationDefinition> {
        self.definitions
            .iter()
            .find(|definition| definition.name == name)
    }

    /// Definitions up to and including `name`, or `None` when unknown.
    pub fn up_to(&self, name: &str) -> Option<&[MigrationDefinition]> {
        self.definitions
            .iter()
            .position(|definition| definition.name == name)
            .and_then(|index| self.definitions.get(..=index))
    }
}
