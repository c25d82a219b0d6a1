//! Indexed collection of circuit groups, validated before any dispatch.

use std::collections::HashMap;

use tracing::debug;

use super::profile::ProfileStore;
use super::types::{CircuitGroup, Parcel};
use crate::error::LoadError;

/// A circuit group declaration as read from the circuit group file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDeclaration {
    pub id: String,
    pub parcel_count: usize,
}

impl GroupDeclaration {
    pub fn new(id: impl Into<String>, parcel_count: usize) -> Self {
        Self {
            id: id.into(),
            parcel_count,
        }
    }
}

/// Circuit groups addressed by dispatch index.
///
/// Storage is sized from the declarations actually loaded. Every group's
/// parcel sequence is complete and matches its declared count, and every
/// parcel usetype resolves in the profile store that validated the pool.
#[derive(Debug, Clone, Default)]
pub struct CircuitGroupPool {
    groups: Vec<CircuitGroup>,
}

impl CircuitGroupPool {
    /// Assembles and validates the pool.
    ///
    /// Parcels keep their input order within each group.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] for duplicate group ids, parcels pointing at
    /// unknown groups, usetypes without a profile, or a declared parcel
    /// count that differs from the parcels loaded.
    pub fn build(
        declarations: Vec<GroupDeclaration>,
        parcels: Vec<Parcel>,
        profiles: &ProfileStore,
    ) -> Result<Self, LoadError> {
        let mut index_of: HashMap<String, usize> = HashMap::with_capacity(declarations.len());
        for (index, decl) in declarations.iter().enumerate() {
            if index_of.insert(decl.id.clone(), index).is_some() {
                return Err(LoadError::DuplicateGroup(decl.id.clone()));
            }
        }

        let mut members: Vec<Vec<Parcel>> = declarations
            .iter()
            .map(|d| Vec::with_capacity(d.parcel_count))
            .collect();

        for parcel in parcels {
            let Some(&index) = index_of.get(&parcel.circuit_group_id) else {
                return Err(LoadError::UnknownGroup {
                    parcel: parcel.id,
                    group: parcel.circuit_group_id,
                });
            };
            if !profiles.contains(&parcel.usetype) {
                return Err(LoadError::MissingProfile {
                    parcel: parcel.id,
                    usetype: parcel.usetype,
                });
            }
            members[index].push(parcel);
        }

        let mut groups = Vec::with_capacity(declarations.len());
        for (decl, parcels) in declarations.into_iter().zip(members) {
            if parcels.len() != decl.parcel_count {
                return Err(LoadError::ParcelCountMismatch {
                    group: decl.id,
                    declared: decl.parcel_count,
                    actual: parcels.len(),
                });
            }
            groups.push(CircuitGroup::new(decl.id, parcels));
        }

        debug!(groups = groups.len(), "circuit group pool validated");
        Ok(Self { groups })
    }

    /// Returns the group at a dispatch index.
    pub fn get(&self, index: usize) -> Option<&CircuitGroup> {
        self.groups.get(index)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total parcels across all groups.
    pub fn parcel_count(&self) -> usize {
        self.groups.iter().map(CircuitGroup::parcel_count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CircuitGroup> {
        self.groups.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::profile::Profile;

    fn profiles() -> ProfileStore {
        ProfileStore::from_profiles([Profile::new("residential", vec![0.5, 0.5])])
            .expect("profiles")
    }

    #[test]
    fn builds_groups_in_declaration_order() {
        let pool = CircuitGroupPool::build(
            vec![GroupDeclaration::new("2", 1), GroupDeclaration::new("1", 2)],
            vec![
                Parcel::new("p1", "residential", "1", 1.0, 2.0),
                Parcel::new("p2", "residential", "2", 1.0, 2.0),
                Parcel::new("p3", "residential", "1", 1.0, 2.0),
            ],
            &profiles(),
        )
        .expect("pool should build");
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.parcel_count(), 3);
        assert_eq!(pool.get(0).map(CircuitGroup::id), Some("2"));
        let group = pool.get(1).expect("second group");
        let ids: Vec<&str> = group.parcels().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p3"]);
    }

    #[test]
    fn empty_group_is_allowed() {
        let pool = CircuitGroupPool::build(vec![GroupDeclaration::new("9", 0)], vec![], &profiles())
            .expect("empty group should build");
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.parcel_count(), 0);
    }

    #[test]
    fn duplicate_group_rejected() {
        let err = CircuitGroupPool::build(
            vec![GroupDeclaration::new("1", 0), GroupDeclaration::new("1", 0)],
            vec![],
            &profiles(),
        );
        assert!(matches!(err, Err(LoadError::DuplicateGroup(ref id)) if id == "1"));
    }

    #[test]
    fn unknown_group_rejected() {
        let err = CircuitGroupPool::build(
            vec![GroupDeclaration::new("1", 0)],
            vec![Parcel::new("p1", "residential", "42", 1.0, 1.0)],
            &profiles(),
        );
        assert!(matches!(err, Err(LoadError::UnknownGroup { ref group, .. }) if group == "42"));
    }

    #[test]
    fn missing_profile_rejected() {
        let err = CircuitGroupPool::build(
            vec![GroupDeclaration::new("1", 1)],
            vec![Parcel::new("p1", "industrial", "1", 1.0, 1.0)],
            &profiles(),
        );
        assert!(
            matches!(err, Err(LoadError::MissingProfile { ref usetype, .. }) if usetype == "industrial")
        );
    }

    #[test]
    fn count_mismatch_rejected() {
        let err = CircuitGroupPool::build(
            vec![GroupDeclaration::new("1", 3)],
            vec![Parcel::new("p1", "residential", "1", 1.0, 1.0)],
            &profiles(),
        );
        assert!(matches!(
            err,
            Err(LoadError::ParcelCountMismatch {
                declared: 3,
                actual: 1,
                ..
            })
        ));
    }
}
