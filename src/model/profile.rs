//! Hourly allocation curves: the shared supply profile and the per-usetype
//! demand profile store.
//!
//! Both are built once during loading and only read afterwards. Workers
//! borrow them directly; there is no runtime synchronization.

use std::collections::HashMap;

use ndarray::{Array1, ArrayView1};

use crate::error::EngineError;

/// Tolerance on the nominal 1.0 sum of an allocation curve.
pub const NOMINAL_SUM_TOLERANCE: f64 = 1e-3;

/// An hourly allocation curve for one usetype.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    usetype: String,
    hourly_fraction: Array1<f64>,
}

impl Profile {
    pub fn new(usetype: impl Into<String>, hourly_fraction: Vec<f64>) -> Self {
        Self {
            usetype: usetype.into(),
            hourly_fraction: Array1::from_vec(hourly_fraction),
        }
    }

    pub fn usetype(&self) -> &str {
        &self.usetype
    }

    /// Fraction of the annual total allocated to each hour.
    pub fn hourly_fraction(&self) -> ArrayView1<'_, f64> {
        self.hourly_fraction.view()
    }

    pub fn hours(&self) -> usize {
        self.hourly_fraction.len()
    }

    /// Returns `true` when the curve sums to 1.0 within [`NOMINAL_SUM_TOLERANCE`].
    pub fn is_normalized(&self) -> bool {
        (self.hourly_fraction.sum() - 1.0).abs() <= NOMINAL_SUM_TOLERANCE
    }
}

/// The single hourly allocation curve applied to every parcel's solar supply.
#[derive(Debug, Clone, PartialEq)]
pub struct SupplyProfile(Array1<f64>);

impl SupplyProfile {
    pub fn new(hourly_fraction: Vec<f64>) -> Self {
        Self(Array1::from_vec(hourly_fraction))
    }

    pub fn hourly_fraction(&self) -> ArrayView1<'_, f64> {
        self.0.view()
    }

    pub fn hours(&self) -> usize {
        self.0.len()
    }
}

/// Immutable mapping from usetype to demand profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileStore {
    profiles: HashMap<String, Profile>,
}

impl ProfileStore {
    /// Builds the store from a complete set of profiles.
    ///
    /// Returns the first usetype that appears twice as the error value.
    pub fn from_profiles(profiles: impl IntoIterator<Item = Profile>) -> Result<Self, String> {
        let mut map = HashMap::new();
        for profile in profiles {
            let key = profile.usetype.clone();
            if map.insert(key.clone(), profile).is_some() {
                return Err(key);
            }
        }
        Ok(Self { profiles: map })
    }

    /// Looks up the demand profile for a usetype.
    ///
    /// # Errors
    ///
    /// A missing usetype is a data-integrity error and aborts the run.
    pub fn lookup(&self, usetype: &str) -> Result<&Profile, EngineError> {
        self.profiles
            .get(usetype)
            .ok_or_else(|| EngineError::MissingProfile(usetype.to_string()))
    }

    pub fn contains(&self, usetype: &str) -> bool {
        self.profiles.contains_key(usetype)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Usetypes in sorted order.
    pub fn usetypes(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn iter(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.values()
    }
}
