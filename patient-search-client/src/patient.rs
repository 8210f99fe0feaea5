use chrono::NaiveDate;
use getset::Getters;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A patient record as returned by a search collaborator.
///
/// Name parts that the remote side did not provide are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Getters)]
#[get = "pub"]
pub struct Patient {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    given_name: String,
    #[serde(default)]
    family_name: String,
    #[serde(default)]
    birth_date: Option<NaiveDate>,
}

impl Patient {
    pub fn new(given_name: impl Into<String>, family_name: impl Into<String>) -> Self {
        Self {
            given_name: given_name.into(),
            family_name: family_name.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub(crate) fn cmp_given_name(&self, other: &Self) -> Ordering {
        self.given_name.cmp(&other.given_name)
    }

    pub(crate) fn cmp_full_name(&self, other: &Self) -> Ordering {
        self.family_name
            .cmp(&other.family_name)
            .then_with(|| self.given_name.cmp(&other.given_name))
    }
}
