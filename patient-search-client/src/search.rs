use crate::{Error, Patient};
use async_trait::async_trait;
use std::sync::Arc;

/// The remote lookup the cache fronts: patients whose family name matches.
///
/// Implementations report any transport problem as [`Error::RemoteCall`];
/// the caller does not look further into the failure.
#[async_trait]
pub trait PatientSearch: Send + Sync {
    async fn search(&self, family_name: &str) -> Result<Vec<Patient>, Error>;
}

#[async_trait]
impl<T: PatientSearch + ?Sized> PatientSearch for Arc<T> {
    async fn search(&self, family_name: &str) -> Result<Vec<Patient>, Error> {
        (**self).search(family_name).await
    }
}
