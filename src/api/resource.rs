//! Shared CRUD shape for the simple backend collections.
//!
//! Doctors, agenda entries and appointments all expose the same verbs:
//! `POST /x`, `GET /x`, `GET /x/view?id=`, `PUT /x/update?id=` and
//! `DELETE /x/delete?id=`.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{ApiClient, ApiError};
use crate::models::{ModelError, RecordId};
use crate::session::Session;

/// A record type stored under one backend collection.
pub trait RemoteRecord: Serialize + DeserializeOwned + Send + Sync {
    /// Collection path, e.g. `/medicos`.
    const PATH: &'static str;
    /// Noun used in log lines.
    const KIND: &'static str;

    fn id(&self) -> Option<&RecordId>;

    /// Local checks run before any request is sent.
    fn validate(&self) -> Result<(), ModelError> {
        Ok(())
    }
}

pub struct Resource<'a, T> {
    client: &'a ApiClient,
    session: &'a Session,
    _record: PhantomData<fn() -> T>,
}

impl<'a, T: RemoteRecord> Resource<'a, T> {
    pub fn new(client: &'a ApiClient, session: &'a Session) -> Self {
        Self {
            client,
            session,
            _record: PhantomData,
        }
    }

    pub async fn create(&self, record: &T) -> Result<T, ApiError> {
        record.validate()?;
        let created: T = self.client.post(T::PATH, Some(self.session), record).await?;
        tracing::info!(
            kind = T::KIND,
            id = ?created.id().map(|i| i.to_string()),
            "Record created"
        );
        Ok(created)
    }

    pub async fn list(&self) -> Result<Vec<T>, ApiError> {
        self.client.get(T::PATH, None, self.session).await
    }

    pub async fn view(&self, id: &RecordId) -> Result<T, ApiError> {
        self.client
            .get(&format!("{}/view", T::PATH), Some(id), self.session)
            .await
    }

    pub async fn update(&self, id: &RecordId, record: &T) -> Result<(), ApiError> {
        record.validate()?;
        self.client
            .put(&format!("{}/update", T::PATH), id, self.session, record)
            .await?;
        tracing::info!(kind = T::KIND, id = %id, "Record updated");
        Ok(())
    }

    pub async fn delete(&self, id: &RecordId) -> Result<(), ApiError> {
        self.client
            .delete(&format!("{}/delete", T::PATH), id, self.session)
            .await?;
        tracing::info!(kind = T::KIND, id = %id, "Record deleted");
        Ok(())
    }
}
