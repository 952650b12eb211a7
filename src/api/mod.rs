//! Typed client for the MiSalud REST backend.
//!
//! Every call is a single request/response over HTTPS with a bearer
//! token. Collections live under the configured base URL (`.../v1`):
//! `/medicamentos`, `/medicos`, `/agenda`, `/citas` and `/users`, plus
//! `/auth/login`.

pub mod agenda;
pub mod appointments;
pub mod auth;
pub mod client;
pub mod doctors;
pub mod error;
pub mod medications;
pub mod resource;
pub mod users;

#[cfg(test)]
pub(crate) mod mock_server;

pub use agenda::AgendaApi;
pub use appointments::AppointmentsApi;
pub use client::ApiClient;
pub use doctors::DoctorsApi;
pub use error::ApiError;
pub use medications::{MedicationRepository, MedicationsApi, MockMedicationRepository, RepoCall};
pub use resource::{RemoteRecord, Resource};
pub use users::UsersApi;

use crate::session::Session;

/// A client bound to a signed-in session.
pub struct Backend {
    client: ApiClient,
    session: Session,
}

impl Backend {
    pub fn new(client: ApiClient, session: Session) -> Self {
        Self { client, session }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn medications(&self) -> MedicationsApi<'_> {
        MedicationsApi::new(&self.client, &self.session)
    }

    pub fn doctors(&self) -> DoctorsApi<'_> {
        DoctorsApi::new(&self.client, &self.session)
    }

    pub fn agenda(&self) -> AgendaApi<'_> {
        AgendaApi::new(&self.client, &self.session)
    }

    pub fn appointments(&self) -> AppointmentsApi<'_> {
        AppointmentsApi::new(&self.client, &self.session)
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(&self.client, &self.session)
    }
}
