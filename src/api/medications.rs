//! Medication records on the backend (`/medicamentos`).
//!
//! Controllers talk to the [`MedicationRepository`] trait; the HTTP
//! implementation is [`MedicationsApi`] and [`MockMedicationRepository`]
//! keeps everything in memory.

use std::future::Future;
use std::sync::Mutex;

use super::{ApiClient, ApiError};
use crate::models::{Medication, ModelError, RecordId};
use crate::session::Session;

const BASE: &str = "/medicamentos";

/// Medication persistence as seen by the wizard, the editor and the
/// schedule. One call, one request: no retries.
pub trait MedicationRepository {
    /// POST a finished draft. The returned record replaces the draft.
    fn create(
        &self,
        medication: &Medication,
    ) -> impl Future<Output = Result<Medication, ApiError>> + Send;

    fn list(&self) -> impl Future<Output = Result<Vec<Medication>, ApiError>> + Send;

    /// Packaging view of one medication (no guarantee doses are included).
    fn fetch(&self, id: &RecordId) -> impl Future<Output = Result<Medication, ApiError>> + Send;

    /// One medication with its full dose list.
    fn fetch_with_doses(
        &self,
        id: &RecordId,
    ) -> impl Future<Output = Result<Medication, ApiError>> + Send;

    /// PUT the complete record.
    fn update(
        &self,
        id: &RecordId,
        medication: &Medication,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn delete(&self, id: &RecordId) -> impl Future<Output = Result<(), ApiError>> + Send;
}

// ═══════════════════════════════════════════════════════════
// HTTP implementation
// ═══════════════════════════════════════════════════════════

pub struct MedicationsApi<'a> {
    client: &'a ApiClient,
    session: &'a Session,
}

impl<'a> MedicationsApi<'a> {
    pub fn new(client: &'a ApiClient, session: &'a Session) -> Self {
        Self { client, session }
    }
}

impl MedicationRepository for MedicationsApi<'_> {
    async fn create(&self, medication: &Medication) -> Result<Medication, ApiError> {
        if medication.name.trim().is_empty() {
            return Err(ModelError::MissingField("nombre").into());
        }
        let created: Medication = self.client.post(BASE, Some(self.session), medication).await?;
        tracing::info!(
            id = ?created.id.as_ref().map(|i| i.to_string()),
            doses = created.doses.len(),
            "Medication created"
        );
        Ok(created)
    }

    async fn list(&self) -> Result<Vec<Medication>, ApiError> {
        self.client.get(BASE, None, self.session).await
    }

    async fn fetch(&self, id: &RecordId) -> Result<Medication, ApiError> {
        self.client
            .get(&format!("{BASE}/empaque"), Some(id), self.session)
            .await
    }

    async fn fetch_with_doses(&self, id: &RecordId) -> Result<Medication, ApiError> {
        self.client
            .get(&format!("{BASE}/dosis/one"), Some(id), self.session)
            .await
    }

    async fn update(&self, id: &RecordId, medication: &Medication) -> Result<(), ApiError> {
        self.client
            .put(&format!("{BASE}/update"), id, self.session, medication)
            .await?;
        tracing::info!(id = %id, doses = medication.doses.len(), "Medication updated");
        Ok(())
    }

    async fn delete(&self, id: &RecordId) -> Result<(), ApiError> {
        self.client
            .delete(&format!("{BASE}/delete"), id, self.session)
            .await?;
        tracing::info!(id = %id, "Medication deleted");
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// In-memory implementation
// ═══════════════════════════════════════════════════════════

/// A call observed by [`MockMedicationRepository`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoCall {
    Create(Medication),
    List,
    Fetch(RecordId),
    FetchWithDoses(RecordId),
    Update(RecordId, Medication),
    Delete(RecordId),
}

/// In-memory repository for controller tests. Records every call and
/// assigns sequential numeric ids on create.
#[derive(Default)]
pub struct MockMedicationRepository {
    records: Mutex<Vec<Medication>>,
    calls: Mutex<Vec<RepoCall>>,
    fail_status: Option<u16>,
}

impl MockMedicationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Medication>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    /// Every call fails with this HTTP status.
    pub fn failing(status: u16) -> Self {
        Self {
            fail_status: Some(status),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<RepoCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn records(&self) -> Vec<Medication> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn record(&self, call: RepoCall) -> Result<(), ApiError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        match self.fail_status {
            Some(status) => Err(ApiError::Status {
                status,
                body: "mock failure".into(),
            }),
            None => Ok(()),
        }
    }

    fn find(&self, id: &RecordId) -> Result<Medication, ApiError> {
        self.records()
            .into_iter()
            .find(|m| m.id.as_ref() == Some(id))
            .ok_or(ApiError::Status {
                status: 404,
                body: format!("medication {id} not found"),
            })
    }

    fn lock_records(&self) -> Result<std::sync::MutexGuard<'_, Vec<Medication>>, ApiError> {
        self.records
            .lock()
            .map_err(|_| ApiError::HttpClient("mock repository poisoned".into()))
    }
}

impl MedicationRepository for MockMedicationRepository {
    async fn create(&self, medication: &Medication) -> Result<Medication, ApiError> {
        self.record(RepoCall::Create(medication.clone()))?;
        let mut records = self.lock_records()?;
        let mut created = medication.clone();
        created.id = Some(RecordId::Number(records.len() as i64 + 1));
        records.push(created.clone());
        Ok(created)
    }

    async fn list(&self) -> Result<Vec<Medication>, ApiError> {
        self.record(RepoCall::List)?;
        Ok(self.records())
    }

    async fn fetch(&self, id: &RecordId) -> Result<Medication, ApiError> {
        self.record(RepoCall::Fetch(id.clone()))?;
        let mut med = self.find(id)?;
        med.doses.clear();
        Ok(med)
    }

    async fn fetch_with_doses(&self, id: &RecordId) -> Result<Medication, ApiError> {
        self.record(RepoCall::FetchWithDoses(id.clone()))?;
        self.find(id)
    }

    async fn update(&self, id: &RecordId, medication: &Medication) -> Result<(), ApiError> {
        self.record(RepoCall::Update(id.clone(), medication.clone()))?;
        let mut records = self.lock_records()?;
        let slot = records
            .iter_mut()
            .find(|m| m.id.as_ref() == Some(id))
            .ok_or(ApiError::Status {
                status: 404,
                body: format!("medication {id} not found"),
            })?;
        *slot = Medication {
            id: Some(id.clone()),
            ..medication.clone()
        };
        Ok(())
    }

    async fn delete(&self, id: &RecordId) -> Result<(), ApiError> {
        self.record(RepoCall::Delete(id.clone()))?;
        self.lock_records()?.retain(|m| m.id.as_ref() != Some(id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock_server::MockBackend;
    use crate::config::ApiConfig;
    use crate::models::{Dose, MealRelation, Presentation};
    use crate::session::tests::test_session;
    use axum::http::Method;
    use chrono::NaiveTime;
    use serde_json::json;

    fn ibuprofeno() -> Medication {
        let mut med = Medication::draft("Ibuprofeno", Presentation::Pills);
        med.set_doses(vec![Dose::new(
            1,
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            1,
            Some(MealRelation::Before),
        )]);
        med
    }

    fn client_for(backend: &MockBackend) -> ApiClient {
        ApiClient::new(&ApiConfig::new(&backend.base_url(), 5)).unwrap()
    }

    #[tokio::test]
    async fn create_posts_record_with_bearer_token() {
        let backend = MockBackend::start().await;
        backend.reply(
            Method::POST,
            "/medicamentos",
            201,
            json!({"id": 31, "nombre": "Ibuprofeno", "numero_dosis": 1, "dosis": []}),
        );
        let client = client_for(&backend);
        let session = test_session();

        let created = MedicationsApi::new(&client, &session)
            .create(&ibuprofeno())
            .await
            .unwrap();
        assert_eq!(created.id, Some(RecordId::Number(31)));

        let req = backend.single_request();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.authorization.as_deref(), Some("Bearer test-token"));
        let body = req.body.unwrap();
        assert_eq!(body["nombre"], "Ibuprofeno");
        assert_eq!(body["numero_dosis"], 1);
        assert_eq!(body["dosis"][0]["hora_dosis"], "08:00");
    }

    #[tokio::test]
    async fn fetch_variants_hit_their_paths_with_id_query() {
        let backend = MockBackend::start().await;
        let record = json!({"id": 5, "nombre": "Loratadina", "numero_dosis": 0});
        backend.reply(Method::GET, "/medicamentos/empaque", 200, record.clone());
        backend.reply(Method::GET, "/medicamentos/dosis/one", 200, record);
        let client = client_for(&backend);
        let session = test_session();
        let api = MedicationsApi::new(&client, &session);

        api.fetch(&RecordId::Number(5)).await.unwrap();
        api.fetch_with_doses(&RecordId::Number(5)).await.unwrap();

        let reqs = backend.requests();
        assert_eq!(reqs[0].path, "/medicamentos/empaque");
        assert_eq!(reqs[1].path, "/medicamentos/dosis/one");
        assert!(reqs.iter().all(|r| r.id() == Some("5")));
    }

    #[tokio::test]
    async fn list_tolerates_legacy_dose_values() {
        let backend = MockBackend::start().await;
        backend.reply(
            Method::GET,
            "/medicamentos",
            200,
            json!([
                {"id": 1, "nombre": "Amoxicilina", "numero_dosis": 1, "dosis": [
                    {"numero_dosis": 1, "hora_dosis": "08:00 a. m.", "cantidadP": null, "momento_comida": "antes"}
                ]},
                {"id": 2, "nombre": "Loratadina", "numero_dosis": 1, "dosis": [
                    {"numero_dosis": 1, "hora_dosis": "9:00\u{a0}p.\u{a0}m.", "cantidadP": 1, "momento_comida": ""}
                ]}
            ]),
        );
        let client = client_for(&backend);
        let session = test_session();

        let meds = MedicationsApi::new(&client, &session).list().await.unwrap();
        assert_eq!(meds.len(), 2);
        assert_eq!(meds[0].doses[0].quantity, 0);
        assert_eq!(meds[1].doses[0].time_label(), "21:00");
    }

    #[tokio::test]
    async fn update_sends_full_record() {
        let backend = MockBackend::start().await;
        backend.reply(Method::PUT, "/medicamentos/update", 200, json!({"message": "ok"}));
        let client = client_for(&backend);
        let session = test_session();

        let id = RecordId::Text("abc".into());
        MedicationsApi::new(&client, &session)
            .update(&id, &ibuprofeno())
            .await
            .unwrap();

        let req = backend.single_request();
        assert_eq!(req.id(), Some("abc"));
        let body = req.body.unwrap();
        assert_eq!(body["dosis"].as_array().unwrap().len(), 1);
        assert_eq!(body["presentacion"], "Pastillas");
    }

    #[tokio::test]
    async fn server_error_carries_status_and_body() {
        let backend = MockBackend::start().await;
        backend.reply_raw(Method::DELETE, "/medicamentos/delete", 500, "db down");
        let client = client_for(&backend);
        let session = test_session();

        let err = MedicationsApi::new(&client, &session)
            .delete(&RecordId::Number(1))
            .await
            .unwrap_err();
        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "db down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn null_fetch_is_empty_response() {
        let backend = MockBackend::start().await;
        backend.reply_raw(Method::GET, "/medicamentos/dosis/one", 200, "null");
        let client = client_for(&backend);
        let session = test_session();

        let err = MedicationsApi::new(&client, &session)
            .fetch_with_doses(&RecordId::Number(9))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::EmptyResponse));
    }

    #[tokio::test]
    async fn nameless_create_never_reaches_backend() {
        let backend = MockBackend::start().await;
        let client = client_for(&backend);
        let session = test_session();

        let err = MedicationsApi::new(&client, &session)
            .create(&Medication::draft("  ", Presentation::Syrup))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Invalid(_)));
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn mock_repository_assigns_ids_and_updates_in_place() {
        let repo = MockMedicationRepository::new();
        let created = repo.create(&ibuprofeno()).await.unwrap();
        let id = created.id.clone().unwrap();

        let mut changed = created.clone();
        changed.instructions = Some("con agua".into());
        repo.update(&id, &changed).await.unwrap();

        let fetched = repo.fetch_with_doses(&id).await.unwrap();
        assert_eq!(fetched.instructions.as_deref(), Some("con agua"));
        assert!(repo.fetch(&id).await.unwrap().doses.is_empty());

        repo.delete(&id).await.unwrap();
        assert!(repo.records().is_empty());
        assert_eq!(repo.calls().len(), 5);
    }

    #[tokio::test]
    async fn failing_mock_still_records_call() {
        let repo = MockMedicationRepository::failing(503);
        assert_eq!(repo.list().await.unwrap_err().status(), Some(503));
        assert_eq!(repo.calls(), vec![RepoCall::List]);
    }
}
