use super::resource::{RemoteRecord, Resource};
use crate::models::{Doctor, ModelError, RecordId};

pub type DoctorsApi<'a> = Resource<'a, Doctor>;

impl RemoteRecord for Doctor {
    const PATH: &'static str = "/medicos";
    const KIND: &'static str = "doctor";

    fn id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    fn validate(&self) -> Result<(), ModelError> {
        Doctor::validate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock_server::MockBackend;
    use crate::api::{ApiClient, ApiError};
    use crate::config::ApiConfig;
    use crate::session::tests::test_session;
    use axum::http::Method;
    use serde_json::json;

    #[tokio::test]
    async fn list_and_view_doctors() {
        let backend = MockBackend::start().await;
        backend.reply(
            Method::GET,
            "/medicos",
            200,
            json!([{"id": 1, "nombre": "Ana", "especialidad": "Cardiología"}]),
        );
        backend.reply(
            Method::GET,
            "/medicos/view",
            200,
            json!({"id": 1, "nombre": "Ana", "telefonoMovil": "555"}),
        );
        let client = ApiClient::new(&ApiConfig::new(&backend.base_url(), 5)).unwrap();
        let session = test_session();
        let api = DoctorsApi::new(&client, &session);

        let all = api.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].specialty, "Cardiología");

        let one = api.view(&RecordId::Number(1)).await.unwrap();
        assert_eq!(one.mobile_phone, "555");
        assert_eq!(backend.requests()[1].id(), Some("1"));
    }

    #[tokio::test]
    async fn create_validates_before_sending() {
        let backend = MockBackend::start().await;
        let client = ApiClient::new(&ApiConfig::new(&backend.base_url(), 5)).unwrap();
        let session = test_session();

        let err = DoctorsApi::new(&client, &session)
            .create(&Doctor::new("", "General"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Invalid(ModelError::MissingField("nombre"))));
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn update_and_delete_use_id_query() {
        let backend = MockBackend::start().await;
        backend.reply(Method::PUT, "/medicos/update", 200, json!({"id": 4}));
        backend.reply(Method::DELETE, "/medicos/delete", 200, json!({"message": "ok"}));
        let client = ApiClient::new(&ApiConfig::new(&backend.base_url(), 5)).unwrap();
        let session = test_session();
        let api = DoctorsApi::new(&client, &session);
        let id = RecordId::Number(4);

        let mut doctor = Doctor::new("Luis", "Pediatría");
        doctor.email = "luis@clinica.mx".into();
        api.update(&id, &doctor).await.unwrap();
        api.delete(&id).await.unwrap();

        let reqs = backend.requests();
        assert_eq!(reqs[0].method, Method::PUT);
        assert_eq!(reqs[0].body.as_ref().unwrap()["email"], "luis@clinica.mx");
        assert_eq!(reqs[1].method, Method::DELETE);
        assert!(reqs.iter().all(|r| r.id() == Some("4")));
    }
}
