use super::resource::{RemoteRecord, Resource};
use crate::models::{Appointment, ModelError, RecordId};

pub type AppointmentsApi<'a> = Resource<'a, Appointment>;

impl RemoteRecord for Appointment {
    const PATH: &'static str = "/citas";
    const KIND: &'static str = "appointment";

    fn id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    fn validate(&self) -> Result<(), ModelError> {
        Appointment::validate(self)
    }
}
