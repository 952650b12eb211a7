use super::resource::{RemoteRecord, Resource};
use crate::models::{AgendaEntry, RecordId};

pub type AgendaApi<'a> = Resource<'a, AgendaEntry>;

impl RemoteRecord for AgendaEntry {
    const PATH: &'static str = "/agenda";
    const KIND: &'static str = "agenda entry";

    fn id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }
}
