use crate::source::ContactSource;
use crate::Result;
use contactbook_core::{contact_object, AuthStatus, ContactId, ContactRecord, RawContact};
use tracing::debug;

/// Normalizing front for a [`ContactSource`].
#[derive(Debug, Clone)]
pub struct ContactBook<S> {
    source: S,
}

impl<S: ContactSource> ContactBook<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn request_auth_status(&self) -> Result<AuthStatus> {
        self.source.request_auth_status()
    }

    pub fn get_auth_status(&self) -> Result<AuthStatus> {
        self.source.get_auth_status()
    }

    pub fn get_all_contact_ids(&self) -> Result<Vec<ContactId>> {
        self.source.get_all_contact_ids()
    }

    /// Raw record for `id`, not normalized.
    pub fn get_contact_by_id(&self, id: &ContactId) -> Result<Option<RawContact>> {
        self.source.get_contact_by_id(id)
    }

    pub fn get_all_contacts(&self) -> Result<Vec<ContactRecord>> {
        let raw = self.source.get_all_contacts()?;
        debug!(
            source = self.source.source_name(),
            count = raw.len(),
            "normalizing contacts"
        );
        Ok(raw.iter().map(contact_object).collect())
    }

    /// The user's own card, or `None` when the source has no such card.
    pub fn get_me(&self) -> Result<Option<ContactRecord>> {
        let me = self.source.get_me()?;
        if me.is_empty() {
            debug!(source = self.source.source_name(), "no me card");
            return Ok(None);
        }
        Ok(Some(contact_object(&me)))
    }
}
