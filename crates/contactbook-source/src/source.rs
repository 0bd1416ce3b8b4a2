use crate::Result;
use contactbook_core::{AuthStatus, ContactId, RawContact};

/// A store of contacts, e.g. the platform address book or an exported file.
///
/// Implementations hand back records untouched; decoding happens in
/// [`ContactBook`](crate::ContactBook).
pub trait ContactSource {
    fn source_name(&self) -> &'static str;

    /// Asks for access, prompting the user if the platform does so.
    fn request_auth_status(&self) -> Result<AuthStatus>;

    fn get_auth_status(&self) -> Result<AuthStatus>;

    fn get_all_contacts(&self) -> Result<Vec<RawContact>>;

    /// The user's own card. An empty record means none is configured.
    fn get_me(&self) -> Result<RawContact>;

    fn get_all_contact_ids(&self) -> Result<Vec<ContactId>> {
        Ok(self
            .get_all_contacts()?
            .into_iter()
            .filter_map(|contact| contact.id)
            .collect())
    }

    fn get_contact_by_id(&self, id: &ContactId) -> Result<Option<RawContact>> {
        Ok(self
            .get_all_contacts()?
            .into_iter()
            .find(|contact| contact.id.as_ref() == Some(id)))
    }
}

impl<S: ContactSource + ?Sized> ContactSource for Box<S> {
    fn source_name(&self) -> &'static str {
        (**self).source_name()
    }

    fn request_auth_status(&self) -> Result<AuthStatus> {
        (**self).request_auth_status()
    }

    fn get_auth_status(&self) -> Result<AuthStatus> {
        (**self).get_auth_status()
    }

    fn get_all_contacts(&self) -> Result<Vec<RawContact>> {
        (**self).get_all_contacts()
    }

    fn get_me(&self) -> Result<RawContact> {
        (**self).get_me()
    }

    fn get_all_contact_ids(&self) -> Result<Vec<ContactId>> {
        (**self).get_all_contact_ids()
    }

    fn get_contact_by_id(&self, id: &ContactId) -> Result<Option<RawContact>> {
        (**self).get_contact_by_id(id)
    }
}
