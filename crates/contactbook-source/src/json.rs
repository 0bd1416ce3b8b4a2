use crate::source::ContactSource;
use crate::Result;
use contactbook_core::{AuthStatus, RawContact};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// On-disk dump of a contact store:
///
/// ```json
/// { "authStatus": "authorized", "me": { ... }, "contacts": [ ... ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContactSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_status: Option<AuthStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub me: Option<RawContact>,
    #[serde(default)]
    pub contacts: Vec<RawContact>,
}

/// Contacts read from a [`ContactSnapshot`] file. The file is re-read on every
/// call.
#[derive(Debug, Clone)]
pub struct JsonSnapshotSource {
    pub path: PathBuf,
}

impl JsonSnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<ContactSnapshot> {
        debug!(path = %self.path.display(), "reading contact snapshot");
        let data = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

impl ContactSource for JsonSnapshotSource {
    fn source_name(&self) -> &'static str {
        "json-snapshot"
    }

    fn request_auth_status(&self) -> Result<AuthStatus> {
        self.get_auth_status()
    }

    fn get_auth_status(&self) -> Result<AuthStatus> {
        Ok(self.load()?.auth_status.unwrap_or(AuthStatus::Authorized))
    }

    fn get_all_contacts(&self) -> Result<Vec<RawContact>> {
        Ok(self.load()?.contacts)
    }

    fn get_me(&self) -> Result<RawContact> {
        Ok(self.load()?.me.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SourceError;
    use contactbook_core::ContactId;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn write_snapshot(temp: &TempDir, contents: &str) -> JsonSnapshotSource {
        let path = temp.path().join("contacts.json");
        fs::write(&path, contents).expect("write snapshot");
        JsonSnapshotSource::new(path)
    }

    #[test]
    fn snapshot_source_reads_contacts_and_defaults() {
        let temp = TempDir::new().expect("tempdir");
        let source = write_snapshot(
            &temp,
            r#"{"contacts": [{"id": "a", "firstName": "Ada"}, {"id": "b"}, {"firstName": "NoId"}]}"#,
        );

        assert_eq!(source.get_auth_status().unwrap(), AuthStatus::Authorized);
        assert!(source.get_me().unwrap().is_empty());
        assert_eq!(source.get_all_contacts().unwrap().len(), 3);

        let ids = source.get_all_contact_ids().unwrap();
        assert_eq!(ids.len(), 2);
        let found = source
            .get_contact_by_id(&ContactId::from_str("a").unwrap())
            .unwrap()
            .expect("contact");
        assert_eq!(found.first_name.as_deref(), Some("Ada"));
        assert!(source
            .get_contact_by_id(&ContactId::from_str("zzz").unwrap())
            .unwrap()
            .is_none());
    }

    #[test]
    fn snapshot_source_reads_status_and_me() {
        let temp = TempDir::new().expect("tempdir");
        let source = write_snapshot(
            &temp,
            r#"{"authStatus": "denied", "me": {"firstName": "Me"}, "contacts": []}"#,
        );
        assert_eq!(source.request_auth_status().unwrap(), AuthStatus::Denied);
        assert_eq!(source.get_me().unwrap().first_name.as_deref(), Some("Me"));
    }

    #[test]
    fn snapshot_source_rejects_non_string_labels() {
        let temp = TempDir::new().expect("tempdir");
        let source = write_snapshot(
            &temp,
            r#"{"contacts": [{"emails": [{"type": 7, "value": "x@example.com"}]}]}"#,
        );
        let err = source.get_all_contacts().unwrap_err();
        assert!(matches!(err, SourceError::Json(_)));
    }

    #[test]
    fn snapshot_source_reports_missing_file() {
        let temp = TempDir::new().expect("tempdir");
        let source = JsonSnapshotSource::new(temp.path().join("missing.json"));
        assert!(matches!(
            source.get_all_contacts().unwrap_err(),
            SourceError::Io(_)
        ));
    }
}
