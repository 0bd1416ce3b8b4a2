use crate::error::CoreError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Opaque identifier assigned by the contact store, e.g.
/// `410FE041-5C4E-48DA-B4DE-04C15EA3DBAC:ABPerson` on macOS.
///
/// Some stores hand out integer ids; those serialize back as integers.
/// Equality only looks at the textual form, so `"1"` and `1` name the same
/// contact.
#[derive(Debug, Clone)]
pub struct ContactId {
    raw: String,
    number: Option<i64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Number(i64),
    Text(String),
}

impl ContactId {
    pub fn new(raw: impl Into<String>) -> Result<Self, CoreError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(CoreError::EmptyContactId);
        }
        Ok(Self { raw, number: None })
    }

    pub fn from_number(value: i64) -> Self {
        Self {
            raw: value.to_string(),
            number: Some(value),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_numeric(&self) -> bool {
        self.number.is_some()
    }
}

impl PartialEq for ContactId {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for ContactId {}

impl Hash for ContactId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for ContactId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ContactId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.number {
            Some(value) => serializer.serialize_i64(value),
            None => serializer.serialize_str(&self.raw),
        }
    }
}

impl<'de> Deserialize<'de> for ContactId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match IdRepr::deserialize(deserializer)? {
            IdRepr::Number(value) => Ok(Self::from_number(value)),
            IdRepr::Text(raw) => Self::new(raw).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ContactId;
    use crate::error::CoreError;
    use std::str::FromStr;

    #[test]
    fn contact_id_is_carried_unmodified() {
        let id = ContactId::new(" ABC:ABPerson").expect("id");
        assert_eq!(id.as_str(), " ABC:ABPerson");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\" ABC:ABPerson\"");
    }

    #[test]
    fn contact_id_rejects_blank() {
        assert_eq!(ContactId::new("  ").unwrap_err(), CoreError::EmptyContactId);
        assert!(serde_json::from_str::<ContactId>("\"\"").is_err());
    }

    #[test]
    fn contact_id_keeps_integer_form() {
        let id: ContactId = serde_json::from_str("42").expect("numeric id");
        assert!(id.is_numeric());
        assert_eq!(id.as_str(), "42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        assert_eq!(id, ContactId::from_str("42").unwrap());
    }

    #[test]
    fn contact_id_rejects_other_json_types() {
        assert!(serde_json::from_str::<ContactId>("true").is_err());
        assert!(serde_json::from_str::<ContactId>("1.5").is_err());
    }
}
