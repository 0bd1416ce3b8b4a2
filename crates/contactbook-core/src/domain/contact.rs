use crate::domain::extra::ExtraFields;
use crate::domain::ids::ContactId;
use crate::domain::image::ImageData;
use crate::domain::label::{decode_labeled_array, LabeledValue, RawLabeledValue};
use serde::de::{self, value::MapDeserializer};
use serde::{Deserialize, Deserializer, Serialize};

/// Field names of the typed slots on [`RawContact`], as they appear on the
/// wire.
const KNOWN_FIELDS: [&str; 11] = [
    "id",
    "firstName",
    "middleName",
    "lastName",
    "nickname",
    "organization",
    "jobTitle",
    "birthday",
    "emails",
    "phoneNumbers",
    "image",
];

/// A contact exactly as a source produced it. Every field is optional so an
/// empty record can stand for "nothing there" (e.g. no "me" card).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ContactId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<RawLabeledValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_numbers: Option<Vec<RawLabeledValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageData>,
    /// Typed fields the source sent as an explicit `null`. They still count
    /// as properties of the record.
    #[serde(skip)]
    pub null_fields: Vec<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl RawContact {
    /// True when the record carries no properties at all, not even
    /// null-valued ones.
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.first_name.is_none()
            && self.middle_name.is_none()
            && self.last_name.is_none()
            && self.nickname.is_none()
            && self.organization.is_none()
            && self.job_title.is_none()
            && self.birthday.is_none()
            && self.emails.is_none()
            && self.phone_numbers.is_none()
            && self.image.is_none()
            && self.null_fields.is_empty()
            && self.extra.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContactFields {
    #[serde(default)]
    id: Option<ContactId>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    middle_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    nickname: Option<String>,
    #[serde(default)]
    organization: Option<String>,
    #[serde(default)]
    job_title: Option<String>,
    #[serde(default)]
    birthday: Option<String>,
    #[serde(default)]
    emails: Option<Vec<RawLabeledValue>>,
    #[serde(default)]
    phone_numbers: Option<Vec<RawLabeledValue>>,
    #[serde(default)]
    image: Option<ImageData>,
    #[serde(flatten)]
    extra: ExtraFields,
}

impl<'de> Deserialize<'de> for RawContact {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Collect the entries first so null-valued typed fields are not lost.
        let entries = ExtraFields::deserialize(deserializer)?;
        let null_fields = entries
            .iter()
            .filter(|(key, value)| value.is_null() && KNOWN_FIELDS.contains(key))
            .map(|(key, _)| key.to_string())
            .collect();

        let fields = RawContactFields::deserialize(
            MapDeserializer::<_, serde_json::Error>::new(entries.into_iter()),
        )
        .map_err(de::Error::custom)?;

        Ok(RawContact {
            id: fields.id,
            first_name: fields.first_name,
            middle_name: fields.middle_name,
            last_name: fields.last_name,
            nickname: fields.nickname,
            organization: fields.organization,
            job_title: fields.job_title,
            birthday: fields.birthday,
            emails: fields.emails,
            phone_numbers: fields.phone_numbers,
            image: fields.image,
            null_fields,
            extra: fields.extra,
        })
    }
}

/// A normalized contact: labels decoded, the three multi-value/image fields
/// always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ContactId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(default)]
    pub emails: Vec<LabeledValue>,
    #[serde(default)]
    pub phone_numbers: Vec<LabeledValue>,
    #[serde(default)]
    pub image: Option<ImageData>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl ContactRecord {
    /// Best human-readable name, falling back through the name fields.
    pub fn display_name(&self) -> Option<String> {
        let full = [&self.first_name, &self.middle_name, &self.last_name]
            .into_iter()
            .flatten()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !full.is_empty() {
            return Some(full);
        }

        if let Some(name) = self
            .extra
            .get("displayName")
            .and_then(|value| value.as_str())
            .filter(|name| !name.trim().is_empty())
        {
            return Some(name.trim().to_string());
        }

        [&self.nickname, &self.organization]
            .into_iter()
            .flatten()
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
            .map(str::to_string)
    }
}

impl From<ContactRecord> for RawContact {
    fn from(record: ContactRecord) -> Self {
        Self {
            id: record.id,
            first_name: record.first_name,
            middle_name: record.middle_name,
            last_name: record.last_name,
            nickname: record.nickname,
            organization: record.organization,
            job_title: record.job_title,
            birthday: record.birthday,
            emails: Some(record.emails.into_iter().map(Into::into).collect()),
            phone_numbers: Some(record.phone_numbers.into_iter().map(Into::into).collect()),
            image: record.image,
            null_fields: Vec::new(),
            extra: record.extra,
        }
    }
}

/// Builds the public shape of a raw record. Unknown fields are copied as-is.
pub fn contact_object(raw: &RawContact) -> ContactRecord {
    ContactRecord {
        id: raw.id.clone(),
        first_name: raw.first_name.clone(),
        middle_name: raw.middle_name.clone(),
        last_name: raw.last_name.clone(),
        nickname: raw.nickname.clone(),
        organization: raw.organization.clone(),
        job_title: raw.job_title.clone(),
        birthday: raw.birthday.clone(),
        emails: decode_labeled_array(raw.emails.as_deref()),
        phone_numbers: decode_labeled_array(raw.phone_numbers.as_deref()),
        image: raw.image.clone().filter(|image| !image.is_empty()),
        extra: raw.extra.clone(),
    }
}
