use crate::error::Result;
use crate::source::ContactSource;
use contactbook_core::{AuthStatus, ContactId, ImageData, RawContact, RawLabeledValue};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Property that carries the address-book id. The macOS source also emits it
/// on the line right before `BEGIN:VCARD`.
pub const ID_PROPERTY: &str = "X-ABUID";

const DEFAULT_LABEL: &str = "other";
const IGNORED_TYPES: [&str; 4] = ["pref", "internet", "voice", "x400"];

#[derive(Debug, Clone)]
pub struct ParsedVcf {
    pub contacts: Vec<RawContact>,
    pub warnings: Vec<String>,
    pub skipped: usize,
}

/// Contacts read from a `.vcf` export.
#[derive(Debug, Clone)]
pub struct VcfFileSource {
    pub path: PathBuf,
}

impl VcfFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ContactSource for VcfFileSource {
    fn source_name(&self) -> &'static str {
        "vcf-file"
    }

    fn request_auth_status(&self) -> Result<AuthStatus> {
        Ok(AuthStatus::Authorized)
    }

    fn get_auth_status(&self) -> Result<AuthStatus> {
        Ok(AuthStatus::Authorized)
    }

    fn get_all_contacts(&self) -> Result<Vec<RawContact>> {
        debug!(path = %self.path.display(), "reading vcf file");
        let data = fs::read_to_string(&self.path)?;
        let parsed = parse_vcf(&data)?;
        for warning in &parsed.warnings {
            warn!(path = %self.path.display(), "{warning}");
        }
        Ok(parsed.contacts)
    }

    fn get_me(&self) -> Result<RawContact> {
        Ok(RawContact::default())
    }
}

pub fn parse_vcf(data: &str) -> Result<ParsedVcf> {
    let mut warnings = Vec::new();
    let mut contacts = Vec::new();
    let mut skipped = 0;

    let mut pending_id: Option<String> = None;
    let mut current: Option<RawCard> = None;
    for line in unfold_lines(data) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed.eq_ignore_ascii_case("BEGIN:VCARD") {
            if let Some(card) = current.take() {
                warnings.push("nested BEGIN:VCARD encountered".to_string());
                if let Some(contact) = card.into_contact(&mut warnings, &mut skipped) {
                    contacts.push(contact);
                }
            }
            current = Some(RawCard {
                id: pending_id.take(),
                ..RawCard::default()
            });
            continue;
        }

        if trimmed.eq_ignore_ascii_case("END:VCARD") {
            if let Some(card) = current.take() {
                if let Some(contact) = card.into_contact(&mut warnings, &mut skipped) {
                    contacts.push(contact);
                }
            } else {
                warnings.push("END:VCARD without matching BEGIN:VCARD".to_string());
            }
            continue;
        }

        let Some(property) = Property::parse(trimmed) else {
            continue;
        };

        match current.as_mut() {
            Some(card) => card.apply(property, &mut warnings),
            None => {
                if property.name == ID_PROPERTY {
                    let id = unescape_vcard_value(&property.value).trim().to_string();
                    if !id.is_empty() {
                        pending_id = Some(id);
                    }
                }
            }
        }
    }

    if let Some(card) = current.take() {
        warnings.push("missing END:VCARD at end of file".to_string());
        if let Some(contact) = card.into_contact(&mut warnings, &mut skipped) {
            contacts.push(contact);
        }
    }

    Ok(ParsedVcf {
        contacts,
        warnings,
        skipped,
    })
}

#[derive(Debug)]
struct Property {
    group: Option<String>,
    name: String,
    params: Vec<(String, String)>,
    value: String,
}

impl Property {
    fn parse(line: &str) -> Option<Self> {
        let (left, value) = line.split_once(':')?;
        let mut parts = left.split(';');
        let head = parts.next()?.trim();
        let (group, name) = match head.rsplit_once('.') {
            Some((group, name)) => (Some(group.to_ascii_lowercase()), name),
            None => (None, head),
        };
        if name.is_empty() {
            return None;
        }

        let params = parts
            .map(str::trim)
            .filter(|param| !param.is_empty())
            .map(|param| match param.split_once('=') {
                Some((key, value)) => (
                    key.trim().to_ascii_uppercase(),
                    value.trim().trim_matches('"').to_string(),
                ),
                // vCard 2.1 allows bare parameters such as `TEL;CELL:`.
                None => ("TYPE".to_string(), param.to_string()),
            })
            .collect();

        Some(Self {
            group,
            name: name.to_ascii_uppercase(),
            params,
            value: value.to_string(),
        })
    }

    fn param_values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.params
            .iter()
            .filter(move |(name, _)| name == key)
            .flat_map(|(_, value)| value.split(','))
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    fn type_label(&self) -> Option<String> {
        self.param_values("TYPE")
            .find(|value| {
                !IGNORED_TYPES
                    .iter()
                    .any(|ignored| value.eq_ignore_ascii_case(ignored))
            })
            .map(str::to_string)
    }

    fn is_base64(&self) -> bool {
        self.param_values("ENCODING")
            .chain(self.param_values("TYPE"))
            .any(|value| value.eq_ignore_ascii_case("b") || value.eq_ignore_ascii_case("base64"))
    }

    fn decode_photo(&self) -> std::result::Result<Option<ImageData>, String> {
        let value = self.value.trim();
        if value.is_empty() {
            return Ok(None);
        }

        if let Some(rest) = value.strip_prefix("data:") {
            let Some((meta, payload)) = rest.split_once(',') else {
                return Err("malformed PHOTO data uri".to_string());
            };
            if !meta.to_ascii_lowercase().ends_with(";base64") {
                return Err("unsupported PHOTO data uri encoding".to_string());
            }
            return ImageData::from_base64(payload)
                .map(Some)
                .map_err(|err| format!("invalid PHOTO data: {err}"));
        }

        if self.is_base64() {
            return ImageData::from_base64(value)
                .map(Some)
                .map_err(|err| format!("invalid PHOTO data: {err}"));
        }

        Err("PHOTO references an external uri; skipping".to_string())
    }
}

#[derive(Debug)]
struct PendingValue {
    group: Option<String>,
    label: Option<String>,
    value: String,
}

#[derive(Debug, Default)]
struct RawCard {
    id: Option<String>,
    display_name: Option<String>,
    first_name: Option<String>,
    middle_name: Option<String>,
    last_name: Option<String>,
    nickname: Option<String>,
    organization: Option<String>,
    job_title: Option<String>,
    birthday: Option<String>,
    note: Option<String>,
    urls: Vec<String>,
    emails: Vec<PendingValue>,
    phones: Vec<PendingValue>,
    group_labels: HashMap<String, String>,
    image: Option<ImageData>,
}

impl RawCard {
    fn apply(&mut self, property: Property, warnings: &mut Vec<String>) {
        match property.name.as_str() {
            ID_PROPERTY => set_once(&mut self.id, &property.value),
            "FN" => set_once(&mut self.display_name, &property.value),
            "N" => {
                let parts = split_escaped(&property.value, ';');
                let mut parts = parts.iter().map(String::as_str);
                set_once(&mut self.last_name, parts.next().unwrap_or_default());
                set_once(&mut self.first_name, parts.next().unwrap_or_default());
                set_once(&mut self.middle_name, parts.next().unwrap_or_default());
            }
            "NICKNAME" => {
                let first = split_escaped(&property.value, ',').into_iter().next();
                set_once(&mut self.nickname, first.as_deref().unwrap_or_default());
            }
            "ORG" => {
                let first = split_escaped(&property.value, ';').into_iter().next();
                set_once(&mut self.organization, first.as_deref().unwrap_or_default());
            }
            "TITLE" => set_once(&mut self.job_title, &property.value),
            "BDAY" => set_once(&mut self.birthday, &property.value),
            "NOTE" => set_once(&mut self.note, &property.value),
            "URL" => {
                let value = unescape_vcard_value(&property.value);
                if !value.trim().is_empty() {
                    self.urls.push(value.trim().to_string());
                }
            }
            "EMAIL" | "TEL" => {
                let pending = PendingValue {
                    label: property.type_label(),
                    value: unescape_vcard_value(&property.value).trim().to_string(),
                    group: property.group,
                };
                if property.name == "EMAIL" {
                    self.emails.push(pending);
                } else {
                    self.phones.push(pending);
                }
            }
            "X-ABLABEL" => {
                if let Some(group) = property.group {
                    let label = unescape_vcard_value(&property.value);
                    self.group_labels.insert(group, label.trim().to_string());
                }
            }
            "PHOTO" => match property.decode_photo() {
                Ok(Some(image)) if self.image.is_none() => self.image = Some(image),
                Ok(_) => {}
                Err(warning) => warnings.push(warning),
            },
            _ => {}
        }
    }

    fn into_contact(self, warnings: &mut Vec<String>, skipped: &mut usize) -> Option<RawContact> {
        let id = match self.id {
            Some(raw) => match ContactId::new(raw.as_str()) {
                Ok(id) => Some(id),
                Err(_) => {
                    warnings.push(format!("invalid contact id: {raw}"));
                    None
                }
            },
            None => None,
        };

        let mut contact = RawContact {
            id,
            first_name: self.first_name,
            middle_name: self.middle_name,
            last_name: self.last_name,
            nickname: self.nickname,
            organization: self.organization,
            job_title: self.job_title,
            birthday: self.birthday,
            emails: resolve_labels(self.emails, &self.group_labels),
            phone_numbers: resolve_labels(self.phones, &self.group_labels),
            image: self.image,
            ..RawContact::default()
        };
        if let Some(name) = self.display_name {
            contact.extra.insert("displayName", Value::String(name));
        }
        if let Some(note) = self.note {
            contact.extra.insert("note", Value::String(note));
        }
        if !self.urls.is_empty() {
            let urls = self.urls.into_iter().map(Value::String).collect();
            contact.extra.insert("urls", Value::Array(urls));
        }

        if contact.is_empty() {
            warnings.push("empty vCard; skipping".to_string());
            *skipped += 1;
            return None;
        }
        Some(contact)
    }
}

fn resolve_labels(
    values: Vec<PendingValue>,
    group_labels: &HashMap<String, String>,
) -> Option<Vec<RawLabeledValue>> {
    if values.is_empty() {
        return None;
    }
    let resolved = values
        .into_iter()
        .map(|pending| {
            let label = pending
                .group
                .as_ref()
                .and_then(|group| group_labels.get(group))
                .filter(|label| !label.is_empty())
                .cloned()
                .or(pending.label)
                .unwrap_or_else(|| DEFAULT_LABEL.to_string());
            RawLabeledValue {
                label,
                value: Some(pending.value),
            }
        })
        .collect();
    Some(resolved)
}

fn set_once(slot: &mut Option<String>, raw: &str) {
    if slot.is_some() {
        return;
    }
    let value = unescape_vcard_value(raw);
    let value = value.trim();
    if !value.is_empty() {
        *slot = Some(value.to_string());
    }
}

fn unfold_lines(input: &str) -> Vec<String> {
    let input = normalize_line_endings(input);
    let mut lines: Vec<String> = Vec::new();
    for line in input.lines() {
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some(last) = lines.last_mut() {
                last.push_str(&line[1..]);
            } else {
                lines.push(line[1..].to_string());
            }
        } else {
            lines.push(line.to_string());
        }
    }
    lines
}

fn normalize_line_endings(input: &str) -> std::borrow::Cow<'_, str> {
    if !input.contains('\r') {
        return std::borrow::Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\r' {
            if matches!(chars.peek(), Some('\n')) {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(ch);
        }
    }
    std::borrow::Cow::Owned(out)
}

// Splits on `separator` unless it is backslash-escaped. Escapes are kept.
fn split_escaped(value: &str, separator: char) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut escape = false;

    for ch in value.chars() {
        if escape {
            current.push(ch);
            escape = false;
            continue;
        }

        if ch == '\\' {
            current.push(ch);
            escape = true;
            continue;
        }

        if ch == separator {
            items.push(current);
            current = String::new();
        } else {
            current.push(ch);
        }
    }

    items.push(current);
    items
}

fn unescape_vcard_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n') | Some('N') => out.push('\n'),
                Some('r') | Some('R') => out.push('\n'),
                Some(other) => out.push(other),
                None => break,
            }
        } else {
            out.push(ch);
        }
    }
    out
}
