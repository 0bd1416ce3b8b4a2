use serde::{Deserialize, Serialize};

/// Prefix the macOS address book puts on its built-in labels, as in
/// `_$!<Mobile>!$_`.
pub const ENCODED_LABEL_PREFIX: &str = "_$!";

/// A labeled entry as handed over by a contact source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLabeledValue {
    #[serde(rename = "type")]
    pub label: String,
    #[serde(default)]
    pub value: Option<String>,
}

impl RawLabeledValue {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: Some(value.into()),
        }
    }
}

/// A labeled entry after decoding: `label` is lower-cased with any platform
/// encoding removed and `value` is `None` when the source had nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledValue {
    #[serde(rename = "type")]
    pub label: String,
    pub value: Option<String>,
}

impl From<LabeledValue> for RawLabeledValue {
    fn from(value: LabeledValue) -> Self {
        Self {
            label: value.label,
            value: value.value,
        }
    }
}

pub fn decode_label(raw: &str) -> String {
    if raw.starts_with(ENCODED_LABEL_PREFIX) {
        if let Some(inner) = bracketed(raw) {
            return inner.to_lowercase();
        }
    }
    raw.to_lowercase()
}

pub fn decode_labeled_array(items: Option<&[RawLabeledValue]>) -> Vec<LabeledValue> {
    items
        .unwrap_or_default()
        .iter()
        .map(|item| LabeledValue {
            label: decode_label(&item.label),
            value: item.value.clone().filter(|value| !value.is_empty()),
        })
        .collect()
}

// Span between the first '<' and the last '>'.
fn bracketed(raw: &str) -> Option<&str> {
    let start = raw.find('<')?;
    let end = raw.rfind('>')?;
    if end <= start {
        return None;
    }
    Some(&raw[start + 1..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_label_extracts_encoded_label() {
        assert_eq!(decode_label("_$!<Work>!$_"), "work");
        assert_eq!(decode_label("_$!<HomePage>!$_"), "homepage");
    }

    #[test]
    fn decode_label_lowercases_plain_labels() {
        assert_eq!(decode_label("iPhone"), "iphone");
        assert_eq!(decode_label("Work <Main>"), "work <main>");
        assert_eq!(decode_label("ÉCOLE"), "école");
    }

    #[test]
    fn decode_label_spans_first_open_to_last_close() {
        assert_eq!(decode_label("_$!<A<b>c>!$_"), "a<b>c");
    }

    #[test]
    fn decode_label_keeps_marker_without_brackets() {
        assert_eq!(decode_label("_$!Other!$_"), "_$!other!$_");
        assert_eq!(decode_label("_$!>Odd<"), "_$!>odd<");
    }

    #[test]
    fn decode_label_handles_short_input() {
        assert_eq!(decode_label(""), "");
        assert_eq!(decode_label("_$"), "_$");
        assert_eq!(decode_label("_$!"), "_$!");
    }

    #[test]
    fn decode_label_allows_empty_bracket_span() {
        assert_eq!(decode_label("_$!<>!$_"), "");
    }

    #[test]
    fn decode_labeled_array_defaults_to_empty() {
        assert!(decode_labeled_array(None).is_empty());
        assert!(decode_labeled_array(Some(&[][..])).is_empty());
    }

    #[test]
    fn decode_labeled_array_preserves_order_and_length() {
        let items = vec![
            RawLabeledValue::new("_$!<Home>!$_", "123-456"),
            RawLabeledValue {
                label: "WORK".to_string(),
                value: Some(String::new()),
            },
            RawLabeledValue {
                label: "_$!<Mobile>!$_".to_string(),
                value: None,
            },
            RawLabeledValue::new("_$!<Home>!$_", "789"),
        ];

        let decoded = decode_labeled_array(Some(items.as_slice()));
        assert_eq!(
            decoded,
            vec![
                LabeledValue {
                    label: "home".to_string(),
                    value: Some("123-456".to_string()),
                },
                LabeledValue {
                    label: "work".to_string(),
                    value: None,
                },
                LabeledValue {
                    label: "mobile".to_string(),
                    value: None,
                },
                LabeledValue {
                    label: "home".to_string(),
                    value: Some("789".to_string()),
                },
            ]
        );
    }

    #[test]
    fn raw_labeled_value_requires_string_type() {
        let parsed: Result<RawLabeledValue, _> =
            serde_json::from_str(r#"{"type": 42, "value": "x"}"#);
        assert!(parsed.is_err());

        let parsed: RawLabeledValue = serde_json::from_str(r#"{"type": "home"}"#).unwrap();
        assert_eq!(parsed.value, None);
    }
}
