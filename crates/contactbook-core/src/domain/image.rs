use crate::error::CoreError;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Contact thumbnail bytes. JSON carries them as standard base64.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageData(Vec<u8>);

impl ImageData {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn from_base64(encoded: &str) -> Result<Self, CoreError> {
        let compact: String = encoded.split_whitespace().collect();
        general_purpose::STANDARD
            .decode(compact.as_bytes())
            .map(Self)
            .map_err(|err| CoreError::InvalidImageData(err.to_string()))
    }

    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for ImageData {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl Serialize for ImageData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for ImageData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Self::from_base64(&encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::ImageData;

    #[test]
    fn image_data_serializes_as_base64() {
        let image = ImageData::new(vec![0xff, 0xd8, 0xff]);
        let json = serde_json::to_string(&image).unwrap();
        assert_eq!(json, "\"/9j/\"");
        let back: ImageData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, image);
    }

    #[test]
    fn image_data_ignores_embedded_whitespace() {
        let image = ImageData::from_base64("/9j/\n  4AAQ").unwrap();
        assert_eq!(image.len(), 6);
    }

    #[test]
    fn image_data_rejects_garbage() {
        assert!(ImageData::from_base64("not base64!").is_err());
    }
}
