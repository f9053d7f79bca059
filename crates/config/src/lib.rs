use anyhow::{Context, Result};
use secoc_core::key::KEY_LEN;
use secoc_core::record::MAX_RECORD_LEN;
use secoc_core::selftest::SelfTestVector;
use secoc_core::tag::{MAC_LEN, TRUNCATED_MAC_LEN};
use secoc_core::MacKey;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SCHEMA_VERSION: &str = "1.0";

fn default_name() -> String {
    "unnamed".to_string()
}

fn default_truncation_len() -> usize {
    TRUNCATED_MAC_LEN
}

/// Self-test vector as written in YAML. Byte fields are hex strings;
/// whitespace inside them is ignored.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct VectorFile {
    pub schema_version: String,
    #[serde(default = "default_name")]
    pub name: String,
    pub key: String,
    pub identifier: String,
    pub payload: String,
    pub freshness: String,
    pub expected_mac: String,
    #[serde(default = "default_truncation_len")]
    pub truncation_len: usize,
}

#[derive(Debug, thiserror::Error)]
#[error("Field '{field}' is not valid hex")]
pub struct HexFieldError {
    pub field: &'static str,
    #[source]
    pub source: hex::FromHexError,
}

/// A vector whose fields have been decoded and checked.
#[derive(Debug, Clone)]
pub struct DecodedVector {
    pub name: String,
    pub key: MacKey,
    pub identifier: Vec<u8>,
    pub payload: Vec<u8>,
    pub freshness: Vec<u8>,
    pub expected_mac: Vec<u8>,
    pub truncation_len: usize,
}

impl DecodedVector {
    /// The compiled-in reference vector.
    pub fn reference() -> Self {
        let v = SelfTestVector::reference();
        Self {
            name: "reference".to_string(),
            key: v.key,
            identifier: v.identifier.to_vec(),
            payload: v.payload.to_vec(),
            freshness: v.freshness.to_vec(),
            expected_mac: v.expected_mac.to_vec(),
            truncation_len: v.truncation_len,
        }
    }

    pub fn as_vector(&self) -> SelfTestVector<'_> {
        SelfTestVector {
            key: self.key.clone(),
            identifier: &self.identifier,
            payload: &self.payload,
            freshness: &self.freshness,
            expected_mac: &self.expected_mac,
            truncation_len: self.truncation_len,
        }
    }
}

fn decode_field(field: &'static str, value: &str) -> Result<Vec<u8>, HexFieldError> {
    let compact: String = value.split_whitespace().collect();
    hex::decode(compact).map_err(|source| HexFieldError { field, source })
}

impl VectorFile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open vector file at {:?}", path.as_ref()))?;
        let file: Self =
            serde_yaml::from_reader(f).context("Failed to parse Vector File YAML")?;
        file.validate()?;
        Ok(file)
    }

    pub fn validate(&self) -> Result<()> {
        self.decode().map(|_| ())
    }

    pub fn decode(&self) -> Result<DecodedVector> {
        if self.schema_version != SCHEMA_VERSION {
            anyhow::bail!(
                "Unsupported schema_version '{}'. Supported versions: '{}'",
                self.schema_version,
                SCHEMA_VERSION
            );
        }

        let key = decode_field("key", &self.key)?;
        let key = MacKey::try_from(key.as_slice()).map_err(|_| {
            anyhow::anyhow!("Field 'key' must be {} bytes, got {}", KEY_LEN, key.len())
        })?;
        let identifier = decode_field("identifier", &self.identifier)?;
        let payload = decode_field("payload", &self.payload)?;
        let freshness = decode_field("freshness", &self.freshness)?;
        let expected_mac = decode_field("expected_mac", &self.expected_mac)?;

        if self.truncation_len == 0 || self.truncation_len > MAC_LEN {
            anyhow::bail!(
                "Field 'truncation_len' must be between 1 and {}, got {}",
                MAC_LEN,
                self.truncation_len
            );
        }
        if expected_mac.len() != self.truncation_len {
            anyhow::bail!(
                "Field 'expected_mac' is {} bytes but truncation_len is {}",
                expected_mac.len(),
                self.truncation_len
            );
        }

        let record_len = identifier.len() + payload.len() + freshness.len();
        if record_len > MAX_RECORD_LEN {
            anyhow::bail!(
                "Record of {} bytes exceeds the {} byte assembly buffer",
                record_len,
                MAX_RECORD_LEN
            );
        }

        Ok(DecodedVector {
            name: self.name.clone(),
            key,
            identifier,
            payload,
            freshness,
            expected_mac,
            truncation_len: self.truncation_len,
        })
    }
}
