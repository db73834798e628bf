//! Server, bucket and entry descriptions as returned by the storage API.

use serde::{Deserialize, Deserializer, Serialize};

/// Quota policy of a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuotaType {
    None,
    /// Drop the oldest blocks once the quota is reached.
    Fifo,
}

/// Bucket settings. Unset fields are left untouched by the server, so a
/// partial value can be passed to [`Bucket::set_settings`](crate::Bucket::set_settings).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSettings {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_u64"
    )]
    pub max_block_size: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota_type: Option<QuotaType>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_u64"
    )]
    pub quota_size: Option<u64>,
}

impl BucketSettings {
    #[must_use]
    pub fn max_block_size(mut self, size: u64) -> Self {
        self.max_block_size = Some(size);
        self
    }

    #[must_use]
    pub fn quota_type(mut self, quota_type: QuotaType) -> Self {
        self.quota_type = Some(quota_type);
        self
    }

    #[must_use]
    pub fn quota_size(mut self, size: u64) -> Self {
        self.quota_size = Some(size);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServerInfo {
    #[serde(default)]
    pub version: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub bucket_count: u64,
    /// Disk usage in bytes.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub usage: u64,
    /// Uptime in seconds.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub uptime: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub oldest_record: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub latest_record: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BucketInfo {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub entry_count: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub size: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub oldest_record: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub latest_record: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EntryInfo {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub size: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub record_count: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub block_count: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub oldest_record: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub latest_record: u64,
}

/// Body of `GET /b/{bucket}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct BucketDetails {
    #[serde(default)]
    pub settings: BucketSettings,
    pub info: Option<BucketInfo>,
    #[serde(default)]
    pub entries: Vec<EntryInfo>,
}

/// Body of `GET /list`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct BucketList {
    #[serde(default)]
    pub buckets: Vec<BucketInfo>,
}

// Integers larger than 2^53 are sent as decimal strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    String(String),
}

impl NumberOrString {
    fn into_u64<E: serde::de::Error>(self) -> Result<u64, E> {
        match self {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::String(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid integer: {s:?}"))),
        }
    }
}

fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    NumberOrString::deserialize(deserializer)?.into_u64()
}

fn lenient_opt_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Option::<NumberOrString>::deserialize(deserializer)?
        .map(NumberOrString::into_u64)
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_accept_numbers_and_strings() {
        let settings: BucketSettings = serde_json::from_str(
            r#"{"max_block_size": "1024", "quota_type": "FIFO", "quota_size": 2048}"#,
        )
        .unwrap();
        assert_eq!(
            settings,
            BucketSettings::default()
                .max_block_size(1024)
                .quota_type(QuotaType::Fifo)
                .quota_size(2048)
        );
    }

    #[test]
    fn partial_settings_omit_unset_fields() {
        let json = serde_json::to_value(BucketSettings::default().quota_size(10)).unwrap();
        assert_eq!(json, serde_json::json!({"quota_size": 10}));
    }

    #[test]
    fn bucket_details_tolerate_missing_sections() {
        let details: BucketDetails = serde_json::from_str(
            r#"{"info": {"name": "data", "entry_count": 2, "size": "18446744073709551615"}}"#,
        )
        .unwrap();
        let info = details.info.unwrap();
        assert_eq!(info.name, "data");
        assert_eq!(info.entry_count, 2);
        assert_eq!(info.size, u64::MAX);
        assert!(details.entries.is_empty());
        assert_eq!(details.settings, BucketSettings::default());
    }

    #[test]
    fn invalid_integer_string_is_rejected() {
        let result: Result<ServerInfo, _> = serde_json::from_str(r#"{"usage": "lots"}"#);
        assert!(result.is_err());
    }
}
