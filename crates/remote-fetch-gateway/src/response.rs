//! Decoding of API collection responses.
//!
//! Paginated endpoints answer with
//! `{"data": [...], "paging": {"cursors": {"before": "12", "after": "20"}, "total": 42}}`.
//! Unpaginated ones answer with a bare array or `{"data": [...]}`.

use crate::error::GatewayResult;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Pagination metadata of one response. `after == None` marks the last page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Paging {
    pub before: Option<i64>,
    pub after: Option<i64>,
    pub total: Option<u64>,
}

/// One decoded page. Records stay as raw JSON until the typed layer
/// deserializes them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PagedResponse {
    pub records: Vec<Value>,
    pub paging: Paging,
}

impl PagedResponse {
    pub fn new(records: Vec<Value>) -> Self {
        Self {
            records,
            paging: Paging::default(),
        }
    }

    pub fn with_cursors(mut self, before: Option<i64>, after: Option<i64>) -> Self {
        self.paging.before = before;
        self.paging.after = after;
        self
    }

    pub fn with_total(mut self, total: Option<u64>) -> Self {
        self.paging.total = total;
        self
    }

    pub fn from_slice(body: &[u8]) -> GatewayResult<Self> {
        let wire: WireBody = serde_json::from_slice(body)?;
        Ok(wire.into())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireBody {
    Bare(Vec<Value>),
    Enveloped {
        data: Vec<Value>,
        #[serde(default)]
        paging: Option<WirePaging>,
    },
}

#[derive(Deserialize, Default)]
struct WirePaging {
    #[serde(default)]
    cursors: Option<WireCursors>,
    #[serde(default)]
    total: Option<u64>,
}

#[derive(Deserialize, Default)]
struct WireCursors {
    #[serde(default, deserialize_with = "cursor")]
    before: Option<i64>,
    #[serde(default, deserialize_with = "cursor")]
    after: Option<i64>,
}

impl From<WireBody> for PagedResponse {
    fn from(wire: WireBody) -> Self {
        match wire {
            WireBody::Bare(records) => PagedResponse::new(records),
            WireBody::Enveloped { data, paging } => {
                let paging = paging.unwrap_or_default();
                let cursors = paging.cursors.unwrap_or_default();
                PagedResponse {
                    records: data,
                    paging: Paging {
                        before: cursors.before,
                        after: cursors.after,
                        total: paging.total,
                    },
                }
            }
        }
    }
}

/// Cursors arrive as strings or numbers; empty strings mean absent.
fn cursor<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(value)) => Ok(Some(value)),
        Some(Raw::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Raw::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid cursor {:?}", text))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GatewayErrorKind;
    use serde_json::json;

    #[test]
    fn decodes_enveloped_page_with_string_cursors() {
        let body = br#"{"data":[{"id":1},{"id":8}],"paging":{"cursors":{"before":"0","after":"8"},"total":11}}"#;
        let page = PagedResponse::from_slice(body).unwrap();

        assert_eq!(page.records, vec![json!({"id": 1}), json!({"id": 8})]);
        assert_eq!(
            page.paging,
            Paging {
                before: Some(0),
                after: Some(8),
                total: Some(11),
            }
        );
    }

    #[test]
    fn decodes_numeric_and_null_cursors() {
        let body = br#"{"data":[],"paging":{"cursors":{"before":12,"after":null}}}"#;
        let page = PagedResponse::from_slice(body).unwrap();

        assert_eq!(page.paging.before, Some(12));
        assert_eq!(page.paging.after, None);
        assert_eq!(page.paging.total, None);
    }

    #[test]
    fn decodes_bare_array_and_data_without_paging() {
        let bare = PagedResponse::from_slice(br#"[{"id":3}]"#).unwrap();
        assert_eq!(bare.records.len(), 1);
        assert_eq!(bare.paging, Paging::default());

        let data_only = PagedResponse::from_slice(br#"{"data":[{"id":3},{"id":4}]}"#).unwrap();
        assert_eq!(data_only.records.len(), 2);
        assert_eq!(data_only.paging.after, None);
    }

    #[test]
    fn rejects_garbage_as_server_kind() {
        let bodies: [&[u8]; 3] = [
            b"<html>",
            br#"{"items":[]}"#,
            br#"{"data":[],"paging":{"cursors":{"after":"abc"}}}"#,
        ];
        for body in bodies {
            let err = PagedResponse::from_slice(body).unwrap_err();
            assert_eq!(err.kind(), GatewayErrorKind::Server);
        }
    }
}
