//! Wire schema of the published service tag document.
//!
//! Only the fields the reconciler consumes are modelled; everything else in
//! the document is ignored.

use serde::{Deserialize, Deserializer};
use udr_core::{ServiceTagSnapshot, TagEntry};

use crate::{Error, Result};

/// Top-level document
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTagDocument {
    #[serde(deserialize_with = "change_number")]
    pub change_number: u64,
    pub cloud: String,
    #[serde(default)]
    pub values: Vec<ServiceTagValue>,
}

/// One entry of `values`
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceTagValue {
    pub name: String,
    pub properties: ServiceTagProperties,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTagProperties {
    #[serde(deserialize_with = "change_number")]
    pub change_number: u64,
    #[serde(default)]
    pub address_prefixes: Vec<String>,
}

/// Change numbers are integers, but some mirrors quote them.
fn change_number<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl From<ServiceTagDocument> for ServiceTagSnapshot {
    fn from(document: ServiceTagDocument) -> Self {
        let tags = document
            .values
            .into_iter()
            .map(|value| {
                TagEntry::new(
                    value.name,
                    value.properties.change_number,
                    value.properties.address_prefixes,
                )
            })
            .collect();
        ServiceTagSnapshot::new(document.cloud, document.change_number, tags)
    }
}

/// Parses a document body; `origin` names where it came from for error messages.
pub fn parse_document(bytes: &[u8], origin: &str) -> Result<ServiceTagSnapshot> {
    let document: ServiceTagDocument =
        serde_json::from_slice(bytes).map_err(|source| Error::Parse {
            origin: origin.to_string(),
            source,
        })?;
    Ok(document.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const DOCUMENT: &str = r#"{
  "changeNumber": 10,
  "cloud": "Public",
  "values": [
    {
      "name": "Foo",
      "id": "Foo",
      "properties": {
        "changeNumber": 3,
        "region": "",
        "platform": "Azure",
        "addressPrefixes": ["10.0.0.0/8", "10.1.0.0/16"],
        "networkFeatures": ["UDR"]
      }
    },
    {
      "name": "Bar.westeurope",
      "id": "Bar.westeurope",
      "properties": { "changeNumber": "7", "addressPrefixes": [] }
    }
  ]
}"#;

    #[test]
    fn test_parse_document() {
        let snapshot = parse_document(DOCUMENT.as_bytes(), "test").unwrap();
        assert_eq!(snapshot.cloud, "Public");
        assert_eq!(snapshot.change_number, 10);
        assert_eq!(snapshot.len(), 2);

        let foo = snapshot.tag("foo").unwrap();
        assert_eq!(foo.change_number, 3);
        assert_eq!(foo.address_prefixes(), ["10.0.0.0/8", "10.1.0.0/16"]);

        let bar = snapshot.tag("Bar.westeurope").unwrap();
        assert_eq!(bar.change_number, 7);
        assert!(bar.address_prefixes().is_empty());
    }

    #[rstest]
    #[case::number("12", 12)]
    #[case::string("\"12\"", 12)]
    #[case::padded_string("\" 12 \"", 12)]
    fn test_change_number_forms(#[case] raw: &str, #[case] expected: u64) {
        let body = format!(r#"{{"changeNumber": {raw}, "cloud": "Public", "values": []}}"#);
        let snapshot = parse_document(body.as_bytes(), "inline").unwrap();
        assert_eq!(snapshot.change_number, expected);
    }

    #[test]
    fn test_parse_rejects_non_numeric_change_number() {
        let body = r#"{"changeNumber": "ten", "cloud": "Public", "values": []}"#;
        let err = parse_document(body.as_bytes(), "inline").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert!(err.to_string().contains("inline"));
    }

    #[test]
    fn test_parse_rejects_html() {
        let err = parse_document(b"<html>busy</html>", "page").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }
}
