//! Storage identifier parsing.

use thiserror::Error;

/// Object address extracted from a storage identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStorage {
    pub bucket_key: String,
    pub object_name: String,
}

/// A storage identifier that does not follow the expected shape.
#[derive(Debug, Error)]
#[error("Malformed storage identifier '{id}': {reason}")]
pub struct StorageUrnError {
    pub id: String,
    pub reason: String,
}

/// Extract bucket key and object name from a storage identifier.
///
/// Identifiers look like
/// `urn:adsk.objects:os.object:wip.dm.prod/977d69b1-....ipt`: the object name
/// is the last slash segment, the bucket key the last colon segment of the
/// slash segment before it. The extraction is positional; anything with fewer
/// than two slash segments, or empty pieces at those positions, is rejected.
pub fn parse_storage_urn(id: &str) -> Result<ParsedStorage, StorageUrnError> {
    let malformed = |reason: &str| StorageUrnError {
        id: id.to_string(),
        reason: reason.to_string(),
    };

    let segments: Vec<&str> = id.split('/').collect();
    if segments.len() < 2 {
        return Err(malformed("expected at least two '/'-delimited segments"));
    }

    let object_name = segments[segments.len() - 1];
    if object_name.is_empty() {
        return Err(malformed("empty object name segment"));
    }

    let bucket_segment = segments[segments.len() - 2];
    let bucket_key = bucket_segment
        .rsplit(':')
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| malformed("empty bucket key segment"))?;

    Ok(ParsedStorage {
        bucket_key: bucket_key.to_string(),
        object_name: object_name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wip_storage_id() {
        let parsed = parse_storage_urn(
            "urn:adsk.objects:os.object:wip.dm.prod/977d69b1-43e7-40fa-8ece-6ec4602892f3.ipt",
        )
        .unwrap();
        assert_eq!(parsed.bucket_key, "wip.dm.prod");
        assert_eq!(
            parsed.object_name,
            "977d69b1-43e7-40fa-8ece-6ec4602892f3.ipt"
        );
    }

    #[test]
    fn test_parse_is_positional_on_longer_ids() {
        // Only the last two slash segments matter.
        let parsed =
            parse_storage_urn("urn:x/wip.dm.prod:fs.file:vf.X/version=1").unwrap();
        assert_eq!(parsed.bucket_key, "vf.X");
        assert_eq!(parsed.object_name, "version=1");
    }

    #[test]
    fn test_parse_bucket_without_colons() {
        let parsed = parse_storage_urn("mybucket/myobject.ipt").unwrap();
        assert_eq!(parsed.bucket_key, "mybucket");
        assert_eq!(parsed.object_name, "myobject.ipt");
    }

    #[test]
    fn test_parse_no_slash_fails() {
        let err = parse_storage_urn("urn:adsk.objects:os.object").unwrap_err();
        assert!(err.to_string().contains("Malformed storage identifier"));
    }

    #[test]
    fn test_parse_empty_object_name_fails() {
        assert!(parse_storage_urn("urn:x:bucket/").is_err());
    }

    #[test]
    fn test_parse_empty_input_fails() {
        assert!(parse_storage_urn("").is_err());
    }
}
