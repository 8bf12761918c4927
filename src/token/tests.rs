//! Tests for the resumption token codec

use super::*;
use chrono::{Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;

fn ts(secs: i64) -> crate::types::Timestamp {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn full_token() -> ResumptionToken {
    let criteria = ListCriteria::with_prefix("oai_dc")
        .set("energy")
        .range(Some(ts(1_577_836_800)), Some(ts(1_609_459_199)));
    ResumptionToken::new(criteria, 8)
        .with_complete_list_size(42)
        .with_expiration(ts(1_699_999_999))
}

// ============================================================================
// Encoding Tests
// ============================================================================

#[test]
fn test_encode_wire_format() {
    let codec = TokenCodec::default();
    let encoded = codec.encode(&full_token());
    assert_eq!(
        encoded,
        "metadataPrefix=oai_dc&set=energy&from=2020-01-01T00%3A00%3A00Z\
         &until=2020-12-31T23%3A59%3A59Z&cursor=8&completeListSize=42&expirationDate=1699999999"
    );
}

#[test]
fn test_encode_omits_absent_fields() {
    let codec = TokenCodec::default();
    let token = ResumptionToken::new(ListCriteria::default(), 3);
    assert_eq!(codec.encode(&token), "cursor=3");
}

#[test]
fn test_encode_escapes_set_names() {
    let codec = TokenCodec::default();
    let token = ResumptionToken::new(ListCriteria::default().set("a&b=c d"), 0);
    let encoded = codec.encode(&token);
    assert!(!encoded.contains("a&b"));
    assert_eq!(codec.decode(&encoded).unwrap().criteria.set.as_deref(), Some("a&b=c d"));
}

// ============================================================================
// Decoding Tests
// ============================================================================

#[test]
fn test_decode_encode_roundtrip() {
    let codec = TokenCodec::default();
    let token = full_token();
    assert_eq!(codec.decode(&codec.encode(&token)).unwrap(), token);
}

#[test]
fn test_decode_accepts_day_granularity() {
    let codec = TokenCodec::default();
    let token = codec.decode("set=energy&from=2020-01-01&cursor=8").unwrap();
    assert_eq!(token.criteria.from, Some(ts(1_577_836_800)));
    assert_eq!(token.cursor, 8);
}

#[test]
fn test_decode_takes_first_of_repeated_keys() {
    let codec = TokenCodec::default();
    let token = codec.decode("set=first&set=second&cursor=1&cursor=9").unwrap();
    assert_eq!(token.criteria.set.as_deref(), Some("first"));
    assert_eq!(token.cursor, 1);
}

#[test]
fn test_decode_double_encoded_token() {
    let codec = TokenCodec::default();
    let token = codec
        .decode("set%3Denergy%26cursor%3D3%26completeListSize%3D10")
        .unwrap();
    assert_eq!(token.criteria.set.as_deref(), Some("energy"));
    assert_eq!(token.cursor, 3);
    assert_eq!(token.complete_list_size, Some(10));
}

#[test]
fn test_decode_rejects_missing_cursor() {
    let codec = TokenCodec::default();
    let err = codec.decode("set=energy").unwrap_err();
    assert_eq!(err.oai_code(), Some("badResumptionToken"));
}

#[test]
fn test_decode_rejects_garbage() {
    let codec = TokenCodec::default();
    for raw in ["", "   ", "cursor=abc", "cursor=-1", "cursor=1&completeListSize=x"] {
        let err = codec.decode(raw).unwrap_err();
        assert_eq!(err.oai_code(), Some("badResumptionToken"), "token {raw:?}");
    }
}

#[test]
fn test_decode_rejects_unparsable_expiration() {
    let codec = TokenCodec::new(Some(Duration::seconds(60)));
    let err = codec
        .decode("cursor=3&expirationDate=2024-01-01")
        .unwrap_err();
    assert_eq!(err.to_string(), "expirationDate is not in a valid format");
}

#[test]
fn test_decode_rejects_bad_dates() {
    let codec = TokenCodec::default();
    let err = codec.decode("from=not-a-date&cursor=3").unwrap_err();
    assert_eq!(err.oai_code(), Some("badResumptionToken"));
}

// ============================================================================
// Validation Tests
// ============================================================================

#[test]
fn test_validate_expired_token() {
    let codec = TokenCodec::new(Some(Duration::seconds(60)));
    let token = ResumptionToken::new(ListCriteria::default(), 3).with_expiration(ts(1_000));
    let err = codec.validate(token, ts(1_001)).unwrap_err();
    assert_eq!(err.oai_code(), Some("badResumptionToken"));
    assert_eq!(err.to_string(), "expirationDate is in the past");
}

#[test]
fn test_validate_token_expiring_now_is_accepted() {
    let codec = TokenCodec::new(Some(Duration::seconds(60)));
    let token = ResumptionToken::new(ListCriteria::default(), 3).with_expiration(ts(1_000));
    assert!(codec.validate(token, ts(1_000)).is_ok());
}

#[test]
fn test_validate_requires_expiration_when_enabled() {
    let codec = TokenCodec::new(Some(Duration::seconds(60)));
    let token = ResumptionToken::new(ListCriteria::default(), 3);
    let err = codec.validate(token, ts(1_000)).unwrap_err();
    assert_eq!(err.to_string(), "expirationDate is missing");
}

#[test]
fn test_validate_without_expiry_accepts_missing_expiration() {
    let codec = TokenCodec::default();
    let token = ResumptionToken::new(ListCriteria::with_prefix("oai_dc"), 3);
    let continuation = codec.validate(token, ts(1_000)).unwrap();
    assert_eq!(continuation.cursor, 3);
}

#[test]
fn test_validate_without_expiry_ignores_stale_expiration() {
    let codec = TokenCodec::default();
    let token = ResumptionToken::new(ListCriteria::default(), 3).with_expiration(ts(10));
    assert!(codec.validate(token, ts(1_000)).is_ok());
}

#[test]
fn test_validate_strips_informative_fields() {
    let codec = TokenCodec::new(Some(Duration::seconds(60)));
    let token = full_token();
    let continuation = codec.validate(token.clone(), ts(1_699_999_000)).unwrap();

    assert_eq!(continuation.criteria, token.criteria);
    assert_eq!(continuation.cursor, 8);
    // kept for reporting only, outside of the criteria
    assert_eq!(continuation.complete_list_size, Some(42));
}

#[test]
fn test_validate_rejects_cursor_beyond_size() {
    let codec = TokenCodec::default();
    let token = ResumptionToken::new(ListCriteria::default(), 11).with_complete_list_size(10);
    let err = codec.validate(token, ts(0)).unwrap_err();
    assert_eq!(err.oai_code(), Some("badResumptionToken"));
}

// ============================================================================
// Issuing Tests
// ============================================================================

#[test]
fn test_issue_stamps_expiration() {
    let codec = TokenCodec::new(Some(Duration::seconds(60)));
    let token = codec.issue(ListCriteria::with_prefix("oai_dc"), 3, 10, ts(1_000));
    assert_eq!(token.cursor, 3);
    assert_eq!(token.complete_list_size, Some(10));
    assert_eq!(token.expiration_date, Some(ts(1_060)));
}

#[test]
fn test_issue_without_expiry() {
    let codec = TokenCodec::default();
    let token = codec.issue(ListCriteria::default(), 3, 10, ts(1_000));
    assert_eq!(token.expiration_date, None);
}

#[test]
fn test_issued_token_resumes_until_expiry() {
    let codec = TokenCodec::new(Some(Duration::seconds(60)));
    let issued = codec.issue(ListCriteria::with_prefix("oai_dc").set("energy"), 3, 10, ts(1_000));
    let raw = codec.encode(&issued);

    let continuation = codec.resume(&raw, ts(1_030)).unwrap();
    assert_eq!(continuation.criteria.set.as_deref(), Some("energy"));
    assert_eq!(continuation.cursor, 3);

    assert!(codec.resume(&raw, ts(1_061)).is_err());
}
