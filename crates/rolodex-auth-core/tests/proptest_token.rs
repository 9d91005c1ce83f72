//! Property-based tests for the token codec and secret handling
//!
//! These tests verify:
//! - Issued tokens verify for their own purpose and return the subject
//! - Tokens of one purpose never verify as another purpose
//! - Malformed input never panics and never verifies
//! - Any edit to a token is detected
//! - Secret length validation

mod common;

use common::{test_config, ACCESS_SECRET, REFRESH_SECRET, RESET_SECRET};
use proptest::prelude::*;
use rolodex_auth_core::{
    constant_time_eq, hash_token, AuthConfig, InvalidToken, SigningSecret, TokenCodec,
    TokenPurpose,
};

// ============================================================================
// Strategies
// ============================================================================

fn arb_purpose() -> impl Strategy<Value = TokenPurpose> {
    prop_oneof![
        Just(TokenPurpose::Access),
        Just(TokenPurpose::Refresh),
        Just(TokenPurpose::ResetPassword),
    ]
}

/// User ids and emails, the two kinds of subject the service issues
fn arb_subject() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<[u8; 16]>().prop_map(|b| uuid::Uuid::from_bytes(b).to_string()),
        "[a-z0-9_.+-]{1,20}@[a-z0-9-]{1,20}\\.[a-z]{2,4}",
    ]
}

/// Generate malformed token strings
fn arb_malformed_token() -> impl Strategy<Value = String> {
    prop_oneof![
        // No dots
        "[a-zA-Z0-9_-]{0,60}",
        // Wrong number of segments
        "[a-zA-Z0-9_-]{1,20}\\.[a-zA-Z0-9_-]{1,20}",
        "[a-zA-Z0-9_-]{1,20}(\\.[a-zA-Z0-9_-]{1,20}){3,5}",
        // Three segments of noise
        "[a-zA-Z0-9_-]{1,40}\\.[a-zA-Z0-9_-]{1,80}\\.[a-zA-Z0-9_-]{1,43}",
        // Non-base64 characters
        "[!@#$%^&*() ]{1,30}\\.[!@#$%^&*() ]{1,30}\\.[!@#$%^&*() ]{1,30}",
        Just("..".to_string()),
    ]
}

/// Generate secrets of a given length range
fn arb_secret(len: std::ops::Range<usize>) -> impl Strategy<Value = String> {
    prop::collection::vec(any::<u8>(), len)
        .prop_map(|bytes| bytes.iter().map(|b| (b % 94 + 33) as char).collect())
}

fn codec() -> TokenCodec {
    TokenCodec::new(&test_config())
}

// ============================================================================
// Codec Properties
// ============================================================================

proptest! {
    /// Property: issue -> verify returns the subject for the same purpose
    #[test]
    fn prop_issued_token_verifies(subject in arb_subject(), purpose in arb_purpose()) {
        let codec = codec();
        let issued = codec.issue(&subject, purpose).unwrap();
        prop_assert_eq!(codec.verify(&issued.token, purpose), Ok(subject));
    }

    /// Property: a token never verifies under a different purpose
    #[test]
    fn prop_purposes_are_isolated(
        subject in arb_subject(),
        issued_as in arb_purpose(),
        checked_as in arb_purpose(),
    ) {
        prop_assume!(issued_as != checked_as);
        let codec = codec();
        let issued = codec.issue(&subject, issued_as).unwrap();
        prop_assert_eq!(codec.verify(&issued.token, checked_as), Err(InvalidToken));
    }

    /// Property: malformed tokens never panic and never verify
    #[test]
    fn prop_malformed_token_rejected(token in arb_malformed_token(), purpose in arb_purpose()) {
        let codec = codec();
        prop_assert_eq!(codec.verify(&token, purpose), Err(InvalidToken));
    }

    /// Property: replacing any single character of a token is detected
    #[test]
    fn prop_token_tampering_detected(
        subject in arb_subject(),
        purpose in arb_purpose(),
        position in any::<prop::sample::Index>(),
        replacement in "[a-zA-Z0-9_-]",
    ) {
        let codec = codec();
        let issued = codec.issue(&subject, purpose).unwrap();

        let mut chars: Vec<char> = issued.token.chars().collect();
        let idx = position.index(chars.len());
        let new_char = replacement.chars().next().unwrap();
        // Dots delimit segments; swapping the final signature char can hit
        // base64 padding bits that decode to the same bytes, so skip both.
        prop_assume!(chars[idx] != '.' && chars[idx] != new_char && idx != chars.len() - 1);
        chars[idx] = new_char;
        let tampered: String = chars.into_iter().collect();

        prop_assert_eq!(codec.verify(&tampered, purpose), Err(InvalidToken));
    }

    /// Property: a codec with different secrets rejects every token
    #[test]
    fn prop_foreign_secret_rejected(subject in arb_subject(), purpose in arb_purpose()) {
        let foreign = AuthConfig::try_new(
            REFRESH_SECRET,
            RESET_SECRET,
            ACCESS_SECRET,
            "https://elsewhere.test",
        )
        .unwrap();
        let issued = TokenCodec::new(&foreign).issue(&subject, purpose).unwrap();
        prop_assert_eq!(codec().verify(&issued.token, purpose), Err(InvalidToken));
    }

    /// Property: digests are stable and never equal the token
    #[test]
    fn prop_hash_token_stable(token in "[a-zA-Z0-9._-]{1,200}") {
        let a = hash_token(&token);
        prop_assert_eq!(&a, &hash_token(&token));
        prop_assert_eq!(a.len(), 64);
        prop_assert_ne!(a, token);
    }
}

// ============================================================================
// Secret Validation Properties
// ============================================================================

proptest! {
    /// Property: secrets of 32+ bytes are accepted
    #[test]
    fn prop_valid_secret_accepted(key in arb_secret(32..96)) {
        prop_assert!(SigningSecret::new(&key).is_ok(), "{} bytes should be valid", key.len());
    }

    /// Property: secrets under 32 bytes are rejected
    #[test]
    fn prop_short_secret_rejected(key in arb_secret(0..32)) {
        prop_assert!(SigningSecret::new(&key).is_err(), "{} bytes should be rejected", key.len());
    }

    /// Property: constant_time_eq agrees with ==
    #[test]
    fn prop_constant_time_eq_matches_eq(
        a in prop::collection::vec(any::<u8>(), 0..64),
        b in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        prop_assert_eq!(constant_time_eq(&a, &b), a == b);
        prop_assert!(constant_time_eq(&a, &a.clone()));
    }
}

// ============================================================================
// Non-Property Edge Case Tests
// ============================================================================

#[test]
fn test_secret_exactly_32_bytes() {
    assert!(SigningSecret::new("a".repeat(32)).is_ok());
}

#[test]
fn test_secret_31_bytes_rejected() {
    assert!(SigningSecret::new("a".repeat(31)).is_err());
}

#[test]
fn test_reset_token_subject_is_email() {
    let codec = codec();
    let issued = codec
        .issue("ada@example.com", TokenPurpose::ResetPassword)
        .unwrap();
    assert_eq!(
        codec.verify(&issued.token, TokenPurpose::ResetPassword).unwrap(),
        "ada@example.com"
    );
}
