//! Property-based tests for token issuance, secret generation and hashing
//!
//! These tests verify:
//! - Any issued access token verifies back to its subject
//! - Tokens signed under another secret are always rejected
//! - Generated secrets decode to the requested number of bytes
//! - Hashed secrets verify against the original input and nothing else

use base64::{engine::general_purpose::STANDARD, Engine};
use proptest::prelude::*;
use std::sync::Arc;
use session_auth::auth::{generate_secret, hash_secret, verify_secret, TokenCodec};
use session_auth::clock::SystemClock;
use session_auth::error::TokenError;

const SECRET: &str = "proptest-signing-secret-at-least-32-chars";

fn codec(secret: &str) -> TokenCodec {
    TokenCodec::new(secret, Arc::new(SystemClock)).unwrap()
}

// ============================================================================
// Strategies
// ============================================================================

/// Non-empty subject identifiers, including non-ASCII text
fn arb_subject() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9_.@-]{1,40}",
        "\\PC{1,24}",
    ]
}

/// IPv4, IPv6 and free-form origins
fn arb_origin() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<[u8; 4]>().prop_map(|b| std::net::Ipv4Addr::from(b).to_string()),
        any::<[u8; 16]>().prop_map(|b| std::net::Ipv6Addr::from(b).to_string()),
        "\\PC{0,32}",
    ]
}

/// Arbitrary refresh secrets, empty and longer than bcrypt's 72-byte window included
fn arb_secret_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..128)
}

// ============================================================================
// Token Codec Properties
// ============================================================================

proptest! {
    /// Property: Verify(Issue(subject, origin)) yields the subject
    #[test]
    fn prop_issued_token_verifies_to_subject(subject in arb_subject(), origin in arb_origin()) {
        let codec = codec(SECRET);

        let token = codec.issue(&subject, &origin).unwrap();
        prop_assert_eq!(codec.verify(&token), Ok(subject));
    }

    /// Property: A token signed under any other secret is invalid
    #[test]
    fn prop_foreign_secret_rejected(
        subject in arb_subject(),
        other_secret in "[a-zA-Z0-9]{32,48}"
    ) {
        prop_assume!(other_secret != SECRET);

        let token = codec(&other_secret).issue(&subject, "10.0.0.1").unwrap();
        let result = codec(SECRET).verify(&token);
        prop_assert!(
            matches!(result, Err(TokenError::InvalidToken(_))),
            "Foreign token should be invalid, got {:?}",
            result
        );
    }
}

// ============================================================================
// Secret Generator Properties
// ============================================================================

proptest! {
    /// Property: Generated secrets decode to exactly the requested length
    #[test]
    fn prop_generated_secret_length(byte_length in 1usize..128) {
        let secret = generate_secret(byte_length).unwrap();
        let decoded = STANDARD.decode(&secret).unwrap();
        prop_assert_eq!(decoded.len(), byte_length);
    }
}

// ============================================================================
// Credential Hasher Properties
// ============================================================================

proptest! {
    // bcrypt runs at the default cost, so keep the case count small
    #![proptest_config(ProptestConfig::with_cases(8))]

    /// Property: Verify(Hash(x), x) is true for any byte string
    #[test]
    fn prop_hash_round_trips(secret in arb_secret_bytes()) {
        let hashed = hash_secret(&secret).unwrap();
        prop_assert!(verify_secret(&hashed, &secret).unwrap());
    }

    /// Property: Verify(Hash(x), y) is false for any y != x
    #[test]
    fn prop_hash_rejects_other_input(
        secret in arb_secret_bytes(),
        candidate in arb_secret_bytes()
    ) {
        prop_assume!(secret != candidate);

        let hashed = hash_secret(&secret).unwrap();
        prop_assert!(!verify_secret(&hashed, &candidate).unwrap());
    }
}
