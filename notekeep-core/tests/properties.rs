//! Property-based tests for notekeep core

use notekeep_core::auth::*;
use notekeep_core::*;
use proptest::prelude::*;
use std::time::Duration;

fn token_service(ttl_secs: u64) -> TokenService {
    let key = SigningKey::from_secret(b"property-test-signing-secret").unwrap();
    TokenService::new(key, Duration::from_secs(ttl_secs)).unwrap()
}

proptest! {
    #[test]
    fn props_token_accepted_strictly_before_expiry(
        user in 1u64..1_000_000,
        issued_at in 1_600_000_000u64..1_900_000_000,
        ttl in 1u64..7200,
        offset in 0u64..14_400,
    ) {
        let tokens = token_service(ttl);
        let issued = tokens.issue_at(UserId::new(user), issued_at).unwrap();
        let result = tokens.verify_at(issued.token(), issued_at + offset);

        if offset < ttl {
            prop_assert_eq!(result.unwrap(), UserId::new(user));
        } else {
            prop_assert!(matches!(result, Err(NotekeepError::Unauthorized)));
        }
    }

    #[test]
    fn props_selector_digits_try_id_first(id in any::<u64>()) {
        let raw = id.to_string();
        let selector = NoteSelector::parse(&raw).unwrap();
        prop_assert_eq!(selector.id(), Some(NoteId::new(id)));
        prop_assert_eq!(selector.title(), Some(raw.as_str()));
    }

    #[test]
    fn props_selector_text_is_title(raw in "[a-zA-Z][a-zA-Z0-9 _-]{0,40}") {
        let selector = NoteSelector::parse(&raw).unwrap();
        prop_assert_eq!(selector.id(), None);
        prop_assert_eq!(selector.title(), Some(raw.as_str()));
    }
}

proptest! {
    // Argon2 is deliberately slow; a handful of cases is enough
    #![proptest_config(ProptestConfig::with_cases(6))]

    #[test]
    fn props_hash_verify_roundtrip(
        password in "[ -~]{1,32}",
        other in "[ -~]{1,32}",
    ) {
        let digest = hash_password(&password).unwrap();
        prop_assert!(verify_password(&password, &digest));

        if other != password {
            prop_assert!(!verify_password(&other, &digest));
        }
    }
}
