//! Integration tests for gift card code generation and parsing.

use std::collections::HashSet;

use atl_urban_farms_core::{CODE_ALPHABET, CODE_LENGTH, GiftCardCode};

/// Generating 10,000 codes yields 10,000 distinct values. Collisions are
/// handled by the issuance retry loop, but at 31^12 possibilities a clash in
/// this sample would mean the generator is broken.
#[test]
fn test_ten_thousand_codes_are_unique() {
    let mut rng = rand::rng();
    let mut seen = HashSet::with_capacity(10_000);

    for _ in 0..10_000 {
        let code = GiftCardCode::generate(&mut rng);
        assert_eq!(code.as_str().len(), CODE_LENGTH);
        assert!(code.as_str().bytes().all(|b| CODE_ALPHABET.contains(&b)));
        assert!(seen.insert(code.into_inner()), "duplicate code generated");
    }
}

/// Every generated code survives a round trip through customer-style input:
/// lowercased with stray whitespace.
#[test]
fn test_generated_codes_parse_back() {
    let mut rng = rand::rng();

    for _ in 0..100 {
        let code = GiftCardCode::generate(&mut rng);
        let typed = format!(" {} ", code.as_str().to_ascii_lowercase());
        let parsed = GiftCardCode::parse(&typed).expect("customer input parses");
        assert_eq!(parsed, code);
    }
}

#[test]
fn test_confusable_input_is_rejected_not_guessed() {
    // "0" and "O" are both outside the alphabet; the parser reports the
    // offending character rather than substituting.
    let err = GiftCardCode::parse("ABCDEFGH2O45").expect_err("O is invalid");
    assert!(err.to_string().contains('O'));
}

#[test]
fn test_codes_serialize_as_plain_strings() {
    let mut rng = rand::rng();
    let code = GiftCardCode::generate(&mut rng);

    let json = serde_json::to_string(&code).expect("serialize");
    assert_eq!(json, format!("\"{}\"", code.as_str()));

    let back: GiftCardCode = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, code);
}
