//! Gift card code generation and validation.
//!
//! Codes are the human-facing identifier printed in gift card emails, so the
//! alphabet excludes visually confusable characters (`0`/`O`, `1`/`I`/`L`).
//! Generation is a pure function of the caller's RNG; the database's unique
//! index on `code` is the authoritative uniqueness guarantee, and issuance
//! retries with a fresh code on a detected collision.

use core::fmt;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

/// Characters a gift card code may contain.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Fixed length of every gift card code.
pub const CODE_LENGTH: usize = 12;

/// Errors that can occur when parsing a [`GiftCardCode`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum CodeError {
    /// The input is not exactly [`CODE_LENGTH`] characters.
    #[error("gift card code must be exactly {expected} characters (got {got})")]
    WrongLength {
        /// Required length.
        expected: usize,
        /// Actual length of the input.
        got: usize,
    },
    /// The input contains a character outside [`CODE_ALPHABET`].
    #[error("gift card code contains invalid character '{0}'")]
    InvalidCharacter(char),
}

/// A gift card code: 12 characters from an unambiguous alphanumeric alphabet.
///
/// At 31^12 possible codes, collisions at realistic issuance volumes are
/// vanishingly rare, but they are still handled: the persistence layer
/// enforces uniqueness and issuance regenerates on conflict.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct GiftCardCode(String);

impl GiftCardCode {
    /// Generate a fresh random code from the given RNG.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..CODE_LENGTH)
            .map(|_| char::from(CODE_ALPHABET.choose(rng).copied().unwrap_or(b'A')))
            .collect();
        Self(code)
    }

    /// Parse a code from user input.
    ///
    /// Lowercase letters are accepted and normalized to uppercase, since
    /// customers type codes from printed emails.
    ///
    /// # Errors
    ///
    /// Returns an error if the input has the wrong length or contains a
    /// character outside the code alphabet.
    pub fn parse(s: &str) -> Result<Self, CodeError> {
        let normalized = s.trim().to_ascii_uppercase();

        if normalized.len() != CODE_LENGTH {
            return Err(CodeError::WrongLength {
                expected: CODE_LENGTH,
                got: normalized.len(),
            });
        }

        if let Some(bad) = normalized
            .chars()
            .find(|c| !CODE_ALPHABET.contains(&(*c as u8)))
        {
            return Err(CodeError::InvalidCharacter(bad));
        }

        Ok(Self(normalized))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the code and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the last four characters, for display in card listings.
    #[must_use]
    pub fn last_four(&self) -> &str {
        let split = self.0.len().saturating_sub(4);
        self.0.get(split..).unwrap_or(&self.0)
    }
}

impl fmt::Display for GiftCardCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for GiftCardCode {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for GiftCardCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for GiftCardCode {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for GiftCardCode {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for GiftCardCode {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_code_shape() {
        let mut rng = rand::rng();
        let code = GiftCardCode::generate(&mut rng);
        assert_eq!(code.as_str().len(), CODE_LENGTH);
        assert!(
            code.as_str()
                .bytes()
                .all(|b| CODE_ALPHABET.contains(&b))
        );
    }

    #[test]
    fn test_alphabet_excludes_confusable_characters() {
        for confusable in [b'0', b'O', b'1', b'I', b'L'] {
            assert!(
                !CODE_ALPHABET.contains(&confusable),
                "alphabet must not contain {}",
                char::from(confusable)
            );
        }
    }

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        let mut rng = rand::rng();
        let code = GiftCardCode::generate(&mut rng);
        let sloppy = format!("  {}  ", code.as_str().to_ascii_lowercase());
        let parsed = GiftCardCode::parse(&sloppy).unwrap();
        assert_eq!(parsed, code);
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(matches!(
            GiftCardCode::parse("ABC"),
            Err(CodeError::WrongLength { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_invalid_characters() {
        assert!(matches!(
            GiftCardCode::parse("ABCDEFGH2340"),
            Err(CodeError::InvalidCharacter('0'))
        ));
    }

    #[test]
    fn test_last_four() {
        let code = GiftCardCode::parse("ABCDEFGH2345").unwrap();
        assert_eq!(code.last_four(), "2345");
    }

    #[test]
    fn test_generated_codes_are_distinct() {
        // Probabilistic, but at 31^12 possibilities 10,000 draws colliding
        // would indicate a broken generator.
        let mut rng = rand::rng();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(GiftCardCode::generate(&mut rng).into_inner()));
        }
    }
}
