//! Password policy applied to new registrations.
//!
//! The rules are deliberately narrow:
//! - length between [`PASSWORD_MIN_LEN`] and [`PASSWORD_MAX_LEN`] inclusive,
//!   counted in UTF-16 code units;
//! - at least one ASCII uppercase letter;
//! - at least one ASCII digit;
//! - at least one character from [`PASSWORD_SYMBOLS`].
//!
//! Lowercase letters are not required, the password is not compared against
//! the username or email, and no Unicode normalisation is applied.

use std::fmt;

/// Minimum accepted password length.
pub const PASSWORD_MIN_LEN: usize = 8;
/// Maximum accepted password length.
pub const PASSWORD_MAX_LEN: usize = 12;
/// Symbols that satisfy the "special character" rule.
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*()_-=[]{};:'\"\\|,.<>/?";

/// The first policy rule a password fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPolicyViolation {
    /// Fewer than [`PASSWORD_MIN_LEN`] code units.
    TooShort { min: usize },
    /// More than [`PASSWORD_MAX_LEN`] code units.
    TooLong { max: usize },
    /// No `A-Z` character.
    MissingUppercase,
    /// No `0-9` character.
    MissingDigit,
    /// No character from [`PASSWORD_SYMBOLS`].
    MissingSymbol,
}

impl PasswordPolicyViolation {
    /// Stable machine-readable code used in error details.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::TooShort { .. } => "too_short",
            Self::TooLong { .. } => "too_long",
            Self::MissingUppercase => "missing_uppercase",
            Self::MissingDigit => "missing_digit",
            Self::MissingSymbol => "missing_symbol",
        }
    }
}

impl fmt::Display for PasswordPolicyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { min } => write!(f, "password must be at least {min} characters"),
            Self::TooLong { max } => write!(f, "password must be at most {max} characters"),
            Self::MissingUppercase => write!(f, "password must contain an uppercase letter"),
            Self::MissingDigit => write!(f, "password must contain a digit"),
            Self::MissingSymbol => write!(f, "password must contain a symbol"),
        }
    }
}

impl std::error::Error for PasswordPolicyViolation {}

/// Check `password` against every rule, returning the first violation.
///
/// Rules are evaluated in a fixed order: length, uppercase, digit, symbol.
///
/// # Examples
/// ```
/// use registration::domain::{PasswordPolicyViolation, check_password};
///
/// assert_eq!(check_password("Abcdefg1!"), Ok(()));
/// assert_eq!(
///     check_password("abcdefg1!"),
///     Err(PasswordPolicyViolation::MissingUppercase)
/// );
/// ```
pub fn check_password(password: &str) -> Result<(), PasswordPolicyViolation> {
    let length = password.encode_utf16().count();
    if length < PASSWORD_MIN_LEN {
        return Err(PasswordPolicyViolation::TooShort {
            min: PASSWORD_MIN_LEN,
        });
    }
    if length > PASSWORD_MAX_LEN {
        return Err(PasswordPolicyViolation::TooLong {
            max: PASSWORD_MAX_LEN,
        });
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(PasswordPolicyViolation::MissingUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordPolicyViolation::MissingDigit);
    }
    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        return Err(PasswordPolicyViolation::MissingSymbol);
    }
    Ok(())
}

/// Boolean form of [`check_password`].
#[must_use]
pub fn is_valid_password(password: &str) -> bool {
    check_password(password).is_ok()
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Ab1!23", false)]
    #[case("Abcdefg1!", true)]
    #[case("abcdefg1!", false)]
    #[case("Abcdefgh!", false)]
    #[case("Abcdefg12", false)]
    #[case("Ab1!23456789", true)]
    #[case("Ab1!234567890", false)]
    #[case("Abcdef1!", true)]
    #[case("Abcde1!", false)]
    fn predicate_matches_policy(#[case] password: &str, #[case] expected: bool) {
        assert_eq!(is_valid_password(password), expected, "password {password:?}");
    }

    #[rstest]
    #[case("Ab1!23", PasswordPolicyViolation::TooShort { min: PASSWORD_MIN_LEN })]
    #[case("Ab1!234567890", PasswordPolicyViolation::TooLong { max: PASSWORD_MAX_LEN })]
    #[case("abcdefg1!", PasswordPolicyViolation::MissingUppercase)]
    #[case("Abcdefgh!", PasswordPolicyViolation::MissingDigit)]
    #[case("Abcdefg12", PasswordPolicyViolation::MissingSymbol)]
    fn reports_first_violation(#[case] password: &str, #[case] expected: PasswordPolicyViolation) {
        assert_eq!(check_password(password), Err(expected));
    }

    #[test]
    fn thirteen_characters_are_rejected() {
        // "Ab1!23456789" is twelve characters; one more tips it over.
        let password = "Ab1!23456789X";
        assert_eq!(password.len(), 13);
        assert!(!is_valid_password(password));
    }

    #[rstest]
    #[case('!')]
    #[case('@')]
    #[case('#')]
    #[case('$')]
    #[case('%')]
    #[case('^')]
    #[case('&')]
    #[case('*')]
    #[case('(')]
    #[case(')')]
    #[case('_')]
    #[case('-')]
    #[case('=')]
    #[case('[')]
    #[case(']')]
    #[case('{')]
    #[case('}')]
    #[case(';')]
    #[case(':')]
    #[case('\'')]
    #[case('"')]
    #[case('\\')]
    #[case('|')]
    #[case(',')]
    #[case('.')]
    #[case('<')]
    #[case('>')]
    #[case('/')]
    #[case('?')]
    fn every_listed_symbol_satisfies_the_rule(#[case] symbol: char) {
        let password = format!("Abcdef1{symbol}");
        assert!(is_valid_password(&password), "symbol {symbol:?} should count");
    }

    #[rstest]
    #[case('+')]
    #[case('~')]
    #[case('`')]
    #[case(' ')]
    #[case('€')]
    fn unlisted_symbols_do_not_count(#[case] symbol: char) {
        let password = format!("Abcdef12{symbol}");
        assert_eq!(
            check_password(&password),
            Err(PasswordPolicyViolation::MissingSymbol)
        );
    }

    #[test]
    fn non_ascii_uppercase_does_not_count() {
        assert_eq!(
            check_password("Ébcdef1!"),
            Err(PasswordPolicyViolation::MissingUppercase)
        );
    }

    #[test]
    fn length_counts_utf16_code_units() {
        // Each emoji is two UTF-16 code units: 6 + 2 * 3 = 12 units accepted,
        // a fourth emoji makes 14 units.
        assert!(is_valid_password("Ab1!cd😀😀😀"));
        assert_eq!(
            check_password("Ab1!cd😀😀😀😀"),
            Err(PasswordPolicyViolation::TooLong {
                max: PASSWORD_MAX_LEN
            })
        );
    }

    #[test]
    fn lowercase_is_not_required() {
        assert!(is_valid_password("ABCDEFG1!"));
    }
}
