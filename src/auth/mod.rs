// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lumen Demo Wallet

//! Authentication: email one-time-code login via the identity provider,
//! session tokens, and the request extractor.

mod error;
mod extractor;
pub mod otp;
mod session;

pub use error::AuthError;
pub use extractor::Auth;
pub use session::{SessionClaims, SessionKeys};

use unicode_normalization::UnicodeNormalization;

/// The code accepted by the `dev` feature's provider-less login path.
#[cfg(feature = "dev")]
pub const DEV_LOGIN_CODE: &str = "000000";

/// Canonicalize an email address: trim, NFKC-normalize, lowercase.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().nfkc().collect::<String>().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  User@Example.COM "), "user@example.com");
    }

    #[test]
    fn emails_are_nfkc_normalized() {
        // U+FF21 FULLWIDTH LATIN CAPITAL LETTER A normalizes to plain "a".
        assert_eq!(normalize_email("\u{ff21}@example.com"), "a@example.com");
    }
}
