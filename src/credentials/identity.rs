//! Caller identity normalization.

use crate::http::event::Claims;

/// Derive the environment-safe identity token from the caller's claims.
///
/// Whitespace and anything that is not ASCII alphanumeric or `_` becomes
/// `_`. Returns `None` if the claim is missing or empty.
pub fn identity_token(claims: &Claims, claim_name: &str) -> Option<String> {
    let raw = claims.get_str(claim_name)?;
    if raw.is_empty() {
        return None;
    }
    Some(normalize(&raw))
}

pub fn normalize(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
