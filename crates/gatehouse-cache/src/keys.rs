//! Cache key builders for authorization decisions.
//!
//! Every decision for a user lives under the `"{user_id}:"` prefix, so a
//! single prefix delete drops all of them at once.

use uuid::Uuid;

/// Cache key for the decision reached for `token` on behalf of `user_id`.
pub fn decision(user_id: Uuid, token: &str) -> String {
    format!("{}{token}", decision_user_prefix(user_id))
}

/// Prefix shared by every cached decision of a user.
pub fn decision_user_prefix(user_id: Uuid) -> String {
    format!("{user_id}:")
}

/// Escape Redis glob metacharacters so `s` matches literally in `SCAN MATCH`.
pub fn escape_glob(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\' | '^') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_key() {
        let id = Uuid::nil();
        assert_eq!(
            decision(id, "abc.def.ghi"),
            "00000000-0000-0000-0000-000000000000:abc.def.ghi"
        );
        assert!(decision(id, "t").starts_with(&decision_user_prefix(id)));
    }

    #[test]
    fn test_escape_glob() {
        assert_eq!(escape_glob("gatehouse:"), "gatehouse:");
        assert_eq!(escape_glob("a*b?[c]"), "a\\*b\\?\\[c\\]");
    }
}
