//! Stateless one-time confirmation codes.
//!
//! A code is `<issued_at base36>-<hmac>` where the HMAC-SHA256 covers the
//! issue time plus the user's id, email and last login time. Nothing is
//! stored server-side: a code stops verifying once it is older than the
//! configured TTL, or once the user's `last_login_at` changes, which happens
//! the moment a code is exchanged for an access token.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::types::{DbId, Timestamp};

type HmacSha256 = Hmac<Sha256>;

/// Number of hex characters of the MAC kept in the code.
pub const MAC_HEX_LENGTH: usize = 20;

/// Domain separator so the signing secret can be shared with other uses.
const KEY_SALT: &str = "yamdb.confirmation-code";

/// The user state a confirmation code is bound to.
#[derive(Debug, Clone, Copy)]
pub struct CodeSubject<'a> {
    pub user_id: DbId,
    pub email: &'a str,
    pub last_login_at: Option<Timestamp>,
}

/// Issue a confirmation code for `subject` at time `now`.
pub fn make_code(secret: &str, subject: &CodeSubject<'_>, now: Timestamp) -> String {
    let issued_at = now.timestamp().max(0) as u64;
    let ts = to_base36(issued_at);
    let digest = hex::encode(keyed_mac(secret, subject, &ts).finalize().into_bytes());
    format!("{ts}-{}", &digest[..MAC_HEX_LENGTH])
}

/// Verify `code` for `subject` at time `now`.
///
/// Rejects malformed codes, codes with a wrong MAC, codes issued in the
/// future, and codes older than `ttl_secs`.
pub fn check_code(
    secret: &str,
    subject: &CodeSubject<'_>,
    code: &str,
    now: Timestamp,
    ttl_secs: i64,
) -> bool {
    let Some((ts, mac)) = code.trim().split_once('-') else {
        return false;
    };
    let Some(issued_at) = from_base36(ts) else {
        return false;
    };

    let Ok(tag) = hex::decode(mac) else {
        return false;
    };
    if tag.len() != MAC_HEX_LENGTH / 2 {
        return false;
    }
    if keyed_mac(secret, subject, ts).verify_truncated_left(&tag).is_err() {
        return false;
    }

    let age = now.timestamp() - issued_at as i64;
    (0..=ttl_secs).contains(&age)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn keyed_mac(secret: &str, subject: &CodeSubject<'_>, ts: &str) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(format!("{KEY_SALT}{secret}").as_bytes())
        .expect("HMAC accepts any key length");
    let last_login = subject
        .last_login_at
        .map(|t| t.timestamp_micros().to_string())
        .unwrap_or_default();
    mac.update(format!("{}|{}|{}|{}", subject.user_id, subject.email, last_login, ts).as_bytes());
    mac
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}

fn from_base36(s: &str) -> Option<u64> {
    if s.is_empty() || s.len() > 13 {
        return None;
    }
    u64::from_str_radix(s, 36).ok()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    const SECRET: &str = "test-secret";
    const TTL: i64 = 3 * 24 * 3600;

    fn subject(last_login_at: Option<Timestamp>) -> CodeSubject<'static> {
        CodeSubject {
            user_id: 7,
            email: "reader@example.com",
            last_login_at,
        }
    }

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn issued_code_verifies() {
        let s = subject(None);
        let code = make_code(SECRET, &s, now());
        assert!(check_code(SECRET, &s, &code, now(), TTL));
        assert!(check_code(SECRET, &s, &code, now() + Duration::hours(1), TTL));
    }

    #[test]
    fn code_has_expected_shape() {
        let code = make_code(SECRET, &subject(None), now());
        let (ts, mac) = code.split_once('-').unwrap();
        assert_eq!(from_base36(ts), Some(now().timestamp() as u64));
        assert_eq!(mac.len(), MAC_HEX_LENGTH);
    }

    #[test]
    fn code_expires_after_ttl() {
        let s = subject(None);
        let code = make_code(SECRET, &s, now());
        let later = now() + Duration::seconds(TTL + 1);
        assert!(!check_code(SECRET, &s, &code, later, TTL));
    }

    #[test]
    fn code_from_the_future_is_rejected() {
        let s = subject(None);
        let code = make_code(SECRET, &s, now() + Duration::hours(1));
        assert!(!check_code(SECRET, &s, &code, now(), TTL));
    }

    #[test]
    fn login_invalidates_code() {
        let code = make_code(SECRET, &subject(None), now());
        let after_login = subject(Some(now()));
        assert!(!check_code(SECRET, &after_login, &code, now(), TTL));
    }

    #[test]
    fn other_user_or_secret_is_rejected() {
        let code = make_code(SECRET, &subject(None), now());
        let other = CodeSubject {
            user_id: 8,
            ..subject(None)
        };
        assert!(!check_code(SECRET, &other, &code, now(), TTL));
        assert!(!check_code("another-secret", &subject(None), &code, now(), TTL));
    }

    #[test]
    fn tampered_or_malformed_codes_are_rejected() {
        let s = subject(None);
        let code = make_code(SECRET, &s, now());
        let mut tampered = code.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == '0' { '1' } else { '0' });

        assert!(!check_code(SECRET, &s, &tampered, now(), TTL));
        assert!(!check_code(SECRET, &s, "", now(), TTL));
        assert!(!check_code(SECRET, &s, "no-dash-here-at-all", now(), TTL));
        assert!(!check_code(SECRET, &s, "zzzzzzzzzzzzzzzz-abc", now(), TTL));
    }

    #[test]
    fn truncated_mac_is_rejected() {
        let s = subject(None);
        let code = make_code(SECRET, &s, now());
        let short = &code[..code.len() - 2];
        assert!(!check_code(SECRET, &s, short, now(), TTL));
        assert!(!check_code(SECRET, &s, &format!("{code}00"), now(), TTL));
    }

    #[test]
    fn base36_round_trips_known_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(from_base36("10"), Some(36));
    }
}
