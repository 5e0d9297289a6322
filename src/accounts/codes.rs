use rand::Rng;
use time::{Duration, OffsetDateTime};

/// Codes stay valid for 15 minutes from issuance.
pub const CODE_TTL: Duration = Duration::minutes(15);

/// A freshly generated code together with its expiry instant.
#[derive(Debug, Clone)]
pub struct IssuedCode {
    pub code: String,
    pub expires_at: OffsetDateTime,
}

impl IssuedCode {
    pub fn issue() -> Self {
        Self {
            code: generate_code(),
            expires_at: OffsetDateTime::now_utc() + CODE_TTL,
        }
    }
}

/// Uniform 6-digit numeric code in 100000..=999999.
pub fn generate_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(100_000..=999_999))
}

/// One of the two per-user code slots (verification or reset), as a tagged
/// state instead of a pair of nullable columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeSlot {
    Empty,
    Pending {
        code: String,
        expires_at: OffsetDateTime,
    },
}

/// Outcome of checking a submitted code against a slot. Expiry is checked
/// before the match so a stale code reports as expired, not invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeCheck {
    Valid,
    NoCode,
    Expired,
    Mismatch,
}

impl CodeSlot {
    /// Both columns set means a pending code; anything else is an empty slot.
    pub fn from_columns(code: Option<String>, expires_at: Option<OffsetDateTime>) -> Self {
        match (code, expires_at) {
            (Some(code), Some(expires_at)) => Self::Pending { code, expires_at },
            _ => Self::Empty,
        }
    }

    /// Exact string comparison, no normalization. A code is live while
    /// `now <= expires_at`.
    pub fn check(&self, submitted: &str, now: OffsetDateTime) -> CodeCheck {
        match self {
            Self::Empty => CodeCheck::NoCode,
            Self::Pending { code, expires_at } => {
                if now > *expires_at {
                    CodeCheck::Expired
                } else if code != submitted {
                    CodeCheck::Mismatch
                } else {
                    CodeCheck::Valid
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(code: &str, expires_at: OffsetDateTime) -> CodeSlot {
        CodeSlot::Pending {
            code: code.into(),
            expires_at,
        }
    }

    #[test]
    fn generated_codes_are_six_digits_in_range() {
        for _ in 0..256 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            let n: u32 = code.parse().expect("numeric");
            assert!((100_000..=999_999).contains(&n));
        }
    }

    #[test]
    fn issued_code_expires_fifteen_minutes_out() {
        let before = OffsetDateTime::now_utc();
        let issued = IssuedCode::issue();
        let after = OffsetDateTime::now_utc();
        assert!(issued.expires_at >= before + CODE_TTL);
        assert!(issued.expires_at <= after + CODE_TTL);
    }

    #[test]
    fn matching_code_before_expiry_is_valid() {
        let now = OffsetDateTime::now_utc();
        let slot = pending("123456", now + CODE_TTL);
        assert_eq!(slot.check("123456", now), CodeCheck::Valid);
    }

    #[test]
    fn expiry_instant_is_inclusive() {
        let now = OffsetDateTime::now_utc();
        let slot = pending("123456", now);
        assert_eq!(slot.check("123456", now), CodeCheck::Valid);
    }

    #[test]
    fn past_expiry_wins_over_match() {
        let now = OffsetDateTime::now_utc();
        let slot = pending("123456", now - Duration::seconds(1));
        assert_eq!(slot.check("123456", now), CodeCheck::Expired);
        // A wrong code after expiry still reports expired.
        assert_eq!(slot.check("000000", now), CodeCheck::Expired);
    }

    #[test]
    fn mismatch_is_exact_string_compare() {
        let now = OffsetDateTime::now_utc();
        let slot = pending("012345", now + CODE_TTL);
        assert_eq!(slot.check("12345", now), CodeCheck::Mismatch);
        assert_eq!(slot.check("012345 ", now), CodeCheck::Mismatch);
        assert_eq!(slot.check("012345", now), CodeCheck::Valid);
    }

    #[test]
    fn empty_slot_reports_no_code() {
        let now = OffsetDateTime::now_utc();
        assert_eq!(CodeSlot::Empty.check("123456", now), CodeCheck::NoCode);
    }

    #[test]
    fn slot_requires_both_columns() {
        let now = OffsetDateTime::now_utc();
        assert_eq!(CodeSlot::from_columns(None, None), CodeSlot::Empty);
        assert_eq!(
            CodeSlot::from_columns(Some("123456".into()), None),
            CodeSlot::Empty
        );
        assert_eq!(CodeSlot::from_columns(None, Some(now)), CodeSlot::Empty);
        assert!(matches!(
            CodeSlot::from_columns(Some("123456".into()), Some(now)),
            CodeSlot::Pending { .. }
        ));
    }
}
