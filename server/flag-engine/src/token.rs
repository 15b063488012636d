//! Report tokens and anonymised submitter identities.
//!
//! Both are keyed blake3 digests. The key is derived from a server-side secret, so neither
//! token can be recomputed (or brute-forced over employee ids) from the public report fields.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::types::ReportId;

const KEY_CONTEXT: &str = "safeshift report tokens 2025-01 v1";

/// Secret hashing key for report tokens.
#[derive(Clone)]
pub struct TokenKey([u8; 32]);

impl TokenKey {
  pub fn from_secret(secret: &str) -> Self {
    Self(blake3::derive_key(KEY_CONTEXT, secret.as_bytes()))
  }
}

impl fmt::Debug for TokenKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("TokenKey(..)")
  }
}

/// Report token: "REP-" + first 16 hex chars of a keyed digest over
/// title + department + submission time. The submitter never enters the token.
pub fn report_id(key: &TokenKey, title: &str, department: &str, submitted_at: &DateTime<Utc>) -> ReportId {
  let mut hasher = blake3::Hasher::new_keyed(&key.0);
  hasher.update(b"report\0");
  hasher.update(title.as_bytes());
  hasher.update(b"|");
  hasher.update(department.as_bytes());
  hasher.update(b"|");
  hasher.update(submitted_at.to_rfc3339().as_bytes());
  let hex = hasher.finalize().to_hex();
  ReportId(format!("REP-{}", &hex[..16]))
}

/// Anonymous submitter token. Mixing in the report id keeps two reports from the same person unlinkable.
pub fn anonymise(key: &TokenKey, submitted_by: &str, report: &ReportId) -> String {
  let mut hasher = blake3::Hasher::new_keyed(&key.0);
  hasher.update(b"submitter\0");
  hasher.update(submitted_by.as_bytes());
  hasher.update(b"|");
  hasher.update(report.0.as_bytes());
  let hex = hasher.finalize().to_hex();
  format!("anon-{}", &hex[..12])
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 2, 10, 14, 30, 0).unwrap()
  }

  fn key() -> TokenKey {
    TokenKey::from_secret("test-secret")
  }

  #[test]
  fn same_input_same_id() {
    let a = report_id(&key(), "Spill", "Warehouse", &at());
    let b = report_id(&key(), "Spill", "Warehouse", &at());
    assert_eq!(a, b);
  }

  #[test]
  fn id_shape() {
    let id = report_id(&key(), "Spill", "Warehouse", &at());
    assert!(id.0.starts_with("REP-"));
    assert_eq!(id.0.len(), 4 + 16);
    assert!(id.0[4..].chars().all(|c| c.is_ascii_hexdigit()));
  }

  #[test]
  fn different_department_different_id() {
    let a = report_id(&key(), "Spill", "Warehouse", &at());
    let b = report_id(&key(), "Spill", "Kitchen", &at());
    assert_ne!(a, b);
  }

  #[test]
  fn id_depends_on_key() {
    let other = TokenKey::from_secret("another-secret");
    assert_ne!(
      report_id(&key(), "Spill", "Warehouse", &at()),
      report_id(&other, "Spill", "Warehouse", &at())
    );
  }

  #[test]
  fn anonymised_identity_hides_submitter() {
    let id = report_id(&key(), "Spill", "Warehouse", &at());
    let anon = anonymise(&key(), "EMP-1", &id);
    assert!(anon.starts_with("anon-"));
    assert_eq!(anon.len(), 5 + 12);
    assert!(!anon.contains("EMP-1"));

    let other = report_id(&key(), "Other", "Warehouse", &at());
    assert_ne!(anon, anonymise(&key(), "EMP-1", &other));
  }

  #[test]
  fn anonymised_identity_needs_the_key() {
    let id = report_id(&key(), "Spill", "Warehouse", &at());
    let stored = anonymise(&key(), "EMP-000417", &id);

    // Without the secret, no candidate employee id reproduces the stored token.
    let guess = TokenKey::from_secret("");
    let recovered = (0..1000)
      .map(|n| format!("EMP-{:06}", n))
      .find(|candidate| anonymise(&guess, candidate, &id) == stored);
    assert_eq!(recovered, None);
  }

  #[test]
  fn debug_does_not_print_key_bytes() {
    assert_eq!(format!("{:?}", key()), "TokenKey(..)");
  }
}
