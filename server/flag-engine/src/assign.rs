//! Senior-admin selection for Critical reports.

use crate::types::{AdminAccount, AdminRef};

/// Earliest-created admin account; equal timestamps fall back to the smaller id.
///
/// Returns None when no account has the admin role.
pub fn select_senior_admin(accounts: &[AdminAccount]) -> Option<AdminRef> {
  accounts
    .iter()
    .filter(|a| a.is_admin())
    .min_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)))
    .map(|a| AdminRef {
      id: a.id,
      name: a.name.clone(),
    })
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{TimeZone, Utc};

  fn account(id: i64, role: &str, day: u32) -> AdminAccount {
    AdminAccount {
      id,
      name: format!("user-{}", id),
      role: role.into(),
      created_at: Utc.with_ymd_and_hms(2024, 1, day, 8, 0, 0).unwrap(),
    }
  }

  #[test]
  fn picks_earliest_created_admin() {
    let accounts = vec![account(7, "admin", 5), account(3, "admin", 9), account(1, "employee", 1)];
    let picked = select_senior_admin(&accounts).unwrap();
    assert_eq!(picked.id, 7);
    assert_eq!(picked.name, "user-7");
  }

  #[test]
  fn equal_timestamps_use_smaller_id() {
    let accounts = vec![account(12, "admin", 2), account(4, "Admin", 2)];
    assert_eq!(select_senior_admin(&accounts).unwrap().id, 4);
  }

  #[test]
  fn no_admin_is_none() {
    let accounts = vec![account(1, "employee", 1), account(2, "manager", 2)];
    assert!(select_senior_admin(&accounts).is_none());
    assert!(select_senior_admin(&[]).is_none());
  }
}
