//! Flattening a cluster into its public, deduplicated view.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  contact::{Contact, ContactId},
};

/// One person's consolidated contact information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedContact {
  pub primary_contact_id:    ContactId,
  /// The primary's email first, then every other distinct email in cluster
  /// order.
  pub emails:                Vec<String>,
  /// Same ordering rule as `emails`.
  pub phone_numbers:         Vec<String>,
  pub secondary_contact_ids: Vec<ContactId>,
}

/// Flatten the cluster of `primary_id`.
///
/// `cluster` must hold the primary and only contacts linked to it, ordered by
/// creation time as the store returns them. Emails and phone numbers are
/// deduplicated independently of each other.
pub fn flatten(primary_id: ContactId, cluster: &[Contact]) -> Result<ConsolidatedContact> {
  let primary = cluster
    .iter()
    .find(|c| c.id == primary_id && c.is_primary())
    .ok_or(Error::MissingPrimary(primary_id))?;

  let mut emails = Vec::new();
  let mut phone_numbers = Vec::new();
  push_distinct(&mut emails, primary.email.as_deref());
  push_distinct(&mut phone_numbers, primary.phone_number.as_deref());

  let mut secondary_contact_ids = Vec::new();
  for contact in cluster.iter().filter(|c| c.id != primary_id) {
    if contact.linked_id() != Some(primary_id) {
      return Err(Error::ForeignMember { contact: contact.id, primary: primary_id });
    }
    push_distinct(&mut emails, contact.email.as_deref());
    push_distinct(&mut phone_numbers, contact.phone_number.as_deref());
    secondary_contact_ids.push(contact.id);
  }

  Ok(ConsolidatedContact {
    primary_contact_id: primary_id,
    emails,
    phone_numbers,
    secondary_contact_ids,
  })
}

fn push_distinct(values: &mut Vec<String>, value: Option<&str>) {
  match value {
    Some(v) if !v.is_empty() && !values.iter().any(|seen| seen == v) => {
      values.push(v.to_owned());
    }
    _ => {}
  }
}
