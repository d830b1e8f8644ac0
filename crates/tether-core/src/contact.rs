//! Contact — a single identity record.
//!
//! Contacts are grouped into clusters: one primary contact plus every
//! secondary whose link points at it. A contact is created once and is never
//! deleted; the only mutation it ever sees is a one-way demotion from primary
//! to secondary when two clusters merge.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Identifier ──────────────────────────────────────────────────────────────

/// Store-assigned contact identifier.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ContactId(pub i64);

impl fmt::Display for ContactId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

impl From<i64> for ContactId {
  fn from(id: i64) -> Self { Self(id) }
}

// ─── Linkage ─────────────────────────────────────────────────────────────────

/// Whether a contact is the canonical record of its cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkPrecedence {
  Primary,
  Secondary,
}

/// A contact's position in its cluster.
///
/// The back-reference is a lookup key only; it is resolved through the store
/// and never owns the referenced contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "linkPrecedence", rename_all = "lowercase")]
pub enum Link {
  Primary,
  Secondary {
    #[serde(rename = "linkedId")]
    linked_id: ContactId,
  },
}

impl Link {
  pub fn precedence(&self) -> LinkPrecedence {
    match self {
      Self::Primary => LinkPrecedence::Primary,
      Self::Secondary { .. } => LinkPrecedence::Secondary,
    }
  }

  pub fn linked_id(&self) -> Option<ContactId> {
    match self {
      Self::Primary => None,
      Self::Secondary { linked_id } => Some(*linked_id),
    }
  }
}

// ─── Contact ─────────────────────────────────────────────────────────────────

/// A persisted contact record. At least one of `email` and `phone_number` is
/// always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
  pub id:           ContactId,
  pub email:        Option<String>,
  pub phone_number: Option<String>,
  #[serde(flatten)]
  pub link:         Link,
  pub created_at:   DateTime<Utc>,
  /// Stamped at creation and again on every re-link or demotion.
  pub updated_at:   DateTime<Utc>,
}

impl Contact {
  pub fn is_primary(&self) -> bool { matches!(self.link, Link::Primary) }

  pub fn precedence(&self) -> LinkPrecedence { self.link.precedence() }

  pub fn linked_id(&self) -> Option<ContactId> { self.link.linked_id() }

  /// The id of the primary this contact belongs to: its own id when it is
  /// the primary, its link otherwise.
  pub fn primary_id(&self) -> ContactId {
    self.link.linked_id().unwrap_or(self.id)
  }

  /// `true` if `self` was created before `other`.
  ///
  /// Identical timestamps fall back to the lower id, so the ordering is total
  /// and stable regardless of clock resolution.
  pub fn is_older_than(&self, other: &Contact) -> bool {
    (self.created_at, self.id) < (other.created_at, other.id)
  }
}

// ─── Creation input ──────────────────────────────────────────────────────────

/// Input for [`ContactStore::create`](crate::store::ContactStore::create).
/// `id`, `created_at` and `updated_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
  pub email:        Option<String>,
  pub phone_number: Option<String>,
  pub link:         Link,
}

impl NewContact {
  pub fn primary(email: Option<String>, phone_number: Option<String>) -> Self {
    Self { email, phone_number, link: Link::Primary }
  }

  pub fn secondary(
    email: Option<String>,
    phone_number: Option<String>,
    linked_id: ContactId,
  ) -> Self {
    Self { email, phone_number, link: Link::Secondary { linked_id } }
  }
}
