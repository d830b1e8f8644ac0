//! Error types for `tether-core`.

use thiserror::Error;

use crate::contact::ContactId;

#[derive(Debug, Error)]
pub enum Error {
  // ── Request validation ────────────────────────────────────────────────

  #[error("an email or a phone number is required")]
  EmptyRequest,

  #[error("invalid email address: {0:?}")]
  InvalidEmail(String),

  // ── Stored-state invariants ───────────────────────────────────────────

  #[error("contact not found: {0}")]
  ContactNotFound(ContactId),

  #[error("contact {0} is not a primary contact")]
  NotPrimary(ContactId),

  #[error("contact {id} links to {linked_id}, which is not a primary contact")]
  BrokenLink { id: ContactId, linked_id: ContactId },

  #[error("cluster {0} has no primary contact")]
  MissingPrimary(ContactId),

  #[error("contact {contact} does not belong to cluster {primary}")]
  ForeignMember { contact: ContactId, primary: ContactId },

  #[error("lookup returned contact {0}, which matches neither the email nor the phone number")]
  UnrelatedMatch(ContactId),
}

impl Error {
  /// `true` for errors raised while validating a request, before any store
  /// access took place.
  pub fn is_validation(&self) -> bool {
    matches!(self, Self::EmptyRequest | Self::InvalidEmail(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
