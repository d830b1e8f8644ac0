//! The `ContactStore` and `UnitOfWork` traits.
//!
//! Storage backends (e.g. `tether-store-sqlite`) implement both. The resolver
//! only ever talks to a [`ContactStore`] handed to it by
//! [`UnitOfWork::transact`], so every lookup and mutation of one identify
//! request lands in the same transaction.

use std::future::Future;

use crate::contact::{Contact, ContactId, NewContact};

// ─── Transaction-bound store ─────────────────────────────────────────────────

/// Contact operations available inside a unit of work.
///
/// Calls are synchronous: the unit of work already runs on whatever thread
/// owns the underlying transaction.
pub trait ContactStore {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Every contact whose email equals `email` or whose phone number equals
  /// `phone_number`, ordered by creation time. An absent argument matches
  /// nothing.
  fn find_by_email_or_phone(
    &self,
    email: Option<&str>,
    phone_number: Option<&str>,
  ) -> Result<Vec<Contact>, Self::Error>;

  /// The primary `primary_id` and every contact linked to it, ordered by
  /// creation time.
  fn find_cluster(&self, primary_id: ContactId) -> Result<Vec<Contact>, Self::Error>;

  /// Fetch a single contact. Returns `None` if not found.
  fn get(&self, id: ContactId) -> Result<Option<Contact>, Self::Error>;

  /// Persist a new contact and return its assigned id.
  fn create(&self, input: NewContact) -> Result<ContactId, Self::Error>;

  /// Turn the primary `id` into a secondary linked to `new_primary_id`.
  ///
  /// Fails if `id` is not currently a primary.
  fn demote_to_secondary(
    &self,
    id: ContactId,
    new_primary_id: ContactId,
  ) -> Result<(), Self::Error>;

  /// Re-point every secondary linked to `from` at `to`. Returns the number of
  /// contacts changed.
  fn relink_all(&self, from: ContactId, to: ContactId) -> Result<usize, Self::Error>;
}

// ─── Unit of work ────────────────────────────────────────────────────────────

/// A source of serialisable transactions over the contact store.
///
/// `transact` commits only if `work` returns `Ok`; on `Err` every mutation
/// made through the handle is rolled back before the error is returned.
pub trait UnitOfWork: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn transact<F, R>(
    &self,
    work: F,
  ) -> impl Future<Output = Result<R, Self::Error>> + Send + '_
  where
    F: FnOnce(&dyn ContactStore<Error = Self::Error>) -> Result<R, Self::Error>
      + Send
      + 'static,
    R: Send + 'static;
}
