//! The identity resolver.
//!
//! Given a validated request, [`resolve`] classifies it against the contacts
//! that share its email or phone number and applies the smallest mutation
//! that leaves the store consistent:
//!
//! | Match set | Request | Mutation |
//! |-----------|---------|----------|
//! | empty | any | create a primary |
//! | non-empty | one field | none |
//! | one side unmatched | both fields | create a secondary |
//! | both sides, same cluster | both fields | none |
//! | both sides, different clusters | both fields | merge |
//!
//! It then re-reads the resulting cluster and flattens it.

use tracing::{debug, info};

use crate::{
  Error,
  consolidate::{ConsolidatedContact, flatten},
  contact::{Contact, ContactId, NewContact},
  request::IdentifyRequest,
  store::{ContactStore, UnitOfWork},
};

/// Resolve `request` inside a fresh unit of work, committing every mutation
/// together or none of them.
pub async fn identify<U>(
  unit: &U,
  request: IdentifyRequest,
) -> Result<ConsolidatedContact, U::Error>
where
  U: UnitOfWork,
  U::Error: From<Error>,
{
  unit.transact(move |store| resolve(store, &request)).await
}

/// Resolve `request` against `store`, which must be bound to a single
/// transaction for the whole call.
pub fn resolve<S>(store: &S, request: &IdentifyRequest) -> Result<ConsolidatedContact, S::Error>
where
  S: ContactStore + ?Sized,
  S::Error: From<Error>,
{
  let email = request.email();
  let phone_number = request.phone_number();
  let matches = store.find_by_email_or_phone(email, phone_number)?;

  let Some(first) = matches.first() else {
    let id = store.create(NewContact::primary(
      email.map(str::to_owned),
      phone_number.map(str::to_owned),
    ))?;
    info!(contact_id = %id, "created primary contact");
    return consolidate(store, id);
  };

  if !request.is_full() {
    let primary_id = first.primary_id();
    debug!(primary_id = %primary_id, "partial request matched existing cluster");
    return consolidate(store, primary_id);
  }

  let by_email = matches.iter().find(|c| c.email.as_deref() == email);
  let by_phone = matches.iter().find(|c| c.phone_number.as_deref() == phone_number);

  let primary_id = match (by_email, by_phone) {
    (Some(by_email), Some(by_phone)) => {
      let a = primary_of(store, by_email)?;
      let b = primary_of(store, by_phone)?;
      if a.id == b.id {
        debug!(primary_id = %a.id, "request carries no new information");
        a.id
      } else {
        merge(store, a, b)?
      }
    }
    (Some(known), None) | (None, Some(known)) => {
      let primary_id = primary_of(store, known)?.id;
      let id = store.create(NewContact::secondary(
        email.map(str::to_owned),
        phone_number.map(str::to_owned),
        primary_id,
      ))?;
      info!(contact_id = %id, primary_id = %primary_id, "attached secondary contact");
      primary_id
    }
    (None, None) => return Err(Error::UnrelatedMatch(first.id).into()),
  };

  consolidate(store, primary_id)
}

/// Fold the newer of two primaries (and its secondaries) into the older one.
/// Returns the surviving primary's id.
fn merge<S>(store: &S, a: Contact, b: Contact) -> Result<ContactId, S::Error>
where
  S: ContactStore + ?Sized,
  S::Error: From<Error>,
{
  let (survivor, absorbed) = if a.is_older_than(&b) { (a, b) } else { (b, a) };

  // Re-link first so no secondary is ever left pointing at a demoted contact.
  let relinked = store.relink_all(absorbed.id, survivor.id)?;
  store.demote_to_secondary(absorbed.id, survivor.id)?;

  info!(
    survivor = %survivor.id,
    absorbed = %absorbed.id,
    relinked,
    "merged identity clusters"
  );
  Ok(survivor.id)
}

/// The primary record of `contact`'s cluster.
fn primary_of<S>(store: &S, contact: &Contact) -> Result<Contact, S::Error>
where
  S: ContactStore + ?Sized,
  S::Error: From<Error>,
{
  let Some(linked_id) = contact.linked_id() else {
    return Ok(contact.clone());
  };
  match store.get(linked_id)? {
    Some(primary) if primary.is_primary() => Ok(primary),
    Some(_) => Err(Error::BrokenLink { id: contact.id, linked_id }.into()),
    None => Err(Error::ContactNotFound(linked_id).into()),
  }
}

fn consolidate<S>(store: &S, primary_id: ContactId) -> Result<ConsolidatedContact, S::Error>
where
  S: ContactStore + ?Sized,
  S::Error: From<Error>,
{
  let cluster = store.find_cluster(primary_id)?;
  Ok(flatten(primary_id, &cluster)?)
}
