//! [`SqliteStore`] — the SQLite implementation of [`UnitOfWork`], and
//! [`SqliteTx`], the transaction-bound [`ContactStore`] it hands out.

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use tether_core::{
  contact::{Contact, ContactId, NewContact},
  store::{ContactStore, UnitOfWork},
};
use tracing::{debug, warn};

use crate::{
  Error, Result,
  encode::{CONTACT_COLUMNS, RawContact, encode_dt, encode_precedence},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tether contact store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All clones
/// share one connection thread, so units of work never interleave.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Every stored contact, ordered by creation time.
  pub async fn contacts(&self) -> Result<Vec<Contact>> {
    let raws: Vec<RawContact> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CONTACT_COLUMNS} FROM contacts ORDER BY created_at, id"
        ))?;
        let rows = stmt
          .query_map([], RawContact::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawContact::into_contact).collect()
  }
}

// ─── UnitOfWork impl ─────────────────────────────────────────────────────────

impl UnitOfWork for SqliteStore {
  type Error = Error;

  async fn transact<F, R>(&self, work: F) -> Result<R>
  where
    F: FnOnce(&dyn ContactStore<Error = Error>) -> Result<R> + Send + 'static,
    R: Send + 'static,
  {
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let handle: &dyn ContactStore<Error = Error> = &SqliteTx { conn: &tx };
        let outcome = work(handle);
        // Dropping `tx` without committing rolls it back.
        if outcome.is_ok() {
          tx.commit()?;
        }
        Ok(outcome)
      })
      .await?;

    if let Err(e) = &outcome {
      warn!(error = %e, "unit of work rolled back");
    }
    outcome
  }
}

// ─── Transaction handle ──────────────────────────────────────────────────────

/// A [`ContactStore`] bound to one open SQLite transaction.
pub struct SqliteTx<'tx> {
  conn: &'tx rusqlite::Connection,
}

impl SqliteTx<'_> {
  fn query_contacts(
    &self,
    sql: &str,
    params: impl rusqlite::Params,
  ) -> Result<Vec<Contact>> {
    let mut stmt = self.conn.prepare_cached(sql)?;
    let raws = stmt
      .query_map(params, RawContact::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    raws.into_iter().map(RawContact::into_contact).collect()
  }
}

impl ContactStore for SqliteTx<'_> {
  type Error = Error;

  fn find_by_email_or_phone(
    &self,
    email: Option<&str>,
    phone_number: Option<&str>,
  ) -> Result<Vec<Contact>> {
    // `col = NULL` is never true, so an absent field matches nothing.
    self.query_contacts(
      &format!(
        "SELECT {CONTACT_COLUMNS} FROM contacts
         WHERE email = ?1 OR phone_number = ?2
         ORDER BY created_at, id"
      ),
      rusqlite::params![email, phone_number],
    )
  }

  fn find_cluster(&self, primary_id: ContactId) -> Result<Vec<Contact>> {
    self.query_contacts(
      &format!(
        "SELECT {CONTACT_COLUMNS} FROM contacts
         WHERE id = ?1 OR linked_id = ?1
         ORDER BY created_at, id"
      ),
      rusqlite::params![primary_id.0],
    )
  }

  fn get(&self, id: ContactId) -> Result<Option<Contact>> {
    let raw = self
      .conn
      .query_row(
        &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1"),
        rusqlite::params![id.0],
        RawContact::from_row,
      )
      .optional()?;

    raw.map(RawContact::into_contact).transpose()
  }

  fn create(&self, input: NewContact) -> Result<ContactId> {
    let now = encode_dt(Utc::now());
    let precedence = encode_precedence(input.link.precedence());
    let linked_id = input.link.linked_id().map(|id| id.0);

    self.conn.execute(
      "INSERT INTO contacts (
         email, phone_number, linked_id, link_precedence, created_at, updated_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
      rusqlite::params![input.email, input.phone_number, linked_id, precedence, now],
    )?;

    let id = ContactId(self.conn.last_insert_rowid());
    debug!(contact_id = %id, precedence, "inserted contact");
    Ok(id)
  }

  fn demote_to_secondary(&self, id: ContactId, new_primary_id: ContactId) -> Result<()> {
    let changed = self.conn.execute(
      "UPDATE contacts
       SET link_precedence = 'secondary', linked_id = ?2, updated_at = ?3
       WHERE id = ?1 AND link_precedence = 'primary'",
      rusqlite::params![id.0, new_primary_id.0, encode_dt(Utc::now())],
    )?;

    if changed == 0 {
      return Err(tether_core::Error::NotPrimary(id).into());
    }
    Ok(())
  }

  fn relink_all(&self, from: ContactId, to: ContactId) -> Result<usize> {
    let changed = self.conn.execute(
      "UPDATE contacts SET linked_id = ?2, updated_at = ?3 WHERE linked_id = ?1",
      rusqlite::params![from.0, to.0, encode_dt(Utc::now())],
    )?;
    Ok(changed)
  }
}
