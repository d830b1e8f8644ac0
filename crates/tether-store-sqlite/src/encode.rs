//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond width
//! and a `Z` suffix, so string order in SQL is chronological order.

use chrono::{DateTime, SecondsFormat, Utc};
use tether_core::contact::{Contact, ContactId, Link, LinkPrecedence};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── LinkPrecedence ──────────────────────────────────────────────────────────

pub fn encode_precedence(p: LinkPrecedence) -> &'static str {
  match p {
    LinkPrecedence::Primary => "primary",
    LinkPrecedence::Secondary => "secondary",
  }
}

pub fn decode_precedence(s: &str) -> Result<LinkPrecedence> {
  match s {
    "primary" => Ok(LinkPrecedence::Primary),
    "secondary" => Ok(LinkPrecedence::Secondary),
    other => Err(Error::UnknownPrecedence(other.to_owned())),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawContact::from_row`].
pub const CONTACT_COLUMNS: &str =
  "id, email, phone_number, linked_id, link_precedence, created_at, updated_at";

/// Raw values read directly from a `contacts` row.
pub struct RawContact {
  pub id:              i64,
  pub email:           Option<String>,
  pub phone_number:    Option<String>,
  pub linked_id:       Option<i64>,
  pub link_precedence: String,
  pub created_at:      String,
  pub updated_at:      String,
}

impl RawContact {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      email:           row.get(1)?,
      phone_number:    row.get(2)?,
      linked_id:       row.get(3)?,
      link_precedence: row.get(4)?,
      created_at:      row.get(5)?,
      updated_at:      row.get(6)?,
    })
  }

  pub fn into_contact(self) -> Result<Contact> {
    let link = match (decode_precedence(&self.link_precedence)?, self.linked_id) {
      (LinkPrecedence::Primary, _) => Link::Primary,
      (LinkPrecedence::Secondary, Some(linked_id)) => {
        Link::Secondary { linked_id: ContactId(linked_id) }
      }
      (LinkPrecedence::Secondary, None) => return Err(Error::MissingLink(self.id)),
    };

    Ok(Contact {
      id: ContactId(self.id),
      email: self.email,
      phone_number: self.phone_number,
      link,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone as _};

  use super::*;

  #[test]
  fn timestamps_sort_as_strings() {
    let base = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let later = base + Duration::microseconds(1);
    let much_later = base + Duration::seconds(10);

    let encoded = [encode_dt(base), encode_dt(later), encode_dt(much_later)];
    assert!(encoded[0] < encoded[1]);
    assert!(encoded[1] < encoded[2]);
    assert_eq!(encoded[0].len(), encoded[2].len());
    assert_eq!(decode_dt(&encoded[1]).unwrap(), later);
  }

  #[test]
  fn unknown_precedence_is_rejected() {
    assert!(matches!(
      decode_precedence("tertiary"),
      Err(Error::UnknownPrecedence(s)) if s == "tertiary"
    ));
  }
}
