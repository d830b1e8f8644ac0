//! Integration tests for `SqliteStore` against an in-memory database.

use tether_core::{
  consolidate::ConsolidatedContact,
  contact::{ContactId, LinkPrecedence, NewContact},
  identify,
  request::IdentifyRequest,
  store::UnitOfWork,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn call(s: &SqliteStore, email: Option<&str>, phone: Option<&str>) -> ConsolidatedContact {
  let request =
    IdentifyRequest::new(email.map(str::to_owned), phone.map(str::to_owned)).unwrap();
  identify(s, request).await.unwrap()
}

fn ids(raw: &[i64]) -> Vec<ContactId> { raw.iter().copied().map(ContactId).collect() }

// ─── Identify scenarios ──────────────────────────────────────────────────────

#[tokio::test]
async fn empty_store_creates_primary() {
  let s = store().await;
  let view = call(&s, Some("a@x.com"), Some("100")).await;

  assert_eq!(view.emails, ["a@x.com"]);
  assert_eq!(view.phone_numbers, ["100"]);
  assert!(view.secondary_contact_ids.is_empty());

  let all = s.contacts().await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].id, view.primary_contact_id);
  assert_eq!(all[0].precedence(), LinkPrecedence::Primary);
  assert_eq!(all[0].linked_id(), None);
}

#[tokio::test]
async fn new_phone_attaches_secondary() {
  let s = store().await;
  call(&s, Some("a@x.com"), Some("100")).await;
  let view = call(&s, Some("a@x.com"), Some("200")).await;

  assert_eq!(view.primary_contact_id, ContactId(1));
  assert_eq!(view.emails, ["a@x.com"]);
  assert_eq!(view.phone_numbers, ["100", "200"]);
  assert_eq!(view.secondary_contact_ids, ids(&[2]));

  let all = s.contacts().await.unwrap();
  assert_eq!(all[1].linked_id(), Some(ContactId(1)));
  assert_eq!(all[1].precedence(), LinkPrecedence::Secondary);
}

#[tokio::test]
async fn bridging_request_merges_and_repeats_without_mutation() {
  let s = store().await;
  call(&s, Some("a@x.com"), Some("100")).await;
  call(&s, Some("b@x.com"), Some("200")).await;

  let merged = call(&s, Some("a@x.com"), Some("200")).await;
  assert_eq!(merged.primary_contact_id, ContactId(1));
  assert_eq!(merged.secondary_contact_ids, ids(&[2]));
  assert_eq!(merged.emails, ["a@x.com", "b@x.com"]);
  assert_eq!(merged.phone_numbers, ["100", "200"]);

  let after_merge = s.contacts().await.unwrap();
  assert_eq!(after_merge[1].linked_id(), Some(ContactId(1)));
  assert!(after_merge[1].updated_at >= after_merge[1].created_at);

  let again = call(&s, Some("a@x.com"), Some("200")).await;
  assert_eq!(again, merged);
  assert_eq!(s.contacts().await.unwrap(), after_merge);
}

#[tokio::test]
async fn merge_relinks_absorbed_secondaries() {
  let s = store().await;
  call(&s, Some("a@x.com"), Some("100")).await; // 1
  call(&s, Some("b@x.com"), Some("200")).await; // 2
  call(&s, Some("b@x.com"), Some("300")).await; // 3 -> 2

  let view = call(&s, Some("a@x.com"), Some("300")).await;
  assert_eq!(view.primary_contact_id, ContactId(1));
  assert_eq!(view.secondary_contact_ids, ids(&[2, 3]));

  for c in s.contacts().await.unwrap().iter().skip(1) {
    assert_eq!(c.linked_id(), Some(ContactId(1)), "contact {}", c.id);
  }
}

#[tokio::test]
async fn partial_request_for_secondary_returns_cluster() {
  let s = store().await;
  call(&s, Some("a@x.com"), Some("100")).await;
  call(&s, Some("s@x.com"), Some("100")).await;
  let before = s.contacts().await.unwrap();

  let view = call(&s, Some("s@x.com"), None).await;
  assert_eq!(view.primary_contact_id, ContactId(1));
  assert_eq!(view.emails, ["a@x.com", "s@x.com"]);
  assert_eq!(view.secondary_contact_ids, ids(&[2]));
  assert_eq!(s.contacts().await.unwrap(), before);
}

#[tokio::test]
async fn phone_only_requests_never_match_on_missing_email() {
  let s = store().await;
  call(&s, None, Some("100")).await;
  let view = call(&s, None, Some("200")).await;

  assert_eq!(view.primary_contact_id, ContactId(2));
  assert!(view.emails.is_empty());
  assert_eq!(s.contacts().await.unwrap().len(), 2);
}

// ─── Unit of work ────────────────────────────────────────────────────────────

#[tokio::test]
async fn failed_unit_of_work_rolls_back() {
  let s = store().await;
  call(&s, Some("a@x.com"), Some("100")).await;

  let err = s
    .transact(|tx| {
      tx.create(NewContact::primary(Some("b@x.com".into()), None))?;
      tx.relink_all(ContactId(1), ContactId(2))?;
      // There is no contact 99.
      tx.demote_to_secondary(ContactId(99), ContactId(1))?;
      Ok(())
    })
    .await
    .unwrap_err();

  assert!(matches!(
    err,
    Error::Core(tether_core::Error::NotPrimary(ContactId(99)))
  ));
  let all = s.contacts().await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].email.as_deref(), Some("a@x.com"));
}

#[tokio::test]
async fn demoting_a_secondary_is_rejected() {
  let s = store().await;
  call(&s, Some("a@x.com"), Some("100")).await;
  call(&s, Some("a@x.com"), Some("200")).await;

  let err = s
    .transact(|tx| tx.demote_to_secondary(ContactId(2), ContactId(1)))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(tether_core::Error::NotPrimary(ContactId(2)))));
}

#[tokio::test]
async fn schema_rejects_contact_without_fields() {
  let s = store().await;
  let err = s
    .transact(|tx| {
      tx.create(NewContact::primary(None, None))?;
      Ok(())
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Sqlite(_)));
  assert!(s.contacts().await.unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_requests_for_same_identity_create_one_primary() {
  let s = store().await;

  let handles: Vec<_> = (0..16)
    .map(|_| {
      let s = s.clone();
      tokio::spawn(async move { call(&s, Some("a@x.com"), Some("100")).await })
    })
    .collect();

  for handle in handles {
    let view = handle.await.unwrap();
    assert_eq!(view.primary_contact_id, ContactId(1));
  }
  assert_eq!(s.contacts().await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_bridging_requests_leave_one_primary() {
  let s = store().await;
  call(&s, Some("a@x.com"), Some("100")).await;
  call(&s, Some("b@x.com"), Some("200")).await;
  call(&s, Some("c@x.com"), Some("300")).await;

  let requests = [
    ("a@x.com", "200"),
    ("b@x.com", "300"),
    ("c@x.com", "100"),
    ("a@x.com", "300"),
  ];
  let handles: Vec<_> = requests
    .into_iter()
    .map(|(e, p)| {
      let s = s.clone();
      tokio::spawn(async move { call(&s, Some(e), Some(p)).await })
    })
    .collect();
  for handle in handles {
    handle.await.unwrap();
  }

  let all = s.contacts().await.unwrap();
  let primaries: Vec<_> = all.iter().filter(|c| c.is_primary()).collect();
  assert_eq!(primaries.len(), 1);
  assert_eq!(primaries[0].id, ContactId(1));
  for c in all.iter().filter(|c| !c.is_primary()) {
    assert_eq!(c.linked_id(), Some(ContactId(1)), "contact {}", c.id);
  }
}
