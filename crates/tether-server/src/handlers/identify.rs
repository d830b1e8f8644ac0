//! `POST /identify` — resolve an email and/or phone number to one person.
//!
//! Body: `{"email": "a@x.com", "phoneNumber": "100"}`; either field may be
//! omitted or `null`, but not both. `phoneNumber` may also be sent as a JSON
//! number. Responds with `{"contact": ConsolidatedContact}`.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Deserializer, Serialize};
use tether_core::{
  consolidate::ConsolidatedContact, identify, request::IdentifyRequest,
  store::UnitOfWork,
};

use crate::{AppState, error::Error};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyBody {
  #[serde(default)]
  pub email:        Option<String>,
  #[serde(default, deserialize_with = "string_or_number")]
  pub phone_number: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IdentifyResponse {
  pub contact: ConsolidatedContact,
}

pub async fn handler<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<IdentifyBody>, JsonRejection>,
) -> Result<Json<IdentifyResponse>, Error>
where
  S: UnitOfWork + Clone + 'static,
  S::Error: From<tether_core::Error>,
{
  let Json(body) = body.map_err(|e| Error::BadRequest(e.body_text()))?;

  let request = IdentifyRequest::new(body.email, body.phone_number)
    .map_err(|e| Error::BadRequest(e.to_string()))?;

  let contact = identify(state.store.as_ref(), request)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  Ok(Json(IdentifyResponse { contact }))
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Raw {
    Text(String),
    Number(u64),
  }

  Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
    Raw::Text(s) => s,
    Raw::Number(n) => n.to_string(),
  }))
}
