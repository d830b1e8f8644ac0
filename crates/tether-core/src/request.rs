//! The validated input to identity resolution.

use crate::{Error, Result};

/// An email and/or phone number to resolve, validated at construction.
///
/// Empty strings count as absent. At least one field is always present, so
/// the resolver never sees an empty request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifyRequest {
  email:        Option<String>,
  phone_number: Option<String>,
}

impl IdentifyRequest {
  pub fn new(email: Option<String>, phone_number: Option<String>) -> Result<Self> {
    let email = email.filter(|e| !e.is_empty());
    let phone_number = phone_number.filter(|p| !p.is_empty());

    if email.is_none() && phone_number.is_none() {
      return Err(Error::EmptyRequest);
    }
    if let Some(e) = &email
      && !is_plausible_email(e)
    {
      return Err(Error::InvalidEmail(e.clone()));
    }

    Ok(Self { email, phone_number })
  }

  pub fn email(&self) -> Option<&str> { self.email.as_deref() }

  pub fn phone_number(&self) -> Option<&str> { self.phone_number.as_deref() }

  /// `true` when both fields were supplied.
  pub fn is_full(&self) -> bool {
    self.email.is_some() && self.phone_number.is_some()
  }
}

/// A bare `local@domain` address. Single-label domains such as `localhost`
/// are accepted; display names and quoted local parts are not.
fn is_plausible_email(s: &str) -> bool {
  if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
    return false;
  }
  let Some((local, domain)) = s.split_once('@') else {
    return false;
  };
  if local.is_empty() || domain.contains('@') {
    return false;
  }
  domain.split('.').all(|label| !label.is_empty())
}
