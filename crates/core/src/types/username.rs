//! Usernames and the placeholder emails derived from them.

use core::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Domain used to synthesize account emails when none is configured.
pub const DEFAULT_EMAIL_DOMAIN: &str = "ecommerce.com";

/// A username as submitted to the register and login endpoints.
///
/// Accounts are keyed by a synthesized email, `<username>@<domain>`, so the
/// username itself carries no validation: whatever the identity provider
/// accepts as an email local part is a valid username.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Wrap a raw username.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Read a posted username, rendering non-string JSON the way a
    /// JavaScript template literal would: `123` and `"123"` name the same
    /// account. A missing username is empty.
    #[must_use]
    pub fn from_json(value: Option<&Value>) -> Self {
        Self::new(value.map(template_text).unwrap_or_default())
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the username and returns the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Build the placeholder email `<username>@<domain>`.
    ///
    /// The result is deliberately not parsed here; the identity provider
    /// decides whether it is acceptable.
    #[must_use]
    pub fn placeholder_email(&self, domain: &str) -> String {
        format!("{}@{domain}", self.0)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn template_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // Array elements join with commas, with null rendered empty.
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => template_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_placeholder_email() {
        let username = Username::new("alice");
        assert_eq!(
            username.placeholder_email(DEFAULT_EMAIL_DOMAIN),
            "alice@ecommerce.com"
        );
    }

    #[test]
    fn test_placeholder_email_keeps_input_verbatim() {
        assert_eq!(Username::new("").placeholder_email("shop.test"), "@shop.test");
        assert_eq!(
            Username::new("Bob Smith").placeholder_email("shop.test"),
            "Bob Smith@shop.test"
        );
    }

    #[test]
    fn test_from_json_renders_scalars() {
        assert_eq!(Username::from_json(Some(&json!("alice"))).as_str(), "alice");
        assert_eq!(Username::from_json(Some(&json!(123))).as_str(), "123");
        assert_eq!(Username::from_json(Some(&json!(1.5))).as_str(), "1.5");
        assert_eq!(Username::from_json(Some(&json!(true))).as_str(), "true");
        assert_eq!(Username::from_json(Some(&Value::Null)).as_str(), "null");
        assert_eq!(Username::from_json(None).as_str(), "");
    }

    #[test]
    fn test_from_json_renders_containers() {
        assert_eq!(Username::from_json(Some(&json!(["a", null, 2]))).as_str(), "a,,2");
        assert_eq!(
            Username::from_json(Some(&json!({"name": "alice"}))).as_str(),
            "[object Object]"
        );
    }
}
