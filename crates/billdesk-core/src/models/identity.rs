use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Profile of the signed-in user.
///
/// The authority owns this record; only the fields the client displays are
/// named, everything else is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Identity {
    /// Name to show in the title bar, falling back to the email address.
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.email.as_deref())
            .unwrap_or("signed in")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_keeps_unknown_fields() {
        let json = r#"{"id": 7, "email": "a@b.com", "role": "admin"}"#;
        let identity: Identity = serde_json::from_str(json).unwrap();
        assert_eq!(identity.email.as_deref(), Some("a@b.com"));
        assert_eq!(identity.extra.get("role"), Some(&Value::from("admin")));
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut identity = Identity {
            email: Some("a@b.com".to_string()),
            ..Default::default()
        };
        assert_eq!(identity.display_name(), "a@b.com");

        identity.name = Some(String::new());
        assert_eq!(identity.display_name(), "a@b.com");

        identity.name = Some("Asha".to_string());
        assert_eq!(identity.display_name(), "Asha");

        assert_eq!(Identity::default().display_name(), "signed in");
    }
}
