use serde::{Deserialize, Serialize};

/// A mail template as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub mail: String,
    #[serde(default)]
    pub company_ids: Vec<i64>,
}

/// Payload for creating or updating a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateDraft {
    pub name: String,
    pub mail: String,
    pub subject: String,
    pub body: String,
    pub company_ids: Vec<i64>,
}

impl TemplateDraft {
    /// Names of the required text fields that are still blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("mail", &self.mail),
            ("subject", &self.subject),
            ("body", &self.body),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}

impl From<&Template> for TemplateDraft {
    fn from(template: &Template) -> Self {
        Self {
            name: template.name.clone(),
            mail: template.mail.clone(),
            subject: template.subject.clone(),
            body: template.body.clone(),
            company_ids: template.company_ids.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_tolerates_missing_fields() {
        let template: Template =
            serde_json::from_str(r#"{"id": 1, "name": "Invoice", "subject": "Monthly"}"#).unwrap();
        assert_eq!(template.name, "Invoice");
        assert!(template.body.is_empty());
        assert!(template.company_ids.is_empty());
    }

    #[test]
    fn test_missing_fields() {
        let mut draft = TemplateDraft {
            name: "Reminder".to_string(),
            subject: "   ".to_string(),
            ..Default::default()
        };
        assert_eq!(draft.missing_fields(), vec!["mail", "subject", "body"]);

        draft.mail = "billing@example.com".to_string();
        draft.subject = "Due".to_string();
        draft.body = "Please pay".to_string();
        assert!(draft.missing_fields().is_empty());
    }

    #[test]
    fn test_draft_serializes_company_ids() {
        let draft = TemplateDraft {
            company_ids: vec![3, 4],
            ..Default::default()
        };
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["company_ids"], serde_json::json!([3, 4]));
    }
}
