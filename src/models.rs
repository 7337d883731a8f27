use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

/// Reject names carrying U+FFFD
///
/// Query strings are percent-decoded lossily, so `%FF` arrives here as the
/// replacement character. Refusing it on both register and view keeps a
/// mangled lookup from silently missing.
fn decoded_cleanly(name: &str) -> Result<(), ValidationError> {
    if name.contains(char::REPLACEMENT_CHARACTER) {
        let mut error = ValidationError::new("invalid_utf8");
        error.message = Some("template_name must be valid UTF-8".into());
        return Err(error);
    }
    Ok(())
}

/// A registered image template
///
/// `encoded_image` is carried through exactly as submitted; nothing in the
/// service decodes or inspects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Template {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub template_name: String,
    pub encoded_image: String,
    pub registered_at: DateTime<Utc>,
}

/// Request body for POST /register
///
/// Fields are optional at the serde level so a missing field surfaces as a
/// per-field validation error instead of a generic body rejection.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[serde(default, rename = "_id", alias = "id")]
    #[validate(length(min = 1, message = "id must not be empty when supplied"))]
    pub id: Option<String>,
    #[validate(
        required(message = "template_name is required"),
        length(min = 1, message = "template_name must not be empty"),
        custom(function = "decoded_cleanly")
    )]
    pub template_name: Option<String>,
    #[validate(required(message = "encoded_image is required"))]
    pub encoded_image: Option<String>,
}

impl RegisterRequest {
    /// Validate the request and turn it into a record, generating an id when
    /// none was given
    pub fn into_template(self, registered_at: DateTime<Utc>) -> Result<Template, ValidationErrors> {
        self.validate()?;

        // validate() has checked both required fields are present
        Ok(Template {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            template_name: self.template_name.unwrap_or_default(),
            encoded_image: self.encoded_image.unwrap_or_default(),
            registered_at,
        })
    }
}

/// Response type for successful register operations
#[derive(Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub id: String,
}

/// Query parameters for POST /view
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ViewQuery {
    /// Exact name of the template to look up
    #[validate(
        required(message = "template_name is required"),
        custom(function = "decoded_cleanly")
    )]
    pub template_name: Option<String>,
}

impl ViewQuery {
    /// Validate the query and return the name to look up
    pub fn into_template_name(self) -> Result<String, ValidationErrors> {
        self.validate()?;
        Ok(self.template_name.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: serde_json::Value) -> RegisterRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_generates_id_when_absent() {
        let now = Utc::now();
        let template = request(serde_json::json!({
            "template_name": "Template ABC",
            "encoded_image": "aGVsbG8="
        }))
        .into_template(now)
        .unwrap();

        assert!(Uuid::parse_str(&template.id).is_ok());
        assert_eq!(template.template_name, "Template ABC");
        assert_eq!(template.encoded_image, "aGVsbG8=");
        assert_eq!(template.registered_at, now);
    }

    #[test]
    fn test_keeps_supplied_id() {
        let plain = request(serde_json::json!({
            "id": "custom-id",
            "template_name": "Template ABC",
            "encoded_image": "aGVsbG8="
        }))
        .into_template(Utc::now())
        .unwrap();
        assert_eq!(plain.id, "custom-id");

        let underscored = request(serde_json::json!({
            "_id": "other-id",
            "template_name": "Template ABC",
            "encoded_image": "aGVsbG8="
        }))
        .into_template(Utc::now())
        .unwrap();
        assert_eq!(underscored.id, "other-id");
    }

    #[test]
    fn test_missing_fields_fail_validation() {
        let errors = request(serde_json::json!({})).validate().unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("template_name"));
        assert!(fields.contains_key("encoded_image"));
        assert!(!fields.contains_key("id"));
    }

    #[test]
    fn test_empty_template_name_fails_validation() {
        let errors = request(serde_json::json!({
            "template_name": "",
            "encoded_image": "aGVsbG8="
        }))
        .validate()
        .unwrap_err();

        assert!(errors.field_errors().contains_key("template_name"));
    }

    #[test]
    fn test_into_template_rejects_missing_image() {
        let errors = request(serde_json::json!({ "template_name": "Template ABC" }))
            .into_template(Utc::now())
            .unwrap_err();

        assert!(errors.field_errors().contains_key("encoded_image"));
    }

    #[test]
    fn test_replacement_character_in_name_is_rejected() {
        let errors = request(serde_json::json!({
            "template_name": "Template \u{FFFD}",
            "encoded_image": "aGVsbG8="
        }))
        .validate()
        .unwrap_err();

        let fields = errors.field_errors();
        assert_eq!(fields["template_name"][0].code, "invalid_utf8");
    }

    #[test]
    fn test_view_query_requires_name() {
        let missing = ViewQuery { template_name: None }.into_template_name().unwrap_err();
        assert!(missing.field_errors().contains_key("template_name"));

        let name = ViewQuery {
            template_name: Some("Template ABC".to_string()),
        }
        .into_template_name()
        .unwrap();
        assert_eq!(name, "Template ABC");
    }

    #[test]
    fn test_empty_payload_is_accepted() {
        let result = request(serde_json::json!({
            "template_name": "Blank",
            "encoded_image": ""
        }))
        .validate();

        assert!(result.is_ok());
    }

    #[test]
    fn test_template_serializes_id_as_underscore_id() {
        let template = Template {
            id: "abc".to_string(),
            template_name: "Template ABC".to_string(),
            encoded_image: "aGVsbG8=".to_string(),
            registered_at: Utc::now(),
        };

        let json = serde_json::to_value(&template).unwrap();
        assert_eq!(json["_id"], "abc");
        assert!(json.get("id").is_none());

        let back: Template = serde_json::from_value(json).unwrap();
        assert_eq!(back, template);
    }
}
