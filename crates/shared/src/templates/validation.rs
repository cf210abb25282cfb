use std::sync::LazyLock;

use jsonschema::JSONSchema;
use schemars::schema_for;
use serde_json::Value;
use thiserror::Error;

use super::TemplateKind;
use super::records::{
    ComicPanelConfig, DesignPromoConfig, InstagramCardConfig, LandingHeroConfig,
    ProductDetailConfig, YoutubeThumbnailConfig,
};

#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("schema for {kind} failed to compile: {message}")]
    SchemaCompile { kind: TemplateKind, message: String },
    #[error("{kind} configuration failed schema validation: {errors:?}")]
    SchemaViolation {
        kind: TemplateKind,
        errors: Vec<String>,
    },
}

pub fn template_schema(kind: TemplateKind) -> Value {
    match kind {
        TemplateKind::YoutubeThumbnail => serde_json::to_value(schema_for!(YoutubeThumbnailConfig))
            .expect("youtube thumbnail schema should be serializable"),
        TemplateKind::InstagramCard => serde_json::to_value(schema_for!(InstagramCardConfig))
            .expect("instagram card schema should be serializable"),
        TemplateKind::ProductDetail => serde_json::to_value(schema_for!(ProductDetailConfig))
            .expect("product detail schema should be serializable"),
        TemplateKind::ComicPanel => serde_json::to_value(schema_for!(ComicPanelConfig))
            .expect("comic panel schema should be serializable"),
        TemplateKind::LandingHero => serde_json::to_value(schema_for!(LandingHeroConfig))
            .expect("landing hero schema should be serializable"),
        TemplateKind::DesignPromo => serde_json::to_value(schema_for!(DesignPromoConfig))
            .expect("design promo schema should be serializable"),
    }
}

/// Allowed spellings for an enum-valued field, empty when the field is free-form.
pub fn field_choices(kind: TemplateKind, field: &str) -> Vec<String> {
    let schema = template_schema(kind);
    let Some(property) = schema["properties"].get(field) else {
        return Vec::new();
    };
    let reference = property
        .get("$ref")
        .or_else(|| property["allOf"].get(0).and_then(|entry| entry.get("$ref")))
        .and_then(Value::as_str);
    let definition = match reference.and_then(|path| path.strip_prefix("#/definitions/")) {
        Some(name) => &schema["definitions"][name],
        None => property,
    };

    definition["enum"]
        .as_array()
        .map(|choices| {
            choices
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub fn validate_config_value(
    kind: TemplateKind,
    payload: &Value,
) -> Result<(), ConfigValidationError> {
    let validator = validator_for_kind(kind)?;

    if let Err(validation_errors) = validator.validate(payload) {
        let errors = validation_errors
            .map(|err| err.to_string())
            .collect::<Vec<_>>();
        return Err(ConfigValidationError::SchemaViolation { kind, errors });
    }

    Ok(())
}

static YOUTUBE_THUMBNAIL_VALIDATOR: LazyLock<Result<JSONSchema, String>> = LazyLock::new(|| {
    JSONSchema::compile(&template_schema(TemplateKind::YoutubeThumbnail))
        .map_err(|err| err.to_string())
});

static INSTAGRAM_CARD_VALIDATOR: LazyLock<Result<JSONSchema, String>> = LazyLock::new(|| {
    JSONSchema::compile(&template_schema(TemplateKind::InstagramCard))
        .map_err(|err| err.to_string())
});

static PRODUCT_DETAIL_VALIDATOR: LazyLock<Result<JSONSchema, String>> = LazyLock::new(|| {
    JSONSchema::compile(&template_schema(TemplateKind::ProductDetail))
        .map_err(|err| err.to_string())
});

static COMIC_PANEL_VALIDATOR: LazyLock<Result<JSONSchema, String>> = LazyLock::new(|| {
    JSONSchema::compile(&template_schema(TemplateKind::ComicPanel)).map_err(|err| err.to_string())
});

static LANDING_HERO_VALIDATOR: LazyLock<Result<JSONSchema, String>> = LazyLock::new(|| {
    JSONSchema::compile(&template_schema(TemplateKind::LandingHero))
        .map_err(|err| err.to_string())
});

static DESIGN_PROMO_VALIDATOR: LazyLock<Result<JSONSchema, String>> = LazyLock::new(|| {
    JSONSchema::compile(&template_schema(TemplateKind::DesignPromo))
        .map_err(|err| err.to_string())
});

fn validator_for_kind(kind: TemplateKind) -> Result<&'static JSONSchema, ConfigValidationError> {
    let validator_result = match kind {
        TemplateKind::YoutubeThumbnail => &*YOUTUBE_THUMBNAIL_VALIDATOR,
        TemplateKind::InstagramCard => &*INSTAGRAM_CARD_VALIDATOR,
        TemplateKind::ProductDetail => &*PRODUCT_DETAIL_VALIDATOR,
        TemplateKind::ComicPanel => &*COMIC_PANEL_VALIDATOR,
        TemplateKind::LandingHero => &*LANDING_HERO_VALIDATOR,
        TemplateKind::DesignPromo => &*DESIGN_PROMO_VALIDATOR,
    };

    validator_result
        .as_ref()
        .map_err(|message| ConfigValidationError::SchemaCompile {
            kind,
            message: message.clone(),
        })
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::{ConfigValidationError, field_choices, template_schema, validate_config_value};
    use crate::templates::TemplateKind;

    #[test]
    fn every_default_record_satisfies_its_schema() {
        for kind in TemplateKind::ALL {
            let payload = Value::Object(kind.default_config().fields());
            validate_config_value(kind, &payload)
                .unwrap_or_else(|err| panic!("{kind} default should validate: {err}"));
        }
    }

    #[test]
    fn schema_properties_match_record_fields() {
        for kind in TemplateKind::ALL {
            let schema = template_schema(kind);
            let mut schema_keys = schema["properties"]
                .as_object()
                .expect("record schema should list properties")
                .keys()
                .cloned()
                .collect::<Vec<_>>();
            let mut record_keys = kind.default_config().fields().keys().cloned().collect::<Vec<_>>();
            schema_keys.sort();
            record_keys.sort();
            assert_eq!(schema_keys, record_keys, "{kind} schema drifted from its record");
        }
    }

    #[test]
    fn rejects_non_hex_color() {
        let mut fields = TemplateKind::YoutubeThumbnail.default_config().fields();
        fields.insert("bgColor".to_string(), json!("blue"));

        let err = validate_config_value(TemplateKind::YoutubeThumbnail, &Value::Object(fields))
            .expect_err("named colors are not hex");
        assert!(
            matches!(err, ConfigValidationError::SchemaViolation { .. }),
            "expected schema violation, got {err:?}"
        );
    }

    #[test]
    fn rejects_out_of_range_numbers_and_unknown_enum_values() {
        let mut fields = TemplateKind::ComicPanel.default_config().fields();
        fields.insert("panelCount".to_string(), json!(12));
        assert!(
            validate_config_value(TemplateKind::ComicPanel, &Value::Object(fields)).is_err()
        );

        let mut fields = TemplateKind::ComicPanel.default_config().fields();
        fields.insert("style".to_string(), json!("watercolor"));
        assert!(
            validate_config_value(TemplateKind::ComicPanel, &Value::Object(fields)).is_err()
        );
    }

    #[test]
    fn accepts_short_and_alpha_hex_colors() {
        let mut fields = TemplateKind::LandingHero.default_config().fields();
        fields.insert("bgColor".to_string(), json!("#fff"));
        fields.insert("accentColor".to_string(), json!("#2563EBCC"));

        assert!(validate_config_value(TemplateKind::LandingHero, &Value::Object(fields)).is_ok());
    }

    #[test]
    fn enum_fields_list_their_wire_spellings() {
        assert_eq!(
            field_choices(TemplateKind::YoutubeThumbnail, "theme"),
            vec!["bold", "minimal", "neon", "retro"]
        );
        assert_eq!(
            field_choices(TemplateKind::ProductDetail, "layout"),
            vec!["imageLeft", "imageRight", "stacked"]
        );
        assert!(field_choices(TemplateKind::YoutubeThumbnail, "title").is_empty());
        assert!(field_choices(TemplateKind::YoutubeThumbnail, "missing").is_empty());
    }
}
