use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

mod records;
mod validation;

pub use records::{
    CardTheme, ComicLayout, ComicPanelConfig, ComicStyle, DesignPromoConfig, HeroLayout,
    HeroTheme, InstagramCardConfig, LandingHeroConfig, ProductDetailConfig, ProductLayout,
    TextAlign, ThumbnailTheme, YoutubeThumbnailConfig,
};
pub use validation::{
    ConfigValidationError, field_choices, template_schema, validate_config_value,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateKind {
    YoutubeThumbnail,
    InstagramCard,
    ProductDetail,
    ComicPanel,
    LandingHero,
    DesignPromo,
}

/// How the assistant is allowed to change a template: by named fields, or by
/// regenerating the whole markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    FieldConfig,
    HtmlDirect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatio {
    Widescreen,
    Square,
}

impl AspectRatio {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Widescreen => "16:9",
            Self::Square => "1:1",
        }
    }

    pub const fn canvas_size(self) -> (u32, u32) {
        match self {
            Self::Widescreen => (1280, 720),
            Self::Square => (1080, 1080),
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown template '{0}'")]
pub struct UnknownTemplate(pub String);

impl TemplateKind {
    pub const ALL: [TemplateKind; 6] = [
        Self::YoutubeThumbnail,
        Self::InstagramCard,
        Self::ProductDetail,
        Self::ComicPanel,
        Self::LandingHero,
        Self::DesignPromo,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::YoutubeThumbnail => "youtube-thumbnail",
            Self::InstagramCard => "instagram-card",
            Self::ProductDetail => "product-detail",
            Self::ComicPanel => "comic-panel",
            Self::LandingHero => "landing-hero",
            Self::DesignPromo => "design-promo",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::YoutubeThumbnail => "YouTube thumbnail",
            Self::InstagramCard => "Instagram card",
            Self::ProductDetail => "Product detail page",
            Self::ComicPanel => "Comic panel",
            Self::LandingHero => "Landing page hero",
            Self::DesignPromo => "Design service promo",
        }
    }

    pub const fn render_mode(self) -> RenderMode {
        match self {
            Self::DesignPromo => RenderMode::HtmlDirect,
            _ => RenderMode::FieldConfig,
        }
    }

    pub const fn aspect_ratio(self) -> AspectRatio {
        match self {
            Self::YoutubeThumbnail | Self::LandingHero | Self::DesignPromo => {
                AspectRatio::Widescreen
            }
            Self::InstagramCard | Self::ProductDetail | Self::ComicPanel => AspectRatio::Square,
        }
    }

    /// Returns a fresh default record; callers own the result outright.
    pub fn default_config(self) -> TemplateConfig {
        match self {
            Self::YoutubeThumbnail => {
                TemplateConfig::YoutubeThumbnail(YoutubeThumbnailConfig::default())
            }
            Self::InstagramCard => TemplateConfig::InstagramCard(InstagramCardConfig::default()),
            Self::ProductDetail => TemplateConfig::ProductDetail(ProductDetailConfig::default()),
            Self::ComicPanel => TemplateConfig::ComicPanel(ComicPanelConfig::default()),
            Self::LandingHero => TemplateConfig::LandingHero(LandingHeroConfig::default()),
            Self::DesignPromo => TemplateConfig::DesignPromo(DesignPromoConfig::default()),
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateKind {
    type Err = UnknownTemplate;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| UnknownTemplate(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TemplateConfig {
    YoutubeThumbnail(YoutubeThumbnailConfig),
    InstagramCard(InstagramCardConfig),
    ProductDetail(ProductDetailConfig),
    ComicPanel(ComicPanelConfig),
    LandingHero(LandingHeroConfig),
    DesignPromo(DesignPromoConfig),
}

impl TemplateConfig {
    pub const fn kind(&self) -> TemplateKind {
        match self {
            Self::YoutubeThumbnail(_) => TemplateKind::YoutubeThumbnail,
            Self::InstagramCard(_) => TemplateKind::InstagramCard,
            Self::ProductDetail(_) => TemplateKind::ProductDetail,
            Self::ComicPanel(_) => TemplateKind::ComicPanel,
            Self::LandingHero(_) => TemplateKind::LandingHero,
            Self::DesignPromo(_) => TemplateKind::DesignPromo,
        }
    }

    /// Flat field view of the record, keyed by wire name.
    pub fn fields(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(fields)) => fields,
            _ => Map::new(),
        }
    }

    pub fn from_fields(
        kind: TemplateKind,
        fields: Map<String, Value>,
    ) -> Result<Self, serde_json::Error> {
        let value = Value::Object(fields);
        Ok(match kind {
            TemplateKind::YoutubeThumbnail => Self::YoutubeThumbnail(serde_json::from_value(value)?),
            TemplateKind::InstagramCard => Self::InstagramCard(serde_json::from_value(value)?),
            TemplateKind::ProductDetail => Self::ProductDetail(serde_json::from_value(value)?),
            TemplateKind::ComicPanel => Self::ComicPanel(serde_json::from_value(value)?),
            TemplateKind::LandingHero => Self::LandingHero(serde_json::from_value(value)?),
            TemplateKind::DesignPromo => Self::DesignPromo(serde_json::from_value(value)?),
        })
    }

    pub fn html(&self) -> Option<&str> {
        match self {
            Self::DesignPromo(config) => Some(config.html.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::{AspectRatio, RenderMode, TemplateConfig, TemplateKind};

    #[test]
    fn template_kind_parses_identity_strings_leniently() {
        assert_eq!(
            "youtube-thumbnail".parse::<TemplateKind>().ok(),
            Some(TemplateKind::YoutubeThumbnail)
        );
        assert_eq!(
            " Landing_Hero ".parse::<TemplateKind>().ok(),
            Some(TemplateKind::LandingHero)
        );
        assert!("poster".parse::<TemplateKind>().is_err());
    }

    #[test]
    fn only_design_promo_renders_html_directly() {
        let html_direct = TemplateKind::ALL
            .into_iter()
            .filter(|kind| kind.render_mode() == RenderMode::HtmlDirect)
            .collect::<Vec<_>>();
        assert_eq!(html_direct, vec![TemplateKind::DesignPromo]);
    }

    #[test]
    fn aspect_ratios_match_export_targets() {
        assert_eq!(
            TemplateKind::YoutubeThumbnail.aspect_ratio(),
            AspectRatio::Widescreen
        );
        assert_eq!(TemplateKind::InstagramCard.aspect_ratio(), AspectRatio::Square);
        assert_eq!(AspectRatio::Square.canvas_size(), (1080, 1080));
        assert_eq!(AspectRatio::Widescreen.label(), "16:9");
    }

    #[test]
    fn default_records_are_fresh_and_flat() {
        for kind in TemplateKind::ALL {
            let mut first = kind.default_config();
            let second = kind.default_config();
            assert_eq!(first, second);

            if let TemplateConfig::YoutubeThumbnail(config) = &mut first {
                config.title = "changed".to_string();
            }
            assert_eq!(kind.default_config(), second, "defaults must not be shared");

            for (key, value) in second.fields() {
                assert!(
                    !matches!(value, Value::Object(_) | Value::Array(_) | Value::Null),
                    "{kind}.{key} must be a scalar field"
                );
            }
        }
    }

    #[test]
    fn fields_round_trip_through_typed_record() {
        let config = TemplateKind::ProductDetail.default_config();
        let rebuilt = TemplateConfig::from_fields(TemplateKind::ProductDetail, config.fields())
            .expect("default fields should rebuild the record");
        assert_eq!(rebuilt, config);
        assert!(rebuilt.fields().contains_key("discountRate"));
    }

    #[test]
    fn every_default_record_exposes_flat_fields() {
        for kind in TemplateKind::ALL {
            let fields = kind.default_config().fields();
            assert!(!fields.is_empty(), "{kind} should expose fields");
            assert!(fields.values().all(|value| !value.is_object() && !value.is_array()));
        }
    }

    #[test]
    fn from_fields_rejects_unknown_keys() {
        let mut fields = TemplateKind::ComicPanel.default_config().fields();
        fields.insert("fontFamily".to_string(), Value::String("serif".to_string()));

        assert!(TemplateConfig::from_fields(TemplateKind::ComicPanel, fields).is_err());
    }
}
