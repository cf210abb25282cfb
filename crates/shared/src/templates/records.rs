use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailTheme {
    Bold,
    Minimal,
    Neon,
    Retro,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct YoutubeThumbnailConfig {
    pub theme: ThumbnailTheme,
    #[schemars(length(max = 120))]
    pub title: String,
    #[schemars(length(max = 160))]
    pub subtitle: String,
    pub show_subtitle: bool,
    #[schemars(length(max = 24))]
    pub badge_text: String,
    pub show_badge: bool,
    #[schemars(regex(pattern = r"^#([0-9A-Fa-f]{3}|[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$"))]
    pub bg_color: String,
    #[schemars(regex(pattern = r"^#([0-9A-Fa-f]{3}|[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$"))]
    pub text_color: String,
    #[schemars(regex(pattern = r"^#([0-9A-Fa-f]{3}|[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$"))]
    pub accent_color: String,
    #[schemars(range(min = 24, max = 160))]
    pub title_size: u32,
    pub text_align: TextAlign,
}

impl Default for YoutubeThumbnailConfig {
    fn default() -> Self {
        Self {
            theme: ThumbnailTheme::Bold,
            title: "10 Design Tricks Nobody Told You".to_string(),
            subtitle: "Watch before your next upload".to_string(),
            show_subtitle: true,
            badge_text: "NEW".to_string(),
            show_badge: true,
            bg_color: "#111827".to_string(),
            text_color: "#FFFFFF".to_string(),
            accent_color: "#EF4444".to_string(),
            title_size: 72,
            text_align: TextAlign::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CardTheme {
    Gradient,
    Minimal,
    Pastel,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InstagramCardConfig {
    pub theme: CardTheme,
    #[schemars(length(max = 120))]
    pub headline: String,
    #[schemars(length(max = 400))]
    pub body: String,
    #[schemars(length(max = 40))]
    pub handle: String,
    pub show_handle: bool,
    pub show_quote_mark: bool,
    #[schemars(regex(pattern = r"^#([0-9A-Fa-f]{3}|[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$"))]
    pub bg_color: String,
    #[schemars(regex(pattern = r"^#([0-9A-Fa-f]{3}|[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$"))]
    pub text_color: String,
    #[schemars(regex(pattern = r"^#([0-9A-Fa-f]{3}|[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$"))]
    pub accent_color: String,
    #[schemars(range(min = 16, max = 96))]
    pub font_size: u32,
    pub text_align: TextAlign,
}

impl Default for InstagramCardConfig {
    fn default() -> Self {
        Self {
            theme: CardTheme::Gradient,
            headline: "Small habits, big results".to_string(),
            body: "Save this card and revisit it every Monday.".to_string(),
            handle: "@studio".to_string(),
            show_handle: true,
            show_quote_mark: false,
            bg_color: "#F5F3FF".to_string(),
            text_color: "#1F2937".to_string(),
            accent_color: "#8B5CF6".to_string(),
            font_size: 40,
            text_align: TextAlign::Center,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ProductLayout {
    ImageLeft,
    ImageRight,
    Stacked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProductDetailConfig {
    #[schemars(length(max = 80))]
    pub product_name: String,
    #[schemars(length(max = 160))]
    pub tagline: String,
    #[schemars(length(max = 24))]
    pub price: String,
    #[schemars(length(max = 24))]
    pub original_price: String,
    #[schemars(range(min = 0, max = 95))]
    pub discount_rate: u32,
    pub show_discount: bool,
    #[schemars(range(min = 0.0, max = 5.0))]
    pub rating: f64,
    pub show_rating: bool,
    #[schemars(length(max = 60))]
    pub feature_one: String,
    #[schemars(length(max = 60))]
    pub feature_two: String,
    #[schemars(length(max = 60))]
    pub feature_three: String,
    #[schemars(regex(pattern = r"^#([0-9A-Fa-f]{3}|[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$"))]
    pub bg_color: String,
    #[schemars(regex(pattern = r"^#([0-9A-Fa-f]{3}|[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$"))]
    pub text_color: String,
    #[schemars(regex(pattern = r"^#([0-9A-Fa-f]{3}|[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$"))]
    pub accent_color: String,
    pub layout: ProductLayout,
}

impl Default for ProductDetailConfig {
    fn default() -> Self {
        Self {
            product_name: "Everyday Tote".to_string(),
            tagline: "Light, washable, and big enough for a laptop".to_string(),
            price: "$39.00".to_string(),
            original_price: "$52.00".to_string(),
            discount_rate: 25,
            show_discount: true,
            rating: 4.8,
            show_rating: true,
            feature_one: "Water-resistant canvas".to_string(),
            feature_two: "Padded laptop sleeve".to_string(),
            feature_three: "Free returns for 30 days".to_string(),
            bg_color: "#FFFFFF".to_string(),
            text_color: "#111827".to_string(),
            accent_color: "#F97316".to_string(),
            layout: ProductLayout::ImageLeft,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ComicLayout {
    Grid,
    Strip,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ComicStyle {
    Manga,
    American,
    Webtoon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ComicPanelConfig {
    #[schemars(range(min = 1, max = 6))]
    pub panel_count: u32,
    pub layout: ComicLayout,
    pub style: ComicStyle,
    #[schemars(length(max = 80))]
    pub title: String,
    #[schemars(length(max = 160))]
    pub caption: String,
    #[schemars(length(max = 120))]
    pub speech_one: String,
    #[schemars(length(max = 120))]
    pub speech_two: String,
    pub show_borders: bool,
    pub show_speech_bubbles: bool,
    #[schemars(regex(pattern = r"^#([0-9A-Fa-f]{3}|[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$"))]
    pub bg_color: String,
    #[schemars(regex(pattern = r"^#([0-9A-Fa-f]{3}|[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$"))]
    pub border_color: String,
    #[schemars(regex(pattern = r"^#([0-9A-Fa-f]{3}|[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$"))]
    pub text_color: String,
}

impl Default for ComicPanelConfig {
    fn default() -> Self {
        Self {
            panel_count: 4,
            layout: ComicLayout::Grid,
            style: ComicStyle::Webtoon,
            title: "Monday Morning".to_string(),
            caption: "Every week, the same story.".to_string(),
            speech_one: "Just five more minutes...".to_string(),
            speech_two: "It's already ten o'clock!".to_string(),
            show_borders: true,
            show_speech_bubbles: true,
            bg_color: "#FFFBEB".to_string(),
            border_color: "#111827".to_string(),
            text_color: "#111827".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum HeroTheme {
    Light,
    Dark,
    Gradient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum HeroLayout {
    Centered,
    Split,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LandingHeroConfig {
    pub theme: HeroTheme,
    pub layout: HeroLayout,
    #[schemars(length(max = 40))]
    pub brand_name: String,
    #[schemars(length(max = 120))]
    pub headline: String,
    #[schemars(length(max = 240))]
    pub subheadline: String,
    #[schemars(length(max = 32))]
    pub cta_text: String,
    pub show_cta: bool,
    pub show_nav: bool,
    #[schemars(length(max = 32))]
    pub badge_text: String,
    pub show_badge: bool,
    #[schemars(regex(pattern = r"^#([0-9A-Fa-f]{3}|[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$"))]
    pub bg_color: String,
    #[schemars(regex(pattern = r"^#([0-9A-Fa-f]{3}|[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$"))]
    pub text_color: String,
    #[schemars(regex(pattern = r"^#([0-9A-Fa-f]{3}|[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$"))]
    pub accent_color: String,
}

impl Default for LandingHeroConfig {
    fn default() -> Self {
        Self {
            theme: HeroTheme::Light,
            layout: HeroLayout::Centered,
            brand_name: "Northwind".to_string(),
            headline: "Ship landing pages in an afternoon".to_string(),
            subheadline: "Templates, copy suggestions and export in one place.".to_string(),
            cta_text: "Start free".to_string(),
            show_cta: true,
            show_nav: true,
            badge_text: "Beta".to_string(),
            show_badge: false,
            bg_color: "#F8FAFC".to_string(),
            text_color: "#0F172A".to_string(),
            accent_color: "#2563EB".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DesignPromoConfig {
    #[schemars(length(min = 1))]
    pub html: String,
}

impl Default for DesignPromoConfig {
    fn default() -> Self {
        Self {
            html: concat!(
                r#"<div style="width:1280px;height:720px;display:flex;flex-direction:column;"#,
                r#"justify-content:center;align-items:center;background:#0F172A;color:#F8FAFC;"#,
                r#"font-family:sans-serif;">"#,
                r#"<p style="font-size:28px;letter-spacing:4px;color:#38BDF8;">DESIGN SERVICE</p>"#,
                r#"<h1 style="font-size:84px;margin:16px 0;">Your brand, redesigned</h1>"#,
                r#"<p style="font-size:32px;opacity:0.8;">Logos, thumbnails and landing pages in 48 hours</p>"#,
                r#"</div>"#
            )
            .to_string(),
        }
    }
}
