use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    Draft,
    Published,
}

impl Default for PageStatus {
    fn default() -> Self {
        PageStatus::Draft
    }
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct HeroSection {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ContentSection {
    pub heading: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SeoMeta {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AttractionPage {
    #[serde(rename = "_id")]
    pub id: String,
    pub tenant_id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub destination_id: Option<String>,
    #[serde(default)]
    pub hero: HeroSection,
    #[serde(default)]
    pub sections: Vec<ContentSection>,
    #[serde(default)]
    pub faqs: Vec<Faq>,
    #[serde(default)]
    pub tour_ids: Vec<String>,
    #[serde(default)]
    pub seo: SeoMeta,
    #[serde(default)]
    pub status: PageStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl AttractionPage {
    pub fn is_published(&self) -> bool {
        self.status == PageStatus::Published
    }

    /// Every image URL the page references.
    pub fn image_urls(&self) -> impl Iterator<Item = &str> {
        self.hero
            .image
            .iter()
            .chain(self.sections.iter().filter_map(|s| s.image.as_ref()))
            .map(String::as_str)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AttractionPageInput {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub destination_id: Option<String>,
    #[serde(default)]
    pub hero: HeroSection,
    #[serde(default)]
    pub sections: Vec<ContentSection>,
    #[serde(default)]
    pub faqs: Vec<Faq>,
    #[serde(default)]
    pub tour_ids: Vec<String>,
    #[serde(default)]
    pub seo: SeoMeta,
    #[serde(default)]
    pub status: PageStatus,
}
