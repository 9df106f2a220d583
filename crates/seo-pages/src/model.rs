use serde::{Deserialize, Serialize};

/// City, state, and country of a keyword. Empty strings mean "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub state: String,
    pub country: String,
}

impl Location {
    pub fn new(city: impl Into<String>, state: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            state: state.into(),
            country: country.into(),
        }
    }

    /// Fill each empty field from `defaults`. Fields already set are kept.
    pub fn or_defaults(&self, defaults: &Location) -> Location {
        fn pick(own: &str, fallback: &str) -> String {
            let value = if own.is_empty() { fallback } else { own };
            value.to_string()
        }
        Location {
            city: pick(&self.city, &defaults.city),
            state: pick(&self.state, &defaults.state),
            country: pick(&self.country, &defaults.country),
        }
    }
}

/// One input line: a keyword plus its optional location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRecord {
    pub keyword: String,
    #[serde(flatten)]
    pub location: Location,
}

impl KeywordRecord {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            location: Location::default(),
        }
    }

    pub fn with_location(keyword: impl Into<String>, location: Location) -> Self {
        Self {
            keyword: keyword.into(),
            location,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Benefit {
    pub title: String,
    pub description: String,
}

/// Marketing copy for one landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub h1: String,
    pub intro: String,
    pub benefits: Vec<Benefit>,
    pub cta: String,
}

/// Copy produced for a keyword, tagged with how it was obtained.
///
/// Both variants carry the same shape, so rendering does not care which path
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedCopy {
    /// Parsed from the model's structured response.
    Structured(GeneratedContent),
    /// Templated copy used because the response was not well-formed.
    Fallback(GeneratedContent),
}

impl GeneratedCopy {
    pub fn into_content(self) -> GeneratedContent {
        match self {
            Self::Structured(c) | Self::Fallback(c) => c,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    #[serde(rename = "@type")]
    pub kind: String,
    #[serde(rename = "addressLocality")]
    pub address_locality: String,
    #[serde(rename = "addressRegion")]
    pub address_region: String,
    #[serde(rename = "addressCountry")]
    pub address_country: String,
}

/// Schema.org `LocalBusiness` record embedded as JSON-LD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalBusinessSchema {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "@type")]
    pub kind: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "areaServed")]
    pub area_served: String,
    pub address: PostalAddress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaTags {
    /// At most 55 characters.
    pub title: String,
    /// At most 155 characters.
    pub description: String,
    /// Comma-joined keyword list.
    pub keywords: String,
    pub schema: LocalBusinessSchema,
}

/// A rendered landing page with the inputs that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    pub keyword: String,
    pub city: String,
    pub country: String,
    pub html: String,
    pub content: GeneratedContent,
    pub meta: MetaTags,
}

impl PageResult {
    pub fn label(&self) -> String {
        format!("{} - {}", self.keyword, self.city)
    }
}
