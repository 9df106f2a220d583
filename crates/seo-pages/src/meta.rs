use crate::model::{LocalBusinessSchema, MetaTags, PostalAddress};

pub const TITLE_MAX_CHARS: usize = 55;
pub const DESCRIPTION_MAX_CHARS: usize = 155;
const INTRO_SNIPPET_CHARS: usize = 80;

/// Build title, description, keyword list and JSON-LD record for one page.
pub fn build_meta_tags(keyword: &str, city: &str, country: &str, intro: &str) -> MetaTags {
    let mut location_text = String::new();
    if !city.is_empty() {
        location_text.push_str(&format!(" in {city}"));
    }
    if !country.is_empty() {
        location_text.push_str(&format!(", {country}"));
    }

    let title = truncate_chars(
        &format!("{keyword}{location_text} | Professional Services").replace("  ", " "),
        TITLE_MAX_CHARS,
    );
    let snippet = truncate_chars(intro, INTRO_SNIPPET_CHARS);
    let description = truncate_chars(
        &format!("Expert {keyword} services{location_text}. {snippet}...").replace("  ", " "),
        DESCRIPTION_MAX_CHARS,
    );

    let schema = LocalBusinessSchema {
        context: "https://schema.org".to_string(),
        kind: "LocalBusiness".to_string(),
        name: keyword.to_string(),
        description: description.clone(),
        area_served: non_empty_or(country, "Worldwide"),
        address: PostalAddress {
            kind: "PostalAddress".to_string(),
            address_locality: city.to_string(),
            address_region: String::new(),
            address_country: non_empty_or(country, "US"),
        },
    };

    MetaTags {
        title,
        description,
        keywords: format!("{keyword}, {keyword} services, professional {keyword}"),
        schema,
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_and_description_include_location() {
        let meta = build_meta_tags("electrician", "New York", "USA", "We wire homes.");
        assert_eq!(meta.title, "electrician in New York, USA | Professional Services");
        assert_eq!(
            meta.description,
            "Expert electrician services in New York, USA. We wire homes...."
        );
        assert_eq!(
            meta.keywords,
            "electrician, electrician services, professional electrician"
        );
    }

    #[test]
    fn lengths_are_bounded_for_long_input() {
        let keyword = "emergency residential and commercial water heater replacement ".repeat(5);
        let intro = "word ".repeat(200);
        let meta = build_meta_tags(&keyword, "San Francisco", "United States", &intro);
        assert!(meta.title.chars().count() <= TITLE_MAX_CHARS);
        assert!(meta.description.chars().count() <= DESCRIPTION_MAX_CHARS);
        assert_eq!(meta.title.chars().count(), TITLE_MAX_CHARS);
    }

    #[test]
    fn truncation_respects_multibyte_characters() {
        let meta = build_meta_tags(&"é".repeat(100), "Zürich", "", &"ü".repeat(300));
        assert_eq!(meta.title.chars().count(), TITLE_MAX_CHARS);
        assert!(meta.description.chars().count() <= DESCRIPTION_MAX_CHARS);
    }

    #[test]
    fn intro_snippet_is_limited_to_eighty_chars() {
        let intro = "a".repeat(120);
        let meta = build_meta_tags("x", "", "", &intro);
        assert_eq!(meta.description, format!("Expert x services. {}...", "a".repeat(80)));
    }

    #[test]
    fn schema_defaults_when_location_missing() {
        let meta = build_meta_tags("plumber", "", "", "");
        assert_eq!(meta.schema.area_served, "Worldwide");
        assert_eq!(meta.schema.address.address_country, "US");
        assert_eq!(meta.schema.address.address_locality, "");
        assert_eq!(meta.schema.name, "plumber");
        assert_eq!(meta.schema.description, meta.description);
    }

    #[test]
    fn schema_serializes_with_schema_org_keys() {
        let meta = build_meta_tags("plumber", "Dubai", "UAE", "intro");
        let json = serde_json::to_value(&meta.schema).unwrap();
        assert_eq!(json["@context"], "https://schema.org");
        assert_eq!(json["@type"], "LocalBusiness");
        assert_eq!(json["areaServed"], "UAE");
        assert_eq!(json["address"]["@type"], "PostalAddress");
        assert_eq!(json["address"]["addressLocality"], "Dubai");
        assert_eq!(json["address"]["addressCountry"], "UAE");
    }

    #[test]
    fn double_spaces_are_collapsed() {
        let meta = build_meta_tags("plumber ", "", "", "");
        assert_eq!(meta.title, "plumber | Professional Services");
    }
}
