//! Human-readable catalog references (`@type/slug`)

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use super::ItemType;
use crate::error::{CatalogError, Result};

static REF_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^@(rule|skill|prompt)/(.+)$").expect("reference pattern is valid")
});

/// A parsed `@type/slug` reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogRef {
    pub item_type: ItemType,
    pub slug: String,
}

impl CatalogRef {
    pub fn new(item_type: ItemType, slug: impl Into<String>) -> Result<Self> {
        let slug = slug.into();
        let reference = CatalogRef { item_type, slug };
        validate_slug(&reference.slug)
            .map_err(|reason| CatalogError::invalid_reference(&reference.to_string(), reason))?;
        Ok(reference)
    }

    /// Parse a ref string. Fails locally, without any network call.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if !trimmed.starts_with('@') {
            return Err(CatalogError::invalid_reference(
                input,
                "a reference must start with '@'",
            ));
        }

        let captures = REF_PATTERN.captures(trimmed).ok_or_else(|| {
            CatalogError::invalid_reference(input, "expected @rule/<slug>, @skill/<slug> or @prompt/<slug>")
        })?;

        let item_type: ItemType = captures[1]
            .parse()
            .map_err(|_| CatalogError::invalid_reference(input, "unknown item type"))?;
        let slug = &captures[2];
        validate_slug(slug).map_err(|reason| CatalogError::invalid_reference(input, reason))?;

        Ok(CatalogRef {
            item_type,
            slug: slug.to_string(),
        })
    }
}

impl fmt::Display for CatalogRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}/{}", self.item_type, self.slug)
    }
}

impl std::str::FromStr for CatalogRef {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        CatalogRef::parse(s)
    }
}

/// Slugs become file and directory names, so they must stay a single path segment
pub fn validate_slug(slug: &str) -> std::result::Result<(), String> {
    if slug.trim().is_empty() {
        return Err("slug is required".to_string());
    }
    if slug == "." || slug == ".." {
        return Err(format!("slug '{slug}' is not allowed"));
    }
    if slug.contains(['/', '\\']) {
        return Err(format!("slug '{slug}' must not contain path separators"));
    }
    if slug.chars().any(char::is_control) {
        return Err("slug must not contain control characters".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rule_and_skill() {
        let r = CatalogRef::parse("@rule/nextjs-api-safety").unwrap();
        assert_eq!(r.item_type, ItemType::Rule);
        assert_eq!(r.slug, "nextjs-api-safety");
        assert_eq!(r.to_string(), "@rule/nextjs-api-safety");

        let s: CatalogRef = " @skill/code-review ".parse().unwrap();
        assert_eq!(s.item_type, ItemType::Skill);
        assert_eq!(s.slug, "code-review");
    }

    #[test]
    fn test_prompt_refs_parse() {
        let p = CatalogRef::parse("@prompt/commit-message").unwrap();
        assert_eq!(p.item_type, ItemType::Prompt);
    }

    #[test]
    fn test_malformed_refs_rejected() {
        for bad in [
            "",
            "rule/x",
            "@rule",
            "@rule/",
            "@agent/x",
            "@Rule/x",
            "@rule/../secrets",
            "@skill/a/b",
            "@rule/..",
            "@rule/a\\b",
        ] {
            let err = CatalogRef::parse(bad).unwrap_err();
            assert!(
                matches!(err, CatalogError::InvalidReference { .. }),
                "{bad:?} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn test_new_validates_slug() {
        assert!(CatalogRef::new(ItemType::Rule, "ok-slug").is_ok());
        assert!(CatalogRef::new(ItemType::Rule, "../x").is_err());
    }
}
