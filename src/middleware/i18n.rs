// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::common::i18n::DEFAULT_LANG;

// Idioma do cliente, tirado do Accept-Language
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANG.to_string())
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .and_then(primary_language)
            .map(Locale)
            .unwrap_or_default();

        Ok(locale)
    }
}

// "uz-UZ,ru;q=0.8" -> "uz"
fn primary_language(header_str: &str) -> Option<String> {
    accept_language::parse(header_str)
        .first()
        .and_then(|tag| tag.split('-').next())
        .map(|lang| lang.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_preferred_primary_subtag() {
        assert_eq!(primary_language("uz-UZ,ru;q=0.8").as_deref(), Some("uz"));
        assert_eq!(primary_language("en;q=0.5, uz").as_deref(), Some("uz"));
        assert_eq!(primary_language("").as_deref(), None);
    }

    #[test]
    fn default_locale_is_english() {
        assert_eq!(Locale::default().0, "en");
    }
}
