//! Localized message catalog.
//!
//! Messages are looked up by key in the bundle of the requested locale and
//! then in the base bundle. Templates use `{0}`, `{1}`, ... placeholders for
//! positional arguments.

use std::collections::HashMap;

use derive_more::Display;

/// Message keys resolved through the catalog.
pub mod key {
    pub const INTERNAL: &str = "error.internal";
    pub const INPUT_UNREADABLE: &str = "error.input.unreadable";
    pub const ID_MINSIZE: &str = "error.id.minsize";
    pub const NAME_NOTNULL: &str = "error.name.notnull";
    pub const BIRTHDATE_NOTNULL: &str = "error.birthdate.notnull";
    pub const CONVERSION: &str = "error.conversion";
    pub const USER_RETRIEVE_ALL: &str = "error.user.retrieveall";
    pub const USER_RETRIEVE: &str = "error.user.retrieve";
    pub const USER_CREATION: &str = "error.user.creation";
    pub const USER_UPDATE: &str = "error.user.update";
    pub const USER_DELETION: &str = "error.user.deletion";
}

const BASE_BUNDLE: &str = include_str!("../resources/messages/messages.properties");
const ES_BUNDLE: &str = include_str!("../resources/messages/messages_es.properties");

/// Primary language subtag of a requested locale, `None` for the base bundle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Locale(Option<String>);

impl Locale {
    pub fn base() -> Self {
        Self(None)
    }

    pub fn language(language: &str) -> Self {
        Self(Some(language.to_ascii_lowercase()))
    }

    /// Picks the highest weighted language of an `Accept-Language` header.
    pub fn from_accept_language(header: Option<&str>) -> Self {
        let mut best: Option<(&str, f32)> = None;

        for entry in header.unwrap_or_default().split(',') {
            let mut parts = entry.split(';').map(str::trim);
            let tag = match parts.next() {
                Some(tag) if !tag.is_empty() && tag != "*" => tag,
                _ => continue,
            };
            let weight = parts
                .find_map(|param| param.strip_prefix("q="))
                .map_or(Some(1.0), |q| q.parse::<f32>().ok());

            if let Some(weight) = weight {
                if weight > 0.0 && best.map_or(true, |(_, w)| weight > w) {
                    best = Some((tag, weight));
                }
            }
        }

        match best.and_then(|(tag, _)| tag.split('-').next()) {
            Some(language) if !language.is_empty() => Self::language(language),
            _ => Self::base(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum MessageError {
    #[display(fmt = "No message found under code '{_0}' for locale '{_1}'")]
    NoSuchMessage(String, String),
}

impl std::error::Error for MessageError {}

type Bundle = HashMap<String, String>;

#[derive(Debug, Clone, Default)]
pub struct MessageSource {
    base: Bundle,
    bundles: HashMap<String, Bundle>,
}

impl MessageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog compiled into the binary: English base bundle plus Spanish.
    pub fn embedded() -> Self {
        Self::new()
            .with_base(BASE_BUNDLE)
            .with_bundle("es", ES_BUNDLE)
    }

    pub fn with_base(mut self, properties: &str) -> Self {
        self.base.extend(parse_properties(properties));
        self
    }

    pub fn with_bundle(mut self, language: &str, properties: &str) -> Self {
        self.bundles
            .entry(language.to_ascii_lowercase())
            .or_default()
            .extend(parse_properties(properties));
        self
    }

    pub fn message(
        &self,
        key: &str,
        args: &[String],
        locale: &Locale,
    ) -> Result<String, MessageError> {
        let template = locale
            .as_str()
            .and_then(|language| self.bundles.get(language))
            .and_then(|bundle| bundle.get(key))
            .or_else(|| self.base.get(key))
            .ok_or_else(|| {
                MessageError::NoSuchMessage(
                    key.into(),
                    locale.as_str().unwrap_or_default().into(),
                )
            })?;

        Ok(format_template(template, args))
    }

    /// Resolves a message, falling back to the raw key when it is missing.
    pub fn message_or_key(&self, key: &str, args: &[String], locale: &Locale) -> String {
        self.message(key, args, locale).unwrap_or_else(|err| {
            tracing::warn!("{err}");
            key.into()
        })
    }
}

/// Single pass over the template, text inside arguments is never expanded.
fn format_template(template: &str, args: &[String]) -> String {
    let mut text = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        text.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let placeholder = after.find('}').and_then(|end| {
            let index: usize = after[..end].parse().ok()?;
            Some((args.get(index)?, end))
        });

        match placeholder {
            Some((arg, end)) => {
                text.push_str(arg);
                rest = &after[end + 1..];
            }
            None => {
                text.push('{');
                rest = after;
            }
        }
    }

    text.push_str(rest);
    text
}

fn parse_properties(source: &str) -> impl Iterator<Item = (String, String)> + '_ {
    source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .filter_map(|line| {
            let (key, value) = line.split_once(|c: char| c == '=' || c == ':')?;
            Some((key.trim().to_owned(), value.trim().to_owned()))
        })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn embedded_catalog_resolves_every_key() {
        let messages = MessageSource::embedded();
        let keys = [
            key::INTERNAL,
            key::INPUT_UNREADABLE,
            key::ID_MINSIZE,
            key::NAME_NOTNULL,
            key::BIRTHDATE_NOTNULL,
            key::CONVERSION,
            key::USER_RETRIEVE_ALL,
            key::USER_RETRIEVE,
            key::USER_CREATION,
            key::USER_UPDATE,
            key::USER_DELETION,
        ];

        for locale in [Locale::base(), Locale::language("es")] {
            for key in keys {
                assert!(
                    messages.message(key, &[], &locale).is_ok(),
                    "{key} missing for {locale:?}"
                );
            }
        }
    }

    #[test]
    fn substitutes_positional_arguments() {
        let messages = MessageSource::new().with_base("greeting = Hello {0}, meet {1}\n");

        let text = messages
            .message("greeting", &["Frodo".into(), "Sam".into()], &Locale::base())
            .unwrap();

        assert_eq!(text, "Hello Frodo, meet Sam");
    }

    #[test]
    fn arguments_are_not_expanded_again() {
        let messages = MessageSource::embedded();

        let text = messages
            .message(
                key::USER_CREATION,
                &["{1}".into(), "18-01-1972".into()],
                &Locale::base(),
            )
            .unwrap();

        assert_eq!(
            text,
            "The user with name {1} and birth date 18-01-1972 could not be created."
        );
    }

    #[test]
    fn placeholders_without_argument_stay_literal() {
        assert_eq!(
            format_template("{0} and {1} {x} {", &["one".into()]),
            "one and {1} {x} {"
        );
    }

    #[test]
    fn locale_bundle_falls_back_to_base() {
        let messages = MessageSource::new()
            .with_base("a=base a\nb=base b\n")
            .with_bundle("es", "a=es a\n");
        let es = Locale::language("es");

        assert_eq!(messages.message("a", &[], &es).unwrap(), "es a");
        assert_eq!(messages.message("b", &[], &es).unwrap(), "base b");
        assert_eq!(
            messages.message("a", &[], &Locale::language("fr")).unwrap(),
            "base a"
        );
    }

    #[test]
    fn missing_key_is_an_error_and_falls_back_to_key() {
        let messages = MessageSource::new();

        assert_eq!(
            messages.message("nope", &[], &Locale::base()),
            Err(MessageError::NoSuchMessage("nope".into(), "".into()))
        );
        assert_eq!(messages.message_or_key("nope", &[], &Locale::base()), "nope");
    }

    #[test]
    fn properties_skip_comments_and_blank_lines() {
        let parsed: Vec<_> = parse_properties("# comment\n\n! other\nkey: value\n").collect();

        assert_eq!(parsed, vec![("key".to_owned(), "value".to_owned())]);
    }

    #[test]
    fn accept_language_picks_highest_weight() {
        assert_eq!(
            Locale::from_accept_language(Some("en;q=0.4, es-ES;q=0.9, *;q=1")),
            Locale::language("es")
        );
        assert_eq!(
            Locale::from_accept_language(Some("ES-mx")),
            Locale::language("es")
        );
        assert_eq!(Locale::from_accept_language(Some("")), Locale::base());
        assert_eq!(Locale::from_accept_language(None), Locale::base());
    }
}
