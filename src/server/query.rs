//! Query string parsing.

use std::borrow::Cow;

/// Percent-decode a query component, treating `+` as a space.
#[inline]
pub fn decode_component(s: &str) -> String {
    let s: Cow<'_, str> = if s.contains('+') {
        Cow::Owned(s.replace('+', " "))
    } else {
        Cow::Borrowed(s)
    };

    if s.contains('%') {
        percent_encoding::percent_decode_str(&s)
            .decode_utf8_lossy()
            .into_owned()
    } else {
        s.into_owned()
    }
}

/// Parameters of a status query.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StatusQuery {
    pub key: Option<String>,
    pub host: Option<String>,
}

impl StatusQuery {
    /// Parse `key` and `host` out of a raw query string. The first
    /// occurrence of a parameter wins; empty values count as missing.
    pub fn parse(query: &str) -> Self {
        let mut parsed = Self::default();

        for pair in query.split('&') {
            if pair.is_empty() {
                continue;
            }

            let (key, value) = match pair.find('=') {
                Some(pos) => (&pair[..pos], &pair[pos + 1..]),
                None => (pair, ""),
            };

            let slot = match decode_component(key).as_str() {
                "key" => &mut parsed.key,
                "host" => &mut parsed.host,
                _ => continue,
            };

            if slot.is_none() {
                let value = decode_component(value);
                if !value.is_empty() {
                    *slot = Some(value);
                }
            }
        }

        parsed
    }
}
