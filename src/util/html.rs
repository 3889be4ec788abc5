//! Text helpers for scraped markup.
//!
//! `lol_html` hands text chunks and attribute values over undecoded, so
//! entity references and layout whitespace are cleaned up here.

/// Longest reference name worth handing to the decoder.
const MAX_REFERENCE_LEN: usize = 32;

/// Decode HTML character references in text or attribute values.
///
/// Stray ampersands and unknown references are kept as written.
pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }
    if let Ok(decoded) = htmlescape::decode_html(input) {
        return decoded;
    }

    let mut output = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find('&') {
        output.push_str(&rest[..start]);
        let tail = &rest[start..];
        let reference = tail
            .find(';')
            .filter(|end| *end <= MAX_REFERENCE_LEN)
            .and_then(|end| {
                htmlescape::decode_html(&tail[..=end])
                    .ok()
                    .map(|decoded| (decoded, end))
            });
        match reference {
            Some((decoded, end)) => {
                output.push_str(&decoded);
                rest = &tail[end + 1..];
            }
            None => {
                output.push('&');
                rest = &tail[1..];
            }
        }
    }
    output.push_str(rest);
    output
}

/// Decode entities, then collapse runs of whitespace into single spaces.
pub fn clean_text(input: &str) -> String {
    decode_entities(input)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_named_and_numeric_references() {
        assert_eq!(decode_entities("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(decode_entities("&#8364;12,99"), "€12,99");
        assert_eq!(decode_entities("&#x27;quoted&#x27;"), "'quoted'");
    }

    #[test]
    fn decodes_german_named_references() {
        assert_eq!(
            decode_entities("Sch&ouml;n, gr&uuml;n, K&auml;se, Stra&szlig;e"),
            "Schön, grün, Käse, Straße"
        );
    }

    #[test]
    fn leaves_unknown_references_untouched() {
        assert_eq!(decode_entities("a &bogus; b"), "a &bogus; b");
        assert_eq!(decode_entities("fish & chips"), "fish & chips");
        assert_eq!(decode_entities("fish & chips &amp; peas"), "fish & chips & peas");
    }

    #[test]
    fn clean_text_collapses_whitespace() {
        assert_eq!(clean_text("\n   Batman:\n  Year&nbsp;One  "), "Batman: Year One");
    }
}
