use serde::Deserialize;

use super::ContentError;

const DELIMITER: &str = "---";

/// Header attributes recognised on a letter document. Anything else in the
/// YAML block is ignored.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LetterAttributes {
    pub title: Option<String>,
    pub date: Option<String>,
    pub theme: Option<String>,
    pub occasion: Option<String>,
    pub preview: Option<String>,
    pub audio: Option<String>,
    #[serde(rename = "coverImage")]
    pub cover_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document<'a> {
    pub attributes: LetterAttributes,
    pub body: &'a str,
}

/// Splits a raw document into its front-matter attributes and body.
///
/// A document without a leading `---` line has default attributes and the
/// whole text as its body.
pub fn parse(raw: &str) -> Result<Document<'_>, ContentError> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let Some(after_open) = strip_delimiter_line(raw) else {
        return Ok(Document {
            attributes: LetterAttributes::default(),
            body: raw,
        });
    };

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let header = &after_open[..offset];
            let body = &after_open[offset + line.len()..];
            let attributes = parse_attributes(header)?;
            return Ok(Document { attributes, body });
        }
        offset += line.len();
    }

    Err(ContentError::UnterminatedFrontMatter)
}

fn strip_delimiter_line(raw: &str) -> Option<&str> {
    let rest = raw.strip_prefix(DELIMITER)?;
    let line_end = rest.find('\n').unwrap_or(rest.len());
    if !rest[..line_end].trim().is_empty() {
        return None;
    }
    Some(rest.get(line_end + 1..).unwrap_or(""))
}

fn parse_attributes(header: &str) -> Result<LetterAttributes, ContentError> {
    if header.trim().is_empty() {
        return Ok(LetterAttributes::default());
    }
    let attributes: LetterAttributes = serde_yaml::from_str(header)?;
    Ok(attributes.without_blanks())
}

impl LetterAttributes {
    fn without_blanks(self) -> Self {
        fn keep(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }
        Self {
            title: keep(self.title),
            date: keep(self.date),
            theme: keep(self.theme),
            occasion: keep(self.occasion),
            preview: keep(self.preview),
            audio: keep(self.audio),
            cover_image: keep(self.cover_image),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn reads_known_keys_and_ignores_the_rest() {
        let raw = "---\ntitle: The First Rain\ndate: 2023-10-14\ncoverImage: img/rain.jpg\nmood: stormy\n---\nMy dearest,\n";
        let doc = parse(raw).expect("parse");
        assert_eq!(doc.attributes.title.as_deref(), Some("The First Rain"));
        assert_eq!(doc.attributes.date.as_deref(), Some("2023-10-14"));
        assert_eq!(doc.attributes.cover_image.as_deref(), Some("img/rain.jpg"));
        assert_eq!(doc.attributes.audio, None);
        assert_eq!(doc.body, "My dearest,\n");
    }

    #[test]
    fn missing_header_keeps_whole_text_as_body() {
        let doc = parse("just words\n---\nmore").expect("parse");
        assert_eq!(doc.attributes, LetterAttributes::default());
        assert_eq!(doc.body, "just words\n---\nmore");
    }

    #[test]
    fn blank_values_count_as_absent() {
        let doc = parse("---\ntitle: \"  \"\ntheme: Stars\n---\n").expect("parse");
        assert_eq!(doc.attributes.title, None);
        assert_eq!(doc.attributes.theme.as_deref(), Some("Stars"));
        assert_eq!(doc.body, "");
    }

    #[test]
    fn empty_header_block_is_allowed() {
        let doc = parse("---\n---\nbody").expect("parse");
        assert_eq!(doc.attributes, LetterAttributes::default());
        assert_eq!(doc.body, "body");
    }

    #[test]
    fn unterminated_header_is_an_error() {
        let err = parse("---\ntitle: Oops\nno closing line").unwrap_err();
        assert_matches!(err, ContentError::UnterminatedFrontMatter);
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let err = parse("---\ntitle: [unclosed\n---\nbody").unwrap_err();
        assert_matches!(err, ContentError::FrontMatter(_));
    }
}
