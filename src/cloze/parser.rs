use super::{Cloze, MarkerFamily, Segment, SEPARATOR};

/// Split `input` into plain text and cloze segments of one family.
///
/// A marker's content and hint never span a line break; an opening
/// sequence that is not followed by a complete marker stays plain text.
/// Adjacent text is merged, so no two `Segment::Text` follow each other.
pub fn parse(family: MarkerFamily, input: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut rest = input;

    while let Some(start) = rest.find(family.prefix()) {
        let candidate = &rest[start..];
        match match_cloze(family, candidate) {
            Some((cloze, consumed)) => {
                text.push_str(&rest[..start]);
                if !text.is_empty() {
                    segments.push(Segment::Text(std::mem::take(&mut text)));
                }
                segments.push(Segment::Cloze(cloze));
                rest = &candidate[consumed..];
            }
            None => {
                // Prefixes start with an ASCII bracket, one byte is a char boundary
                let skip = start + 1;
                text.push_str(&rest[..skip]);
                rest = &rest[skip..];
            }
        }
    }

    text.push_str(rest);
    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }

    segments
}

/// Write segments back out as markup
pub fn serialize(family: MarkerFamily, segments: &[Segment]) -> String {
    let mut output = String::new();
    for segment in segments {
        match segment {
            Segment::Text(text) => output.push_str(text),
            Segment::Cloze(cloze) => output.push_str(&cloze.to_markup(family)),
        }
    }
    output
}

/// Remove every marker of `family`, keeping only the visible content
pub fn strip(family: MarkerFamily, input: &str) -> String {
    parse(family, input)
        .iter()
        .map(Segment::visible_text)
        .collect()
}

/// Match one marker at the start of `s`, returning it and its byte length
fn match_cloze(family: MarkerFamily, s: &str) -> Option<(Cloze, usize)> {
    let prefix_len = family.prefix().len();
    let after_prefix = &s[prefix_len..];

    let digits = after_prefix
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }
    let index: u32 = after_prefix[..digits].parse().ok()?;

    let body = after_prefix[digits..].strip_prefix(SEPARATOR)?;
    let body_offset = prefix_len + digits + SEPARATOR.len();

    let end = body.find(family.suffix())?;
    let inner = &body[..end];
    if inner.contains(['\n', '\r']) {
        return None;
    }

    let (content, hint) = match inner.find(SEPARATOR) {
        Some(split) => (&inner[..split], Some(&inner[split + SEPARATOR.len()..])),
        None => (inner, None),
    };

    let cloze = Cloze {
        index,
        content: content.to_string(),
        hint: hint.map(str::to_string),
    };

    Some((cloze, body_offset + end + family.suffix().len()))
}
