//! Top-level node splitting for selection HTML.
//!
//! Only the outermost nodes are separated; element contents are kept as
//! raw HTML and never descended into.

/// Elements that never have content or a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// An outermost node of an HTML fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An element with content: `<li>` + `inner` + `</li>`.
    /// `close` is empty when the fragment ends before the element does.
    Element {
        open: String,
        inner: String,
        close: String,
    },

    /// Character data between elements
    Text(String),

    /// Markup without content: void elements, comments, stray closing tags
    Markup(String),
}

impl Node {
    /// Write the node back out unchanged
    pub fn write_to(&self, out: &mut String) {
        match self {
            Node::Element { open, inner, close } => {
                out.push_str(open);
                out.push_str(inner);
                out.push_str(close);
            }
            Node::Text(text) | Node::Markup(text) => out.push_str(text),
        }
    }
}

/// Split `html` into its outermost nodes
pub fn top_level_nodes(html: &str) -> Vec<Node> {
    let mut nodes: Vec<Node> = Vec::new();
    let mut pos = 0;

    while pos < html.len() {
        let rest = &html[pos..];

        if !rest.starts_with('<') {
            let end = rest.find('<').unwrap_or(rest.len());
            push_text(&mut nodes, &rest[..end]);
            pos += end;
            continue;
        }

        if rest.starts_with("<!--") {
            let end = rest.find("-->").map(|i| i + 3).unwrap_or(rest.len());
            nodes.push(Node::Markup(rest[..end].to_string()));
            pos += end;
            continue;
        }

        let tag_len = tag_length(rest).unwrap_or(0);
        let tag = &rest[..tag_len];
        let name = tag_name(tag);

        if name.is_empty() {
            // A lone '<' that does not start a tag
            push_text(&mut nodes, "<");
            pos += 1;
            continue;
        }

        if tag.starts_with("</")
            || tag.ends_with("/>")
            || VOID_ELEMENTS.contains(&name.as_str())
        {
            nodes.push(Node::Markup(tag.to_string()));
            pos += tag_len;
            continue;
        }

        let body = &rest[tag_len..];
        match find_closing_tag(body, &name) {
            Some((inner_len, close_len)) => {
                nodes.push(Node::Element {
                    open: tag.to_string(),
                    inner: body[..inner_len].to_string(),
                    close: body[inner_len..inner_len + close_len].to_string(),
                });
                pos += tag_len + inner_len + close_len;
            }
            None => {
                nodes.push(Node::Element {
                    open: tag.to_string(),
                    inner: body.to_string(),
                    close: String::new(),
                });
                break;
            }
        }
    }

    nodes
}

fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if let Some(Node::Text(last)) = nodes.last_mut() {
        last.push_str(text);
    } else {
        nodes.push(Node::Text(text.to_string()));
    }
}

/// Byte length of the tag starting at `s[0] == '<'`, quotes respected
fn tag_length(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices().skip(1) {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '>') => return Some(i + 1),
            (None, '<') => return None,
            _ => {}
        }
    }
    None
}

/// Lowercased element name of an opening or closing tag
fn tag_name(tag: &str) -> String {
    let rest = tag.trim_start_matches('<').trim_start_matches('/');
    let name: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    if name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        name.to_ascii_lowercase()
    } else {
        String::new()
    }
}

/// Find the tag closing an element named `name` whose content starts at
/// `body`. Returns the content length and the closing tag's length.
fn find_closing_tag(body: &str, name: &str) -> Option<(usize, usize)> {
    let mut depth = 0usize;
    let mut pos = 0;

    while let Some(offset) = body[pos..].find('<') {
        let start = pos + offset;
        let rest = &body[start..];

        if rest.starts_with("<!--") {
            pos = start + rest.find("-->").map(|i| i + 3).unwrap_or(rest.len());
            continue;
        }

        let Some(tag_len) = tag_length(rest) else {
            pos = start + 1;
            continue;
        };
        let tag = &rest[..tag_len];

        if tag_name(tag) == name {
            if tag.starts_with("</") {
                if depth == 0 {
                    return Some((start, tag_len));
                }
                depth -= 1;
            } else if !tag.ends_with("/>") {
                depth += 1;
            }
        }
        pos = start + tag_len;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(open: &str, inner: &str, close: &str) -> Node {
        Node::Element {
            open: open.into(),
            inner: inner.into(),
            close: close.into(),
        }
    }

    #[test]
    fn test_list_items() {
        let nodes = top_level_nodes("<li>one</li><li class=\"x\">two</li>");
        assert_eq!(
            nodes,
            vec![
                element("<li>", "one", "</li>"),
                element("<li class=\"x\">", "two", "</li>"),
            ]
        );
    }

    #[test]
    fn test_nested_same_name() {
        let nodes = top_level_nodes("<div>a<div>b</div>c</div>tail");
        assert_eq!(
            nodes,
            vec![
                element("<div>", "a<div>b</div>c", "</div>"),
                Node::Text("tail".into()),
            ]
        );
    }

    #[test]
    fn test_text_void_and_comments() {
        let nodes = top_level_nodes("one<br>two<!-- note --><img src=\"a>b.png\"/>");
        assert_eq!(
            nodes,
            vec![
                Node::Text("one".into()),
                Node::Markup("<br>".into()),
                Node::Text("two".into()),
                Node::Markup("<!-- note -->".into()),
                Node::Markup("<img src=\"a>b.png\"/>".into()),
            ]
        );
    }

    #[test]
    fn test_lone_angle_bracket_is_text() {
        let nodes = top_level_nodes("a < b");
        assert_eq!(nodes, vec![Node::Text("a < b".into())]);
    }

    #[test]
    fn test_unclosed_element() {
        let nodes = top_level_nodes("<b>bold");
        assert_eq!(nodes, vec![element("<b>", "bold", "")]);
    }

    #[test]
    fn test_write_to_round_trips() {
        let html = "x<ul><li>a</li></ul><br>y</p>";
        let mut out = String::new();
        for node in top_level_nodes(html) {
            node.write_to(&mut out);
        }
        assert_eq!(out, html);
    }
}
