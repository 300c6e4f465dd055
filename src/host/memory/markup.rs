//! Markup parsing for [`super::MemoryHost`].
//!
//! Lexing happens in two modes: between tags ([`Content`]) and inside an opening tag ([`Tag`]).
//! The lexer is morphed from one to the other whenever a tag opens or closes.

use logos::{Lexer, Logos};

use super::MemoryNode;
use crate::{Error, Result};

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub(super) fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Content {
    #[regex(r"<[a-zA-Z][a-zA-Z0-9-]*")]
    OpenTag,

    #[regex(r"</[a-zA-Z][a-zA-Z0-9-]*[ \t\r\n]*>")]
    CloseTag,

    #[regex(r"<!--([^-]|-[^-])*-->")]
    Comment,

    #[regex(r"[^<]+")]
    Text,
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
enum Tag {
    /// Attribute name, or an unquoted attribute value.
    #[regex(r#"[^ \t\r\n"'=<>/`]+"#)]
    Word,

    #[token("=")]
    Equals,

    #[regex(r#""[^"]*""#)]
    DoubleQuoted,

    #[regex(r"'[^']*'")]
    SingleQuoted,

    #[token(">")]
    End,

    #[token("/>")]
    SelfClose,
}

/// Parse `markup` into a detached `template` element holding the top level nodes.
pub(super) fn parse(markup: &str) -> Result<MemoryNode> {
    let root = MemoryNode::element("template");
    let mut stack = vec![root.clone()];
    let mut lexer = Content::lexer(markup);

    while let Some(token) = lexer.next() {
        let position = lexer.span().start;
        let token = token.map_err(|_| Error::markup(position, "unexpected `<`"))?;
        let parent = stack.last().cloned().unwrap_or_else(|| root.clone());

        match token {
            Content::Text => parent.append(&MemoryNode::text(&unescape(lexer.slice())))?,
            Content::Comment => {
                let slice = lexer.slice();
                parent.append(&MemoryNode::comment(&slice[4..slice.len() - 3]))?;
            }
            Content::CloseTag => {
                let name = lexer.slice()[2..]
                    .trim_end_matches('>')
                    .trim()
                    .to_ascii_lowercase();

                let open = stack
                    .last()
                    .filter(|_| stack.len() > 1)
                    .map(|node| tag_name(node));

                if open.as_deref() != Some(name.as_str()) {
                    return Err(Error::markup(
                        position,
                        format!("unexpected closing tag `</{name}>`"),
                    ));
                }

                stack.pop();
            }
            Content::OpenTag => {
                let tag = lexer.slice()[1..].to_ascii_lowercase();
                let element = MemoryNode::element(&tag);

                let mut tag_lexer = lexer.morph::<Tag>();
                let self_closing = attributes(&mut tag_lexer, &element)?;
                lexer = tag_lexer.morph();

                parent.append(&element)?;
                if !self_closing && !is_void(&tag) {
                    stack.push(element);
                }
            }
        }
    }

    if stack.len() > 1 {
        let open = stack.last().map(tag_name).unwrap_or_default();
        return Err(Error::markup(markup.len(), format!("unclosed tag `<{open}>`")));
    }

    Ok(root)
}

fn tag_name(node: &MemoryNode) -> String {
    match &node.0.borrow().data {
        super::Data::Element { tag, .. } => tag.clone(),
        _ => String::new(),
    }
}

/// Consume the inside of an opening tag, setting each attribute on `element`. Returns whether the
/// tag was self closing.
fn attributes(lexer: &mut Lexer<Tag>, element: &MemoryNode) -> Result<bool> {
    let mut pending: Option<String> = None;

    loop {
        let position = lexer.span().end;
        let Some(token) = lexer.next() else {
            return Err(Error::markup(position, "unterminated tag"));
        };
        let token = token.map_err(|_| Error::markup(lexer.span().start, "invalid attribute"))?;

        match token {
            Tag::Word => {
                // A bare attribute followed by another attribute
                if let Some(name) = pending.replace(lexer.slice().to_ascii_lowercase()) {
                    element.set_attribute(&name, "")?;
                }
            }
            Tag::Equals => {
                let name = pending
                    .take()
                    .ok_or_else(|| Error::markup(lexer.span().start, "value without a name"))?;

                let value = match lexer.next() {
                    Some(Ok(Tag::Word)) => lexer.slice(),
                    Some(Ok(Tag::DoubleQuoted | Tag::SingleQuoted)) => {
                        let slice = lexer.slice();
                        &slice[1..slice.len() - 1]
                    }
                    _ => {
                        return Err(Error::markup(
                            lexer.span().start,
                            format!("missing value for `{name}`"),
                        ))
                    }
                };

                element.set_attribute(&name, &unescape(value))?;
            }
            Tag::End | Tag::SelfClose => {
                if let Some(name) = pending.take() {
                    element.set_attribute(&name, "")?;
                }

                return Ok(token == Tag::SelfClose);
            }
            Tag::DoubleQuoted | Tag::SingleQuoted => {
                return Err(Error::markup(lexer.span().start, "value without a name"));
            }
        }
    }
}

const ENTITIES: &[(&str, &str)] = &[
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&amp;", "&"),
];

fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];

        match ENTITIES.iter().find(|(entity, _)| rest.starts_with(entity)) {
            Some((entity, replacement)) => {
                out.push_str(replacement);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

pub(super) fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::host::{Host, MemoryHost, NodeKind};

    #[test]
    fn parses_nested_elements_and_text() {
        let host = MemoryHost::new();
        let root = parse("<div id='a'><span>hi</span> <b>there</b></div>").unwrap();

        let roots = host.children(&root);
        assert_eq!(roots.len(), 1);
        assert_eq!(host.kind(&roots[0]), NodeKind::Element("div".into()));
        assert_eq!(host.attribute(&roots[0], "id").as_deref(), Some("a"));

        let kinds = host
            .children(&roots[0])
            .iter()
            .map(|child| host.kind(child))
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Element("span".into()),
                NodeKind::Text(" ".into()),
                NodeKind::Element("b".into()),
            ]
        );
    }

    #[test]
    fn attribute_forms() {
        let host = MemoryHost::new();
        let root = parse(r#"<input disabled type=text value="{{name}}" data-x='1'/>"#).unwrap();
        let input = &host.children(&root)[0];

        assert_eq!(
            host.attributes(input),
            vec![
                ("disabled".to_string(), String::new()),
                ("type".to_string(), "text".to_string()),
                ("value".to_string(), "{{name}}".to_string()),
                ("data-x".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn void_elements_do_not_nest() {
        let host = MemoryHost::new();
        let root = parse("<p>a<br>b</p>").unwrap();
        let p = &host.children(&root)[0];

        assert_eq!(host.children(p).len(), 3);
    }

    #[test]
    fn comments_are_kept_as_other_nodes() {
        let host = MemoryHost::new();
        let root = parse("<!-- note --><p></p>").unwrap();
        let children = host.children(&root);

        assert_eq!(host.kind(&children[0]), NodeKind::Other);
        assert_eq!(host.kind(&children[1]), NodeKind::Element("p".into()));
    }

    #[test]
    fn mismatched_close_is_an_error() {
        assert!(matches!(
            parse("<div><span></div>"),
            Err(Error::Markup { .. })
        ));
        assert!(matches!(parse("</p>"), Err(Error::Markup { .. })));
        assert!(matches!(parse("<div>"), Err(Error::Markup { .. })));
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(unescape("a &lt;b&gt; &amp;amp; &unknown;"), "a <b> &amp; &unknown;");
    }
}
