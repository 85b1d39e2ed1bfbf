//! Indenting HTML formatter
//!
//! Re-parses the captured markup with html5ever and writes one element per
//! line, two spaces per nesting level. Whitespace-only text is dropped and
//! other text has ASCII whitespace runs collapsed, which the HTML rendering
//! model already does. Elements whose content is whitespace-sensitive or raw
//! text (`pre`, `textarea`, `script`, `style`, ...) are emitted verbatim.

use html5ever::serialize::{SerializeOpts, TraversalScope, serialize};
use html5ever::tendril::TendrilSink;
use html5ever::{Attribute, ParseOpts, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

const INDENT: &str = "  ";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

const VERBATIM_ELEMENTS: &[&str] = &[
    "pre", "textarea", "script", "style", "xmp", "iframe", "noembed", "noframes", "noscript",
    "plaintext",
];

/// Pretty-print a full HTML document.
#[must_use]
pub fn pretty_print(html: &str) -> String {
    let dom = parse_document(RcDom::default(), ParseOpts::default()).one(html);

    let mut out = String::with_capacity(html.len() + html.len() / 4);
    for child in dom.document.children.borrow().iter() {
        write_node(child, 0, &mut out);
    }
    out
}

fn push_line(out: &mut String, depth: usize, line: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(line);
    out.push('\n');
}

fn write_node(handle: &Handle, depth: usize, out: &mut String) {
    match &handle.data {
        NodeData::Document => {
            for child in handle.children.borrow().iter() {
                write_node(child, depth, out);
            }
        }
        NodeData::Doctype {
            name,
            public_id,
            system_id,
        } => {
            push_line(out, depth, &doctype_line(name, public_id, system_id));
        }
        NodeData::Text { contents } => {
            let text = collapse_whitespace(&contents.borrow());
            if !text.is_empty() {
                push_line(out, depth, &escape_text(&text));
            }
        }
        NodeData::Comment { contents } => {
            push_line(out, depth, &format!("<!--{contents}-->"));
        }
        NodeData::ProcessingInstruction { .. } => {}
        NodeData::Element {
            name,
            attrs,
            template_contents,
            ..
        } => {
            let tag: &str = &name.local;
            let open = open_tag(tag, &attrs.borrow());

            if VOID_ELEMENTS.contains(&tag) {
                push_line(out, depth, &open);
                return;
            }

            if VERBATIM_ELEMENTS.contains(&tag) {
                let raw = serialize_verbatim(handle).unwrap_or_else(|e| {
                    log::warn!("Failed to serialize <{tag}> verbatim: {e}");
                    format!("{open}</{tag}>")
                });
                push_line(out, depth, &raw);
                return;
            }

            // <template> keeps its children in a separate document fragment
            let children: Vec<Handle> = match template_contents.borrow().as_ref() {
                Some(fragment) => fragment.children.borrow().clone(),
                None => handle.children.borrow().clone(),
            };
            let children: Vec<Handle> = children.into_iter().filter(is_significant).collect();
            let close = format!("</{tag}>");

            match children.as_slice() {
                [] => push_line(out, depth, &format!("{open}{close}")),
                [only] if matches!(only.data, NodeData::Text { .. }) => {
                    let NodeData::Text { contents } = &only.data else {
                        return;
                    };
                    let text = escape_text(&collapse_whitespace(&contents.borrow()));
                    push_line(out, depth, &format!("{open}{text}{close}"));
                }
                _ => {
                    push_line(out, depth, &open);
                    for child in &children {
                        write_node(child, depth + 1, out);
                    }
                    push_line(out, depth, &close);
                }
            }
        }
    }
}

fn is_significant(handle: &Handle) -> bool {
    match &handle.data {
        NodeData::Text { contents } => !contents
            .borrow()
            .chars()
            .all(|c| c.is_ascii_whitespace()),
        NodeData::ProcessingInstruction { .. } => false,
        _ => true,
    }
}

fn doctype_line(name: &str, public_id: &str, system_id: &str) -> String {
    let mut line = format!("<!DOCTYPE {name}");
    if !public_id.is_empty() {
        line.push_str(&format!(" PUBLIC \"{public_id}\""));
    } else if !system_id.is_empty() {
        line.push_str(" SYSTEM");
    }
    if !system_id.is_empty() {
        line.push_str(&format!(" \"{system_id}\""));
    }
    line.push('>');
    line
}

fn open_tag(tag: &str, attrs: &[Attribute]) -> String {
    let mut open = format!("<{tag}");
    for attr in attrs {
        open.push(' ');
        if let Some(prefix) = &attr.name.prefix {
            open.push_str(prefix);
            open.push(':');
        }
        open.push_str(&attr.name.local);
        open.push_str("=\"");
        open.push_str(&escape_attr(&attr.value));
        open.push('"');
    }
    open.push('>');
    open
}

fn serialize_verbatim(handle: &Handle) -> std::io::Result<String> {
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };
    let mut bytes = Vec::new();
    let serializable: SerializableHandle = handle.clone().into();
    serialize(&mut bytes, &serializable, opts)?;
    String::from_utf8(bytes).map_err(std::io::Error::other)
}

/// Collapse ASCII whitespace runs to one space; U+00A0 is content and stays.
fn collapse_whitespace(text: &str) -> String {
    text.split(|c: char| c.is_ascii_whitespace())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\u{a0}' => escaped.push_str("&nbsp;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\u{a0}' => escaped.push_str("&nbsp;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indents_nested_elements() {
        let html = r#"<!DOCTYPE html><html><head><title>Demo</title></head><body><div id="app"><p>Hello   <b>world</b></p><img src="data:image/png;base64,AAAA"><br></div></body></html>"#;

        let expected = r#"<!DOCTYPE html>
<html>
  <head>
    <title>Demo</title>
  </head>
  <body>
    <div id="app">
      <p>
        Hello
        <b>world</b>
      </p>
      <img src="data:image/png;base64,AAAA">
      <br>
    </div>
  </body>
</html>
"#;
        assert_eq!(pretty_print(html), expected);
    }

    #[test]
    fn test_reformatting_is_stable() {
        let html = r#"<html><head></head><body><ul><li>one</li><li>two &amp; three</li></ul></body></html>"#;
        let once = pretty_print(html);
        let twice = pretty_print(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_raw_text_elements_are_verbatim() {
        let html = "<html><head><script>if (a < b && c) { run(); }</script><style>a > b { color: red; }</style></head><body><pre>  keep\n    this</pre></body></html>";
        let pretty = pretty_print(html);

        assert!(pretty.contains("<script>if (a < b && c) { run(); }</script>"));
        assert!(pretty.contains("<style>a > b { color: red; }</style>"));
        assert!(pretty.contains("<pre>  keep\n    this</pre>"));
    }

    #[test]
    fn test_attributes_are_escaped() {
        let html = r#"<html><head></head><body><a href="/search?q=a&amp;b=c" title="say &quot;hi&quot;">x</a></body></html>"#;
        let pretty = pretty_print(html);
        assert!(pretty.contains(r#"<a href="/search?q=a&amp;b=c" title="say &quot;hi&quot;">x</a>"#));
    }

    #[test]
    fn test_doctype_with_identifiers() {
        assert_eq!(
            doctype_line(
                "html",
                "-//W3C//DTD XHTML 1.0 Strict//EN",
                "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd"
            ),
            r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd">"#
        );
        assert_eq!(
            doctype_line("html", "", "about:legacy-compat"),
            r#"<!DOCTYPE html SYSTEM "about:legacy-compat">"#
        );
    }

    #[test]
    fn test_nbsp_survives() {
        let html = "<html><head></head><body><p>a\u{a0}b</p></body></html>";
        assert!(pretty_print(html).contains("<p>a&nbsp;b</p>"));
    }
}
