//! Lossy HTML rendering of a document tree.
//!
//! The output mirrors what the live surface renders: pages and regions
//! become `div`s with a class, block ids land on the `id` attribute and
//! marks wrap text in their inline tags.

use crate::mark::Mark;
use crate::node::Node;
use crate::schema::NodeKind;
use std::fmt::Write;

/// Render a node and its subtree as HTML.
pub fn to_html(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

fn write_node(out: &mut String, node: &Node) {
    if let Some(text) = node.as_text() {
        write_marked(out, node.marks(), &escape(text));
        return;
    }

    let attrs = node.attrs();
    let mut open = String::new();
    let (tag, close) = match node.kind() {
        NodeKind::Doc => ("div", true),
        NodeKind::Page | NodeKind::Header | NodeKind::Content | NodeKind::Footer => {
            let _ = write!(open, " class=\"{}\"", node.kind());
            ("div", true)
        }
        NodeKind::Paragraph => {
            let _ = write!(open, " style=\"text-align: {}\"", attrs.align().unwrap_or_default());
            ("p", true)
        }
        NodeKind::Heading => {
            let _ = write!(open, " style=\"text-align: {}\"", attrs.align().unwrap_or_default());
            (heading_tag(attrs.level().unwrap_or(1)), true)
        }
        NodeKind::Blockquote => ("blockquote", true),
        NodeKind::HorizontalRule => ("hr", false),
        NodeKind::CodeBlock => ("pre", true),
        NodeKind::BulletList => ("ul", true),
        NodeKind::OrderedList => ("ol", true),
        NodeKind::ListItem => ("li", true),
        NodeKind::Table => ("table", true),
        NodeKind::TableRow => ("tr", true),
        NodeKind::TableCell | NodeKind::TableHeader => {
            if let Some(color) = attrs.background() {
                let _ = write!(open, " style=\"background-color: {};\"", escape(color));
            }
            (if node.kind() == NodeKind::TableCell { "td" } else { "th" }, true)
        }
        NodeKind::Image => {
            for (key, value) in attrs.to_map() {
                if let crate::attrs::AttrValue::Str(value) = value {
                    let _ = write!(open, " {}=\"{}\"", key, escape(&value));
                }
            }
            ("img", false)
        }
        NodeKind::HardBreak => {
            open.push_str(" class=\"page-break\" style=\"break-after:page\"");
            ("br", false)
        }
        NodeKind::Text => ("span", true),
    };
    if let Some(id) = node.id() {
        let _ = write!(open, " id=\"{}\"", escape(id));
    }

    let body: String = {
        let mut inner = String::new();
        node.children().iter().for_each(|c| write_node(&mut inner, c));
        inner
    };
    let marked = |out: &mut String, html: String| write_marked(out, node.marks(), &html);

    if !close {
        marked(out, format!("<{}{}>", tag, open));
    } else if node.kind() == NodeKind::CodeBlock {
        out.push_str(&format!("<pre{}><code>{}</code></pre>", open, body));
    } else {
        marked(out, format!("<{}{}>{}</{}>", tag, open, body, tag));
    }
}

fn heading_tag(level: u8) -> &'static str {
    match level {
        1 => "h1",
        2 => "h2",
        3 => "h3",
        4 => "h4",
        5 => "h5",
        _ => "h6",
    }
}

/// Wrap `html` in the tags of `marks`, outermost first.
fn write_marked(out: &mut String, marks: &[Mark], html: &str) {
    for mark in marks {
        let _ = match mark {
            Mark::Bold => write!(out, "<strong>"),
            Mark::Italic => write!(out, "<em>"),
            Mark::Underline => write!(out, "<u>"),
            Mark::Strikethrough => write!(out, "<s>"),
            Mark::Code => write!(out, "<code>"),
            Mark::Link { href, title } => match title {
                Some(title) => write!(out, "<a href=\"{}\" title=\"{}\">", escape(href), escape(title)),
                None => write!(out, "<a href=\"{}\">", escape(href)),
            },
            Mark::Comment { id, color } => write!(
                out,
                "<span class=\"comment\" data-comment-id=\"{}\" data-comment-color=\"{}\" style=\"--comment-bgcolor: {};\">",
                escape(id),
                escape(color),
                escape(color)
            ),
        };
    }
    out.push_str(html);
    for mark in marks.iter().rev() {
        out.push_str(match mark {
            Mark::Bold => "</strong>",
            Mark::Italic => "</em>",
            Mark::Underline => "</u>",
            Mark::Strikethrough => "</s>",
            Mark::Code => "</code>",
            Mark::Link { .. } => "</a>",
            Mark::Comment { .. } => "</span>",
        });
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::Attrs;
    use crate::builders::*;

    #[test]
    fn test_paragraph_with_marks_and_id() {
        let p = paragraph_with(vec![
            text("a < b "),
            text_with_marks("bold", vec![Mark::Bold, Mark::link("https://x.y")]),
        ])
        .with_attrs(Attrs::default_for(NodeKind::Paragraph).with_id(Some("p1".into())));
        assert_eq!(
            to_html(&p),
            "<p style=\"text-align: left\" id=\"p1\">a &lt; b <a href=\"https://x.y\"><strong>bold</strong></a></p>"
        );
    }

    #[test]
    fn test_page_structure() {
        let html = to_html(&doc(vec![empty_page()]));
        assert_eq!(
            html,
            "<div><div class=\"page\"><div class=\"header\"></div><div class=\"content\"></div><div class=\"footer\"></div></div></div>"
        );
    }

    #[test]
    fn test_leaves_and_code() {
        assert_eq!(to_html(&horizontal_rule()), "<hr>");
        assert_eq!(to_html(&code_block("x<y")), "<pre><code>x&lt;y</code></pre>");
        assert_eq!(
            to_html(&hard_break()),
            "<br class=\"page-break\" style=\"break-after:page\">"
        );
    }
}
