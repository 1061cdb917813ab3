//! Serializing a [`Document`] back to text.
//!
//! The layout mirrors what MSBuild tooling produces when saving an indented
//! document: no declaration, two spaces per level, `<Empty />` elements, and
//! elements containing text written on a single line.

use super::{Attribute, Document, NodeId, NodeKind};

const INDENT: &str = "  ";

/// Serialize the whole document, terminated by a newline.
pub(crate) fn write_document(document: &Document) -> String {
    let mut out = String::new();
    for &child in document.children(Document::document_node()) {
        write_block(document, child, 0, &mut out);
        out.push('\n');
    }
    out
}

fn write_block(document: &Document, id: NodeId, depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }

    let NodeKind::Element { name, attributes } = document.kind(id) else {
        write_inline(document, id, out);
        return;
    };

    let children = document.children(id);
    write_start_tag(name, attributes, children.is_empty(), out);
    if children.is_empty() {
        return;
    }

    if has_text_content(document, children) {
        for &child in children {
            write_inline(document, child, out);
        }
    } else {
        out.push('\n');
        for &child in children {
            write_block(document, child, depth + 1, out);
            out.push('\n');
        }
        for _ in 0..depth {
            out.push_str(INDENT);
        }
    }

    write_end_tag(name, out);
}

fn write_inline(document: &Document, id: NodeId, out: &mut String) {
    match document.kind(id) {
        NodeKind::Element { name, attributes } => {
            let children = document.children(id);
            write_start_tag(name, attributes, children.is_empty(), out);
            if !children.is_empty() {
                for &child in children {
                    write_inline(document, child, out);
                }
                write_end_tag(name, out);
            }
        }
        NodeKind::Text(text) => out.push_str(&escape_text(text)),
        NodeKind::CData(text) => {
            out.push_str("<![CDATA[");
            out.push_str(text);
            out.push_str("]]>");
        }
        NodeKind::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeKind::ProcessingInstruction(content) => {
            out.push_str("<?");
            out.push_str(content);
            out.push_str("?>");
        }
        NodeKind::Document => {
            for &child in document.children(id) {
                write_inline(document, child, out);
            }
        }
    }
}

fn write_start_tag(name: &str, attributes: &[Attribute], self_closing: bool, out: &mut String) {
    out.push('<');
    out.push_str(name);
    for attribute in attributes {
        out.push(' ');
        out.push_str(&attribute.name);
        out.push_str("=\"");
        out.push_str(&escape_attribute(&attribute.value));
        out.push('"');
    }
    out.push_str(if self_closing { " />" } else { ">" });
}

fn write_end_tag(name: &str, out: &mut String) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Mixed content keeps its original layout, so any text child switches the
/// element to single-line output.
fn has_text_content(document: &Document, children: &[NodeId]) -> bool {
    children.iter().any(|&child| {
        matches!(
            document.kind(child),
            NodeKind::Text(_) | NodeKind::CData(_)
        )
    })
}

fn escape_text(text: &str) -> String {
    escape(text, false)
}

/// Attribute values also escape quotes, and line breaks and tabs as
/// character references, so a reader does not normalize them to spaces.
fn escape_attribute(value: &str) -> String {
    escape(value, true)
}

fn escape(text: &str, in_attribute: bool) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if in_attribute => escaped.push_str("&quot;"),
            '\n' if in_attribute => escaped.push_str("&#xA;"),
            '\r' if in_attribute => escaped.push_str("&#xD;"),
            '\t' if in_attribute => escaped.push_str("&#x9;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
