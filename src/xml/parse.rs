//! Building a [`Document`] from text with the `quick-xml` pull parser.

use quick_xml::{
    Reader,
    escape::unescape,
    events::{BytesStart, Event},
};

use super::{Attribute, DOCUMENT_NODE, Document, NodeId, NodeKind, XmlError};

/// Parse `text` into a document.
///
/// Whitespace-only text is dropped from elements without other text
/// content, so indentation is not kept. In mixed content every text node is
/// kept as is. The XML declaration and any DOCTYPE are dropped, and a
/// leading byte order mark is ignored.
pub(crate) fn parse_document(text: &str) -> Result<Document, XmlError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(false);

    let mut document = Document::empty();
    let mut open: Vec<NodeId> = Vec::new();
    let mut root_seen = false;

    loop {
        let parent = open.last().copied().unwrap_or(DOCUMENT_NODE);

        match reader.read_event()? {
            Event::Start(start) => {
                check_single_root(&open, &mut root_seen, &start)?;
                let element = document.append_node(parent, element_kind(&start)?);
                open.push(element);
            }
            Event::Empty(start) => {
                check_single_root(&open, &mut root_seen, &start)?;
                document.append_node(parent, element_kind(&start)?);
            }
            Event::End(_) => {
                if let Some(element) = open.pop() {
                    drop_layout_whitespace(&mut document, element);
                }
            }
            Event::Text(content) => {
                let value = content.unescape()?;
                if open.is_empty() {
                    if value.trim().is_empty() {
                        continue;
                    }
                    return Err(XmlError::TextOutsideRoot);
                }
                document.append_node(parent, NodeKind::Text(value.into_owned()));
            }
            Event::CData(content) => {
                let value = String::from_utf8_lossy(&content).into_owned();
                document.append_node(parent, NodeKind::CData(value));
            }
            Event::Comment(content) => {
                let value = String::from_utf8_lossy(&content).into_owned();
                document.append_node(parent, NodeKind::Comment(value));
            }
            Event::PI(content) => {
                let value = String::from_utf8_lossy(&content).into_owned();
                document.append_node(parent, NodeKind::ProcessingInstruction(value));
            }
            Event::Decl(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    if let Some(&unclosed) = open.last() {
        let name = document.name(unclosed).unwrap_or_default().to_string();
        return Err(XmlError::Unclosed(name));
    }

    if !root_seen {
        return Err(XmlError::MissingRoot);
    }

    Ok(document)
}

fn check_single_root(
    open: &[NodeId],
    root_seen: &mut bool,
    start: &BytesStart<'_>,
) -> Result<(), XmlError> {
    if !open.is_empty() {
        return Ok(());
    }
    if *root_seen {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        return Err(XmlError::MultipleRoots(name));
    }
    *root_seen = true;
    Ok(())
}

fn element_kind(start: &BytesStart<'_>) -> Result<NodeKind, XmlError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute?;
        attributes.push(Attribute {
            name: String::from_utf8_lossy(attribute.key.as_ref()).into_owned(),
            value: attribute_value(&attribute.value)?,
        });
    }

    Ok(NodeKind::Element { name, attributes })
}

/// Attribute-value normalization: literal line breaks and tabs become
/// spaces, while character references such as `&#xA;` keep their character.
fn attribute_value(raw: &[u8]) -> Result<String, XmlError> {
    let raw = String::from_utf8_lossy(raw);
    let normalized = raw.replace("\r\n", " ").replace(['\r', '\n', '\t'], " ");
    Ok(unescape(&normalized)?.into_owned())
}

/// Remove whitespace-only text from `element` unless it also holds
/// non-whitespace text, in which case all of its text is content.
fn drop_layout_whitespace(document: &mut Document, element: NodeId) {
    let children = document.children(element).to_vec();

    let has_text = children.iter().any(|&child| match document.kind(child) {
        NodeKind::Text(text) => !text.trim().is_empty(),
        NodeKind::CData(_) => true,
        _ => false,
    });
    if has_text {
        return;
    }

    for child in children {
        if matches!(document.kind(child), NodeKind::Text(_)) {
            document.remove(child);
        }
    }
}
