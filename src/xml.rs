//! XML writing helpers
//!
//! Thin wrappers over `quick_xml::Writer` used by the envelope writer and the
//! metadata serializers. Text and attribute values are always escaped;
//! `raw` is the only way to splice pre-serialized markup.

use crate::error::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// Writer over an in-memory buffer
pub type XmlWriter = Writer<Vec<u8>>;

/// Create an indenting writer
pub fn new_writer() -> XmlWriter {
    Writer::new_with_indent(Vec::new(), b' ', 2)
}

/// Write the `<?xml ...?>` declaration
pub fn declaration(writer: &mut XmlWriter) -> Result<()> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    Ok(())
}

/// Open an element
pub fn start(writer: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
    let elem = BytesStart::new(name).with_attributes(attrs.iter().copied());
    writer.write_event(Event::Start(elem))?;
    Ok(())
}

/// Close an element
pub fn end(writer: &mut XmlWriter, name: &str) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Write `<name attrs>text</name>`
pub fn text_element_with_attrs(
    writer: &mut XmlWriter,
    name: &str,
    attrs: &[(&str, &str)],
    text: &str,
) -> Result<()> {
    start(writer, name, attrs)?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    end(writer, name)
}

/// Write `<name>text</name>`
pub fn text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    text_element_with_attrs(writer, name, &[], text)
}

/// Splice already-serialized markup, dropping any XML declaration
pub fn raw(writer: &mut XmlWriter, markup: &str) -> Result<()> {
    let body = strip_declaration(markup).trim();
    if !body.is_empty() {
        writer.write_event(Event::Text(BytesText::from_escaped(body)))?;
    }
    Ok(())
}

/// Consume the writer and return the document
pub fn finish(writer: XmlWriter) -> Result<String> {
    String::from_utf8(writer.into_inner())
        .map_err(|e| crate::error::Error::render(format!("Invalid UTF-8 in XML output: {e}")))
}

/// Remove a leading `<?xml ...?>` declaration
pub fn strip_declaration(markup: &str) -> &str {
    let trimmed = markup.trim_start();
    if trimmed.starts_with("<?xml") {
        if let Some(end) = trimmed.find("?>") {
            return &trimmed[end + 2..];
        }
    }
    trimmed
}
