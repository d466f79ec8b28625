//! Small event-writer wrapper used by every package part.

use std::borrow::Cow;
use std::fmt::Display;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use audex_model::AdapterError;

pub(crate) const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
pub(crate) const REL_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub(crate) const PACKAGE_REL_NS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships";
pub(crate) const CONTENT_TYPES_NS: &str =
    "http://schemas.openxmlformats.org/package/2006/content-types";

pub(crate) struct XmlPart {
    writer: Writer<Vec<u8>>,
}

fn xml_error(err: impl Display) -> AdapterError {
    AdapterError::encoding(format!("xml: {err}"))
}

impl XmlPart {
    pub(crate) fn new() -> Result<Self, AdapterError> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(xml_error)?;
        Ok(Self { writer })
    }

    pub(crate) fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), AdapterError> {
        let element = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.writer
            .write_event(Event::Start(element))
            .map_err(xml_error)
    }

    pub(crate) fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), AdapterError> {
        let element = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.writer
            .write_event(Event::Empty(element))
            .map_err(xml_error)
    }

    pub(crate) fn end(&mut self, name: &str) -> Result<(), AdapterError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_error)
    }

    pub(crate) fn text(&mut self, text: &str) -> Result<(), AdapterError> {
        let clean = xml_safe(text);
        self.writer
            .write_event(Event::Text(BytesText::new(&clean)))
            .map_err(xml_error)
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

/// Drop characters XML 1.0 cannot carry (C0 controls other than tab, LF
/// and CR, plus the U+FFFE/U+FFFF non-characters).
pub(crate) fn xml_safe(text: &str) -> Cow<'_, str> {
    let allowed = |ch: char| {
        matches!(ch, '\t' | '\n' | '\r') || (ch >= ' ' && ch != '\u{FFFE}' && ch != '\u{FFFF}')
    };
    if text.chars().all(allowed) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|&ch| allowed(ch)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_escaped() {
        let mut part = XmlPart::new().unwrap();
        part.start("t", &[("a", "x\"y")]).unwrap();
        part.text("<b> & c").unwrap();
        part.end("t").unwrap();
        let xml = String::from_utf8(part.finish()).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
        assert!(xml.ends_with("<t a=\"x&quot;y\">&lt;b&gt; &amp; c</t>"));
    }

    #[test]
    fn control_characters_are_stripped() {
        assert_eq!(xml_safe("a\u{0}b\u{1F}c\td"), "abc\td");
        assert!(matches!(xml_safe("plain"), Cow::Borrowed(_)));
    }
}
