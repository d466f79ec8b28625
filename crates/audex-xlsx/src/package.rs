//! Package-level parts: content types, relationships and the workbook manifest.

use audex_model::AdapterError;

use crate::xml::{CONTENT_TYPES_NS, MAIN_NS, PACKAGE_REL_NS, REL_NS, XmlPart};

pub(crate) const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";
pub(crate) const ROOT_RELS_PATH: &str = "_rels/.rels";
pub(crate) const WORKBOOK_PATH: &str = "xl/workbook.xml";
pub(crate) const WORKBOOK_RELS_PATH: &str = "xl/_rels/workbook.xml.rels";

const WORKBOOK_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const WORKSHEET_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
const RELS_CONTENT_TYPE: &str = "application/vnd.openxmlformats-package.relationships+xml";
const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const WORKSHEET_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";

/// Archive path of the 1-based worksheet `n`.
pub(crate) fn worksheet_path(n: usize) -> String {
    format!("xl/worksheets/sheet{n}.xml")
}

pub(crate) fn content_types(sheet_count: usize) -> Result<Vec<u8>, AdapterError> {
    let mut xml = XmlPart::new()?;
    xml.start("Types", &[("xmlns", CONTENT_TYPES_NS)])?;
    xml.empty("Default", &[("Extension", "rels"), ("ContentType", RELS_CONTENT_TYPE)])?;
    xml.empty("Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;
    xml.empty(
        "Override",
        &[("PartName", "/xl/workbook.xml"), ("ContentType", WORKBOOK_CONTENT_TYPE)],
    )?;
    for n in 1..=sheet_count {
        let part = format!("/{}", worksheet_path(n));
        xml.empty(
            "Override",
            &[("PartName", part.as_str()), ("ContentType", WORKSHEET_CONTENT_TYPE)],
        )?;
    }
    xml.end("Types")?;
    Ok(xml.finish())
}

pub(crate) fn root_rels() -> Result<Vec<u8>, AdapterError> {
    let mut xml = XmlPart::new()?;
    xml.start("Relationships", &[("xmlns", PACKAGE_REL_NS)])?;
    xml.empty(
        "Relationship",
        &[("Id", "rId1"), ("Type", OFFICE_DOCUMENT_REL), ("Target", WORKBOOK_PATH)],
    )?;
    xml.end("Relationships")?;
    Ok(xml.finish())
}

pub(crate) fn workbook(sheet_names: &[String]) -> Result<Vec<u8>, AdapterError> {
    let mut xml = XmlPart::new()?;
    xml.start("workbook", &[("xmlns", MAIN_NS), ("xmlns:r", REL_NS)])?;
    xml.start("sheets", &[])?;
    for (idx, name) in sheet_names.iter().enumerate() {
        let id = (idx + 1).to_string();
        let rel = format!("rId{id}");
        xml.empty(
            "sheet",
            &[("name", name.as_str()), ("sheetId", id.as_str()), ("r:id", rel.as_str())],
        )?;
    }
    xml.end("sheets")?;
    xml.end("workbook")?;
    Ok(xml.finish())
}

pub(crate) fn workbook_rels(sheet_count: usize) -> Result<Vec<u8>, AdapterError> {
    let mut xml = XmlPart::new()?;
    xml.start("Relationships", &[("xmlns", PACKAGE_REL_NS)])?;
    for n in 1..=sheet_count {
        let id = format!("rId{n}");
        let target = format!("worksheets/sheet{n}.xml");
        xml.empty(
            "Relationship",
            &[("Id", id.as_str()), ("Type", WORKSHEET_REL), ("Target", target.as_str())],
        )?;
    }
    xml.end("Relationships")?;
    Ok(xml.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workbook_lists_sheets_in_order() {
        let names = vec!["Data".to_string(), "A & B".to_string()];
        let xml = String::from_utf8(workbook(&names).unwrap()).unwrap();
        assert!(xml.contains(r#"<sheet name="Data" sheetId="1" r:id="rId1"/>"#));
        assert!(xml.contains(r#"<sheet name="A &amp; B" sheetId="2" r:id="rId2"/>"#));
    }

    #[test]
    fn content_types_override_each_sheet() {
        let xml = String::from_utf8(content_types(3).unwrap()).unwrap();
        assert_eq!(xml.matches(WORKSHEET_CONTENT_TYPE).count(), 3);
        assert!(xml.contains("/xl/worksheets/sheet3.xml"));
    }
}
