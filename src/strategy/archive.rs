//! Cached page count from DOCX extended properties.
//!
//! Word, LibreOffice and most other writers store the page count of their
//! last layout pass in `docProps/app.xml`:
//!
//! ```xml
//! <Properties xmlns="…/extended-properties">
//!   <Pages>3</Pages>
//! </Properties>
//! ```
//!
//! It is the fastest cross-platform signal and, as long as nobody edited the
//! file with a tool that forgets to update it, an exact one.

use super::docx::{open_archive, read_part};
use super::{PageCountStrategy, StrategyKind, StrategyOutcome};
use crate::document::DocumentRef;
use crate::error::StrategyError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Read, Seek};
use tracing::debug;
use zip::ZipArchive;

/// Archive path of the extended-properties part.
pub const APP_PROPERTIES_PART: &str = "docProps/app.xml";

/// Reads `<Pages>` from `docProps/app.xml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveMetadataExtractor;

impl ArchiveMetadataExtractor {
    /// The cached page count, or `None` when the part or field is absent,
    /// unreadable or not an integer. A stored `0` comes back as `Some(0)`.
    pub fn read_pages<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Option<u32> {
        let xml = match read_part(archive, APP_PROPERTIES_PART) {
            Ok(Some(xml)) => xml,
            Ok(None) => {
                debug!("{} absent", APP_PROPERTIES_PART);
                return None;
            }
            Err(e) => {
                debug!("{} unreadable: {}", APP_PROPERTIES_PART, e);
                return None;
            }
        };

        match pages_from_app_properties(&xml) {
            Ok(pages) => pages,
            Err(e) => {
                debug!("{} malformed: {}", APP_PROPERTIES_PART, e);
                None
            }
        }
    }
}

impl PageCountStrategy for ArchiveMetadataExtractor {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ArchiveMetadata
    }

    fn attempt(&self, doc: &DocumentRef) -> StrategyOutcome {
        let mut archive = open_archive(doc.path())?;
        match self.read_pages(&mut archive) {
            Some(0) => Err(StrategyError::NonPositive { count: 0 }),
            Some(pages) => Ok(pages),
            None => Err(StrategyError::MissingEntry {
                name: format!("{APP_PROPERTIES_PART} <Pages>"),
            }),
        }
    }
}

/// Find the first `<Pages>` element whose text is an unsigned integer.
///
/// Element names are matched without their namespace prefix. Zero is returned
/// as is; rejecting it is the caller's decision.
pub fn pages_from_app_properties(xml: &str) -> Result<Option<u32>, StrategyError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut in_pages = false;
    let mut text = String::new();

    loop {
        match reader.read_event().map_err(|e| xml_error(&e))? {
            Event::Start(e) if e.local_name().as_ref() == b"Pages" => {
                in_pages = true;
                text.clear();
            }
            Event::Text(t) if in_pages => {
                text.push_str(&t.unescape().map_err(|e| xml_error(&e))?);
            }
            Event::End(e) if e.local_name().as_ref() == b"Pages" => {
                in_pages = false;
                match text.trim().parse::<u32>() {
                    Ok(n) => return Ok(Some(n)),
                    _ => debug!("ignoring unusable <Pages> value {:?}", text.trim()),
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

fn xml_error(e: &quick_xml::Error) -> StrategyError {
    StrategyError::Xml {
        part: APP_PROPERTIES_PART.to_string(),
        detail: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::docx::tests::{app_xml, archive_with};

    #[test]
    fn reads_pages_field() {
        assert_eq!(pages_from_app_properties(&app_xml("3")).unwrap(), Some(3));
        assert_eq!(pages_from_app_properties(&app_xml(" 12 ")).unwrap(), Some(12));
    }

    #[test]
    fn prefixed_element_is_recognised() {
        let xml = r#"<ep:Properties xmlns:ep="x"><ep:Pages>5</ep:Pages></ep:Properties>"#;
        assert_eq!(pages_from_app_properties(xml).unwrap(), Some(5));
    }

    #[test]
    fn absent_field_is_none() {
        let xml = r#"<Properties><Words>100</Words><Characters>600</Characters></Properties>"#;
        assert_eq!(pages_from_app_properties(xml).unwrap(), None);
    }

    #[test]
    fn unusable_values_are_none() {
        assert_eq!(pages_from_app_properties(&app_xml("")).unwrap(), None);
        assert_eq!(pages_from_app_properties(&app_xml("two")).unwrap(), None);
        assert_eq!(pages_from_app_properties(&app_xml("-4")).unwrap(), None);
    }

    #[test]
    fn zero_is_reported_not_skipped() {
        assert_eq!(pages_from_app_properties(&app_xml("0")).unwrap(), Some(0));
        assert_eq!(pages_from_app_properties(&app_xml(" 0 ")).unwrap(), Some(0));
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let err = pages_from_app_properties("<Properties><Pages>3</Words></Properties>").unwrap_err();
        assert!(matches!(err, StrategyError::Xml { .. }), "got: {err}");
    }

    #[test]
    fn extractor_reads_from_archive() {
        let mut archive = archive_with(&[(APP_PROPERTIES_PART, &app_xml("7"))]);
        assert_eq!(ArchiveMetadataExtractor.read_pages(&mut archive), Some(7));
    }

    #[test]
    fn standalone_attempt_reads_file() {
        let bytes = archive_with(&[(APP_PROPERTIES_PART, &app_xml("2"))])
            .into_inner()
            .into_inner();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cv.docx");
        std::fs::write(&path, bytes).unwrap();
        let doc = DocumentRef::open(&path).unwrap();

        assert_eq!(ArchiveMetadataExtractor.attempt(&doc), Ok(2));
        assert!(matches!(
            crate::strategy::ContentStructuralEstimator.attempt(&doc),
            Err(StrategyError::MissingEntry { .. })
        ));
    }

    #[test]
    fn standalone_attempt_rejects_zero() {
        let bytes = archive_with(&[(APP_PROPERTIES_PART, &app_xml("0"))])
            .into_inner()
            .into_inner();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cv.docx");
        std::fs::write(&path, bytes).unwrap();
        let doc = DocumentRef::open(&path).unwrap();

        assert_eq!(
            ArchiveMetadataExtractor.attempt(&doc),
            Err(StrategyError::NonPositive { count: 0 })
        );
    }

    #[test]
    fn extractor_tolerates_missing_and_broken_parts() {
        let mut empty = archive_with(&[("word/document.xml", "<w:document/>")]);
        assert_eq!(ArchiveMetadataExtractor.read_pages(&mut empty), None);

        let mut broken = archive_with(&[(APP_PROPERTIES_PART, "<Properties><Pages>")]);
        assert_eq!(ArchiveMetadataExtractor.read_pages(&mut broken), None);
    }
}
