//! PDF loading and page geometry using lopdf

use lopdf::{Dictionary, Document, Object, ObjectId};
use thiserror::Error;

use crate::coords::PageSize;

/// Inheritance chains deeper than this are treated as cyclic
const MAX_PARENT_DEPTH: usize = 32;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("Page {0} not found")]
    PageNotFound(usize),

    #[error("Malformed page object: {0}")]
    MalformedPage(String),

    #[error("Failed to save PDF: {0}")]
    Save(String),
}

/// Wrapper around lopdf::Document with page sizes resolved once at load time
pub struct PdfDocument {
    doc: Document,
    /// Page object ids in page order
    page_ids: Vec<ObjectId>,
    page_sizes: Vec<PageSize>,
}

impl PdfDocument {
    /// Load a PDF from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PdfError> {
        let doc = Document::load_mem(bytes).map_err(|e| PdfError::Parse(e.to_string()))?;
        Self::from_document(doc)
    }

    /// Wrap an already-loaded document
    pub fn from_document(doc: Document) -> Result<Self, PdfError> {
        // get_pages is keyed by 1-indexed page number, so values come out in page order
        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

        let mut pdf = Self {
            doc,
            page_ids,
            page_sizes: Vec::new(),
        };
        pdf.page_sizes = pdf
            .page_ids
            .iter()
            .map(|id| pdf.resolve_page_size(*id))
            .collect::<Result<_, _>>()?;

        tracing::debug!(pages = pdf.page_ids.len(), "Loaded PDF");
        Ok(pdf)
    }

    /// Get the number of pages
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Object id of the page at a zero-based index
    pub fn page_id(&self, index: usize) -> Option<ObjectId> {
        self.page_ids.get(index).copied()
    }

    /// Cached size of the page at a zero-based index
    pub fn page_size(&self, index: usize) -> Option<PageSize> {
        self.page_sizes.get(index).copied()
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    /// Get mutable access to the internal document
    pub fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Save the document to bytes
    pub fn save_to_bytes(&mut self) -> Result<Vec<u8>, PdfError> {
        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| PdfError::Save(e.to_string()))?;
        Ok(buffer)
    }

    /// Follow `/Parent` links from a page until `key` is found.
    ///
    /// Returns the value as stored, which may itself be a reference.
    pub fn inherited_attribute(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut current = self.doc.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_PARENT_DEPTH {
            if let Ok(value) = current.get(key) {
                return Some(value);
            }
            let parent_id = current.get(b"Parent").and_then(Object::as_reference).ok()?;
            current = self.doc.get_dictionary(parent_id).ok()?;
        }
        None
    }

    /// Dereference `obj` if it is a reference
    pub fn resolve<'a>(&'a self, obj: &'a Object) -> Result<&'a Object, PdfError> {
        match obj {
            Object::Reference(id) => self
                .doc
                .get_object(*id)
                .map_err(|e| PdfError::MalformedPage(format!("Failed to resolve reference: {}", e))),
            other => Ok(other),
        }
    }

    /// Page dictionary for a page object id
    pub fn page_dict(&self, page_id: ObjectId) -> Result<&Dictionary, PdfError> {
        self.doc
            .get_dictionary(page_id)
            .map_err(|_| PdfError::MalformedPage("Page is not a dictionary".to_string()))
    }

    fn resolve_page_size(&self, page_id: ObjectId) -> Result<PageSize, PdfError> {
        match self.inherited_attribute(page_id, b"MediaBox") {
            Some(media_box) => Ok(PageSize::from_media_box(self.parse_rect(media_box)?)),
            // Default to US Letter size
            None => Ok(PageSize::letter()),
        }
    }

    /// Parse a PDF rectangle array into [x, y, width, height]
    fn parse_rect(&self, obj: &Object) -> Result<[f64; 4], PdfError> {
        let arr = self
            .resolve(obj)?
            .as_array()
            .map_err(|_| PdfError::MalformedPage("MediaBox is not an array".to_string()))?;

        if arr.len() != 4 {
            return Err(PdfError::MalformedPage(format!(
                "MediaBox has {} elements, expected 4",
                arr.len()
            )));
        }

        let mut values = [0.0f64; 4];
        for (i, obj) in arr.iter().enumerate() {
            values[i] = self.extract_number(obj)?;
        }

        // Corners may be given in either order
        let (x1, x2) = (values[0].min(values[2]), values[0].max(values[2]));
        let (y1, y2) = (values[1].min(values[3]), values[1].max(values[3]));
        Ok([x1, y1, x2 - x1, y2 - y1])
    }

    /// Extract a number from a PDF object
    fn extract_number(&self, obj: &Object) -> Result<f64, PdfError> {
        match self.resolve(obj)? {
            Object::Integer(i) => Ok(*i as f64),
            Object::Real(r) => Ok(*r as f64),
            _ => Err(PdfError::MalformedPage(
                "Expected number in rectangle".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;
    use pretty_assertions::assert_eq;

    /// Build a document whose pages have the given MediaBoxes (`None` inherits
    /// from the page tree root, which is US Legal)
    fn create_test_pdf(media_boxes: &[Option<[i64; 4]>]) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let kids: Vec<Object> = media_boxes
            .iter()
            .map(|media_box| {
                let mut page = dictionary! {
                    "Type" => "Page",
                    "Parent" => Object::Reference(pages_id),
                };
                if let Some(b) = media_box {
                    page.set(
                        "MediaBox",
                        vec![b[0].into(), b[1].into(), b[2].into(), b[3].into()],
                    );
                }
                Object::Reference(doc.add_object(page))
            })
            .collect();

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => kids.len() as i64,
                "Kids" => kids,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 1008.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_page_sizes_are_cached_per_page() {
        let bytes = create_test_pdf(&[
            Some([0, 0, 612, 792]),
            Some([0, 0, 842, 595]),
            None,
        ]);
        let pdf = PdfDocument::from_bytes(&bytes).unwrap();

        assert_eq!(pdf.page_count(), 3);
        assert_eq!(pdf.page_size(0), Some(PageSize::letter()));
        assert_eq!(
            pdf.page_size(1),
            Some(PageSize::from_media_box([0.0, 0.0, 842.0, 595.0]))
        );
        // Inherited from the Pages node
        assert_eq!(
            pdf.page_size(2),
            Some(PageSize::from_media_box([0.0, 0.0, 612.0, 1008.0]))
        );
        assert_eq!(pdf.page_size(3), None);
        assert!(pdf.page_id(2).is_some());
        assert!(pdf.page_id(3).is_none());
    }

    #[test]
    fn test_offset_and_inverted_media_box() {
        let bytes = create_test_pdf(&[Some([10, 20, 610, 820]), Some([612, 792, 0, 0])]);
        let pdf = PdfDocument::from_bytes(&bytes).unwrap();

        assert_eq!(
            pdf.page_size(0),
            Some(PageSize::from_media_box([10.0, 20.0, 600.0, 800.0]))
        );
        assert_eq!(pdf.page_size(1), Some(PageSize::letter()));
    }

    #[test]
    fn test_from_bytes_html_fails() {
        let html_bytes = b"<!DOCTYPE html><html><head></head><body>Not a PDF</body></html>";
        let result = PdfDocument::from_bytes(html_bytes);
        assert!(matches!(result, Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_from_bytes_empty_fails() {
        assert!(PdfDocument::from_bytes(&[]).is_err(), "Empty bytes should fail");
    }

    #[test]
    fn test_from_bytes_garbage_fails() {
        let garbage = vec![0u8; 100];
        assert!(PdfDocument::from_bytes(&garbage).is_err(), "Garbage bytes should fail");
    }

    #[test]
    fn test_save_round_trip_keeps_pages() {
        let bytes = create_test_pdf(&[Some([0, 0, 612, 792]), None]);
        let mut pdf = PdfDocument::from_bytes(&bytes).unwrap();
        let saved = pdf.save_to_bytes().unwrap();

        let reloaded = PdfDocument::from_bytes(&saved).unwrap();
        assert_eq!(reloaded.page_count(), 2);
        assert_eq!(reloaded.page_size(1), pdf.page_size(1));
    }

    #[test]
    fn test_extract_number() {
        let pdf = PdfDocument::from_document(Document::new()).unwrap();
        assert_eq!(pdf.page_count(), 0);

        assert_eq!(pdf.extract_number(&Object::Integer(42)).unwrap(), 42.0);
        assert!((pdf.extract_number(&Object::Real(1.25)).unwrap() - 1.25).abs() < 0.001);
        assert!(pdf.extract_number(&Object::Null).is_err());
    }

    #[test]
    fn test_parse_rect_rejects_short_array() {
        let pdf = PdfDocument::from_document(Document::new()).unwrap();
        let arr = Object::Array(vec![Object::Integer(0), Object::Integer(0)]);
        assert!(matches!(pdf.parse_rect(&arr), Err(PdfError::MalformedPage(_))));
    }
}
