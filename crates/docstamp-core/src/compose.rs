//! Burn a list of fields into a source document

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use lopdf::{content::Content, Dictionary, Object, ObjectId, Stream};
use serde::Serialize;
use shared_pdf::{PdfDocument, StandardFont};
use shared_types::Field;

use crate::error::{ComposeError, FieldRenderError};
use crate::render::{render_field, FontHandle, PageCanvas};

/// A field that was left out of the output, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedField {
    pub id: String,
    pub reason: String,
}

/// Result of one composition
#[derive(Debug, Clone)]
pub struct Composition {
    pub bytes: Vec<u8>,
    /// Number of fields drawn
    pub rendered: usize,
    pub skipped: Vec<SkippedField>,
}

/// Stateless apart from configuration; one value can serve concurrent jobs.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    font: StandardFont,
    /// Fixed "today" for blank date fields, otherwise the current UTC date
    today: Option<NaiveDate>,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Draw `fields` in order onto a copy of `source_bytes`.
    ///
    /// Only an unreadable source or a failed write is an error. Fields that
    /// cannot be drawn are reported in [`Composition::skipped`].
    pub fn compose(
        &self,
        source_bytes: &[u8],
        fields: &[Field],
    ) -> Result<Composition, ComposeError> {
        let mut pdf = PdfDocument::from_bytes(source_bytes)
            .map_err(|e| ComposeError::DocumentParse(e.to_string()))?;

        let today = self.today();
        let mut font: Option<FontHandle> = None;
        let mut canvases: BTreeMap<usize, PageCanvas> = BTreeMap::new();
        let mut skipped = Vec::new();
        let mut rendered = 0;

        for field in fields {
            match self.place_field(&mut pdf, &mut canvases, &mut font, field, today) {
                Ok(()) => rendered += 1,
                Err(err) => {
                    tracing::warn!(
                        field_id = %field.id,
                        field_type = field.type_name(),
                        page_index = field.rect.page_index,
                        error = %err,
                        "Skipping field"
                    );
                    skipped.push(SkippedField {
                        id: field.id.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        for canvas in canvases.into_values() {
            flush_page(&mut pdf, canvas)?;
        }

        let bytes = pdf
            .save_to_bytes()
            .map_err(|e| ComposeError::Serialize(e.to_string()))?;

        tracing::info!(
            pages = pdf.page_count(),
            rendered,
            skipped = skipped.len(),
            "Composed document"
        );

        Ok(Composition {
            bytes,
            rendered,
            skipped,
        })
    }

    fn place_field(
        &self,
        pdf: &mut PdfDocument,
        canvases: &mut BTreeMap<usize, PageCanvas>,
        font: &mut Option<FontHandle>,
        field: &Field,
        today: NaiveDate,
    ) -> Result<(), FieldRenderError> {
        let page_count = pdf.page_count();
        let out_of_range = || FieldRenderError::PageOutOfRange {
            page_index: field.rect.page_index,
            page_count,
        };

        let index = field.rect.page_in(page_count).ok_or_else(out_of_range)?;
        let (page_id, page_size) = pdf
            .page_id(index)
            .zip(pdf.page_size(index))
            .ok_or_else(out_of_range)?;

        if !field.rect.is_well_formed() {
            return Err(FieldRenderError::MalformedRect);
        }

        if font.is_none() && field.kind.uses_font() {
            *font = Some(FontHandle::create(pdf.doc_mut(), self.font));
        }

        let canvas = canvases
            .entry(index)
            .or_insert_with(|| PageCanvas::new(page_id, resource_names(pdf, page_id)));

        let bx = page_size.place(&field.rect);
        render_field(pdf.doc_mut(), canvas, bx, field, font.as_ref(), today)
    }
}

/// The page's resources, following `/Parent` when the page has none of its own
fn effective_resources(pdf: &PdfDocument, page_id: ObjectId) -> Dictionary {
    pdf.inherited_attribute(page_id, b"Resources")
        .and_then(|obj| pdf.resolve(obj).ok())
        .and_then(|obj| obj.as_dict().ok())
        .cloned()
        .unwrap_or_else(Dictionary::new)
}

/// A resource subdictionary such as `/Font`, resolved and cloned
fn resource_category(pdf: &PdfDocument, resources: &Dictionary, key: &[u8]) -> Dictionary {
    resources
        .get(key)
        .ok()
        .and_then(|obj| pdf.resolve(obj).ok())
        .and_then(|obj| obj.as_dict().ok())
        .cloned()
        .unwrap_or_else(Dictionary::new)
}

/// Font and XObject names already used by a page
fn resource_names(pdf: &PdfDocument, page_id: ObjectId) -> Vec<String> {
    let resources = effective_resources(pdf, page_id);
    [b"Font".as_slice(), b"XObject".as_slice()]
        .into_iter()
        .flat_map(|key| {
            resource_category(pdf, &resources, key)
                .iter()
                .map(|(name, _)| String::from_utf8_lossy(name).into_owned())
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Content stream references of a page, in drawing order
fn content_refs(pdf: &PdfDocument, page: &Dictionary) -> Result<Vec<Object>, ComposeError> {
    let contents = match page.get(b"Contents") {
        Ok(contents) => contents,
        Err(_) => return Ok(Vec::new()),
    };

    match contents {
        Object::Reference(id) => match pdf.doc().get_object(*id) {
            // An indirect array of streams
            Ok(Object::Array(streams)) => Ok(streams.clone()),
            Ok(_) => Ok(vec![Object::Reference(*id)]),
            Err(e) => Err(ComposeError::PageUpdate(format!(
                "Failed to resolve page contents: {}",
                e
            ))),
        },
        Object::Array(streams) => Ok(streams.clone()),
        _ => Err(ComposeError::PageUpdate(
            "Page contents are neither a stream reference nor an array".to_string(),
        )),
    }
}

/// Append the overlay to a page: the original content is isolated in
/// `q ... Q` so its graphics state cannot leak into the fields
fn flush_page(pdf: &mut PdfDocument, mut canvas: PageCanvas) -> Result<(), ComposeError> {
    if canvas.is_empty() {
        return Ok(());
    }
    let page_id = canvas.page_id();

    let overlay = Content {
        operations: canvas.take_operations(),
    }
    .encode()
    .map_err(|e| ComposeError::PageUpdate(format!("Failed to encode overlay: {}", e)))?;

    let page = pdf
        .page_dict(page_id)
        .map_err(|e| ComposeError::PageUpdate(e.to_string()))?;
    let original = content_refs(pdf, page)?;

    let mut resources = effective_resources(pdf, page_id);
    let mut fonts = resource_category(pdf, &resources, b"Font");
    let mut xobjects = resource_category(pdf, &resources, b"XObject");
    for (name, id) in canvas.fonts() {
        fonts.set(name.as_bytes().to_vec(), Object::Reference(*id));
    }
    for (name, id) in canvas.xobjects() {
        xobjects.set(name.as_bytes().to_vec(), Object::Reference(*id));
    }
    if !fonts.is_empty() {
        resources.set("Font", Object::Dictionary(fonts));
    }
    if !xobjects.is_empty() {
        resources.set("XObject", Object::Dictionary(xobjects));
    }

    let doc = pdf.doc_mut();
    let mut contents = Vec::with_capacity(original.len() + 3);
    if !original.is_empty() {
        let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let restore_id = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
        contents.push(Object::Reference(save_id));
        contents.extend(original);
        contents.push(Object::Reference(restore_id));
    }
    let overlay_id = doc.add_object(Stream::new(Dictionary::new(), overlay));
    contents.push(Object::Reference(overlay_id));

    let page = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| ComposeError::PageUpdate(e.to_string()))?;
    page.set("Contents", Object::Array(contents));
    page.set("Resources", Object::Dictionary(resources));

    Ok(())
}
