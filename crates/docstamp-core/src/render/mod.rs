//! Per-field drawing into a page overlay
//!
//! Each renderer appends operations to a [`PageCanvas`] for one page. A
//! failing field returns a [`FieldRenderError`] and leaves the canvas as it
//! was, so the compositor can skip it and carry on.

pub mod image;
pub mod radio;
pub mod text;

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use lopdf::content::Operation;
use lopdf::{dictionary, Document, Object, ObjectId};
use shared_pdf::{DocumentBox, StandardFont};
use shared_types::{Field, FieldKind};

use crate::error::FieldRenderError;

/// Inset between the field border and its content, matching the editor's own padding
pub const FIELD_PADDING: f64 = 6.0;
/// Largest font size used for text
pub const DEFAULT_FONT_SIZE: f64 = 10.0;
/// Text never exceeds this share of the box height
pub const FONT_HEIGHT_RATIO: f64 = 0.6;
/// Shrink-to-fit stops here, even if the text still overflows
pub const MIN_FONT_SIZE: f64 = 6.0;
pub const FONT_SIZE_STEP: f64 = 0.5;
/// Outer radio radius as a share of the box height
pub const RADIO_RADIUS_RATIO: f64 = 0.3;
pub const RADIO_MIN_RADIUS: f64 = 6.0;
pub const RADIO_MAX_RADIUS: f64 = 12.0;
/// Selected dot radius as a share of the outer radius
pub const RADIO_FILL_RATIO: f64 = 0.55;
/// Space between the radio circle and its label
pub const RADIO_LABEL_GAP: f64 = 4.0;

/// Resource name prefixes for what the compositor adds to a page
const FONT_PREFIX: &str = "DsF";
const XOBJECT_PREFIX: &str = "DsIm";

/// Content-stream number operand
pub(crate) fn real(value: f64) -> Object {
    Object::Real(value as _)
}

/// The one font object shared by every text-bearing field of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontHandle {
    pub object_id: ObjectId,
    pub font: StandardFont,
}

impl FontHandle {
    /// Add a non-embedded standard font dictionary to the document
    pub fn create(doc: &mut Document, font: StandardFont) -> Self {
        let object_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font_name(),
            "Encoding" => font.encoding_name(),
        });
        Self { object_id, font }
    }
}

/// Overlay operations and resources collected for one page
#[derive(Debug)]
pub struct PageCanvas {
    page_id: ObjectId,
    operations: Vec<Operation>,
    /// Names already present in the page's resources
    reserved: BTreeSet<String>,
    fonts: BTreeMap<String, ObjectId>,
    xobjects: BTreeMap<String, ObjectId>,
}

impl PageCanvas {
    pub fn new<I, S>(page_id: ObjectId, reserved: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            page_id,
            operations: Vec::new(),
            reserved: reserved.into_iter().map(Into::into).collect(),
            fonts: BTreeMap::new(),
            xobjects: BTreeMap::new(),
        }
    }

    pub fn page_id(&self) -> ObjectId {
        self.page_id
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Fonts to merge into the page's `/Font` resources
    pub fn fonts(&self) -> &BTreeMap<String, ObjectId> {
        &self.fonts
    }

    /// Images to merge into the page's `/XObject` resources
    pub fn xobjects(&self) -> &BTreeMap<String, ObjectId> {
        &self.xobjects
    }

    /// Take the collected operations, leaving the resources in place
    pub fn take_operations(&mut self) -> Vec<Operation> {
        std::mem::take(&mut self.operations)
    }

    /// Resource name for `font` on this page, registering it on first use
    pub(crate) fn font_name(&mut self, font: &FontHandle) -> String {
        if let Some((name, _)) = self.fonts.iter().find(|(_, id)| **id == font.object_id) {
            return name.clone();
        }
        let name = self.allocate(FONT_PREFIX);
        self.fonts.insert(name.clone(), font.object_id);
        name
    }

    pub(crate) fn add_xobject(&mut self, object_id: ObjectId) -> String {
        let name = self.allocate(XOBJECT_PREFIX);
        self.xobjects.insert(name.clone(), object_id);
        name
    }

    pub(crate) fn extend(&mut self, operations: Vec<Operation>) {
        self.operations.extend(operations);
    }

    fn allocate(&self, prefix: &str) -> String {
        (1..)
            .map(|n| format!("{}{}", prefix, n))
            .find(|name| {
                !self.reserved.contains(name)
                    && !self.fonts.contains_key(name)
                    && !self.xobjects.contains_key(name)
            })
            .unwrap_or_else(|| prefix.to_string())
    }
}

/// Text drawn for a date field: the given value, or `today` when blank
pub fn resolve_date(text: &str, today: NaiveDate) -> String {
    if text.trim().is_empty() {
        today.format("%Y-%m-%d").to_string()
    } else {
        text.to_string()
    }
}

/// Draw one field into `canvas`.
///
/// `font` must be present for any field whose kind reports
/// [`FieldKind::uses_font`].
pub fn render_field(
    doc: &mut Document,
    canvas: &mut PageCanvas,
    bx: DocumentBox,
    field: &Field,
    font: Option<&FontHandle>,
    today: NaiveDate,
) -> Result<(), FieldRenderError> {
    if !field.rect.is_well_formed() {
        return Err(FieldRenderError::MalformedRect);
    }

    match &field.kind {
        FieldKind::Signature { data } | FieldKind::Image { data } => {
            image::draw_image(doc, canvas, bx, data)
        }
        FieldKind::Text { text } => text::draw_text(canvas, bx, text, font),
        FieldKind::Date { text } => text::draw_text(canvas, bx, &resolve_date(text, today), font),
        FieldKind::Radio { label, selected } => {
            radio::draw_radio(canvas, bx, label.as_deref(), *selected, font)
        }
        FieldKind::Unsupported { type_name } => {
            Err(FieldRenderError::Unsupported(type_name.clone()))
        }
    }
}
