//! Field placement model shared by the editor API and the compositor

use serde::{Deserialize, Serialize};

/// Page-relative rectangle with a top-left origin.
///
/// Fractions are nominally in `[0, 1]` with `left + width <= 1` and
/// `top + height <= 1`. Nothing here clamps: the editor keeps rectangles on
/// the page before submitting them, and minor excess is tolerated downstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRect {
    /// Zero-based page index. Signed so that bad input can be skipped, not rejected.
    pub page_index: i64,
    #[serde(alias = "leftPct")]
    pub left_frac: f64,
    #[serde(alias = "topPct")]
    pub top_frac: f64,
    #[serde(alias = "widthPct")]
    pub width_frac: f64,
    #[serde(alias = "heightPct")]
    pub height_frac: f64,
}

impl NormalizedRect {
    pub fn new(
        page_index: i64,
        left_frac: f64,
        top_frac: f64,
        width_frac: f64,
        height_frac: f64,
    ) -> Self {
        Self {
            page_index,
            left_frac,
            top_frac,
            width_frac,
            height_frac,
        }
    }

    /// Rectangle covering the whole page
    pub fn full_page(page_index: i64) -> Self {
        Self::new(page_index, 0.0, 0.0, 1.0, 1.0)
    }

    /// Build a rectangle from pixel measurements taken on a page rendered at
    /// `rendered = (width, height)` CSS pixels.
    ///
    /// The result does not depend on the render scale or device pixel ratio,
    /// as long as all measurements share the same unit.
    pub fn from_pixels(
        page_index: i64,
        left: f64,
        top: f64,
        width: f64,
        height: f64,
        rendered: (f64, f64),
    ) -> Self {
        let (rendered_width, rendered_height) = rendered;
        Self::new(
            page_index,
            left / rendered_width,
            top / rendered_height,
            width / rendered_width,
            height / rendered_height,
        )
    }

    /// Finite, non-negative fractions with a non-empty area
    pub fn is_well_formed(&self) -> bool {
        let fracs = [
            self.left_frac,
            self.top_frac,
            self.width_frac,
            self.height_frac,
        ];
        fracs.iter().all(|f| f.is_finite() && *f >= 0.0)
            && self.width_frac > 0.0
            && self.height_frac > 0.0
    }

    /// Page index as `usize` if it addresses one of `page_count` pages
    pub fn page_in(&self, page_count: usize) -> Option<usize> {
        usize::try_from(self.page_index)
            .ok()
            .filter(|index| *index < page_count)
    }
}

/// Type-specific payload of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Drawn signature as base64 PNG/JPEG, optionally a `data:` URI
    Signature { data: String },
    /// Uploaded picture, same encoding as a signature
    Image { data: String },
    Text { text: String },
    /// Caller-formatted date; blank means "today"
    Date { text: String },
    Radio { label: Option<String>, selected: bool },
    /// Anything the compositor does not know how to draw
    Unsupported { type_name: String },
}

impl FieldKind {
    /// Wire name of the field type
    pub fn type_name(&self) -> &str {
        match self {
            FieldKind::Signature { .. } => "signature",
            FieldKind::Image { .. } => "image",
            FieldKind::Text { .. } => "text",
            FieldKind::Date { .. } => "date",
            FieldKind::Radio { .. } => "radio",
            FieldKind::Unsupported { type_name } => type_name,
        }
    }

    /// Whether drawing this kind needs the shared font
    pub fn uses_font(&self) -> bool {
        match self {
            FieldKind::Text { text } => !text.trim().is_empty(),
            // Blank dates still draw today's date
            FieldKind::Date { .. } => true,
            FieldKind::Radio { label, .. } => label.as_deref().is_some_and(|l| !l.trim().is_empty()),
            _ => false,
        }
    }
}

/// A placed field as submitted by the editor.
///
/// Serialized in the flat shape the editor sends (see [`FieldSpec`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "FieldSpec", into = "FieldSpec")]
pub struct Field {
    pub id: String,
    pub rect: NormalizedRect,
    pub kind: FieldKind,
}

impl Field {
    pub fn new(id: impl Into<String>, rect: NormalizedRect, kind: FieldKind) -> Self {
        Self {
            id: id.into(),
            rect,
            kind,
        }
    }

    pub fn signature(id: impl Into<String>, rect: NormalizedRect, data: impl Into<String>) -> Self {
        Self::new(id, rect, FieldKind::Signature { data: data.into() })
    }

    pub fn image(id: impl Into<String>, rect: NormalizedRect, data: impl Into<String>) -> Self {
        Self::new(id, rect, FieldKind::Image { data: data.into() })
    }

    pub fn text(id: impl Into<String>, rect: NormalizedRect, text: impl Into<String>) -> Self {
        Self::new(id, rect, FieldKind::Text { text: text.into() })
    }

    pub fn date(id: impl Into<String>, rect: NormalizedRect, text: impl Into<String>) -> Self {
        Self::new(id, rect, FieldKind::Date { text: text.into() })
    }

    pub fn radio(
        id: impl Into<String>,
        rect: NormalizedRect,
        label: Option<String>,
        selected: bool,
    ) -> Self {
        Self::new(id, rect, FieldKind::Radio { label, selected })
    }

    pub fn type_name(&self) -> &str {
        self.kind.type_name()
    }
}

/// Loosely-typed wire form of a [`Field`]:
/// `{ id, type, pageIndex, leftPct, topPct, widthPct, heightPct, value, label?, selected? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(flatten)]
    pub rect: NormalizedRect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
}

/// Radio values the editor uses for "not chosen"
fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty()
        && !["no", "false", "0", "off"]
            .iter()
            .any(|falsy| value.eq_ignore_ascii_case(falsy))
}

impl From<FieldSpec> for Field {
    fn from(spec: FieldSpec) -> Self {
        let value = spec.value.unwrap_or_default();
        let kind = match spec.field_type.trim().to_ascii_lowercase().as_str() {
            "signature" => FieldKind::Signature { data: value },
            "image" => FieldKind::Image { data: value },
            "text" => FieldKind::Text { text: value },
            "date" => FieldKind::Date { text: value },
            "radio" => FieldKind::Radio {
                selected: spec.selected.unwrap_or_else(|| is_truthy(&value)),
                label: spec.label,
            },
            _ => FieldKind::Unsupported {
                type_name: spec.field_type,
            },
        };

        Field {
            id: spec.id,
            rect: spec.rect,
            kind,
        }
    }
}

impl From<Field> for FieldSpec {
    fn from(field: Field) -> Self {
        let field_type = field.type_name().to_string();
        let (value, label, selected) = match field.kind {
            FieldKind::Signature { data } | FieldKind::Image { data } => (Some(data), None, None),
            FieldKind::Text { text } | FieldKind::Date { text } => (Some(text), None, None),
            FieldKind::Radio { label, selected } => (None, label, Some(selected)),
            FieldKind::Unsupported { .. } => (None, None, None),
        };

        FieldSpec {
            id: field.id,
            field_type,
            rect: field.rect,
            value,
            label,
            selected,
        }
    }
}

/// One compositing request: a stored source document and the fields to burn in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionJob {
    #[serde(alias = "pdfId")]
    pub source_document_id: String,
    pub fields: Vec<Field>,
}

impl CompositionJob {
    pub fn new(source_document_id: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            source_document_id: source_document_id.into(),
            fields,
        }
    }
}
