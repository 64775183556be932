//! Radio fields: outlined circle, optional dot, optional label

use lopdf::content::Operation;
use shared_pdf::DocumentBox;

use super::text::{centered_baseline, fit_font_size, text_line};
use super::{
    real, FontHandle, PageCanvas, FIELD_PADDING, RADIO_FILL_RATIO, RADIO_LABEL_GAP,
    RADIO_MAX_RADIUS, RADIO_MIN_RADIUS, RADIO_RADIUS_RATIO,
};
use crate::error::FieldRenderError;

/// Control point distance for a quarter circle drawn as one cubic Bezier
const KAPPA: f64 = 0.552_284_749_8;

const OUTLINE_WIDTH: f64 = 1.0;

/// Where the parts of a radio field go inside its box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadioLayout {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
    pub fill_radius: f64,
    /// Left edge of the label
    pub label_x: f64,
    /// Width left for the label after the circle and gap
    pub label_width: f64,
}

impl RadioLayout {
    pub fn for_box(bx: DocumentBox) -> Self {
        let radius = (bx.height * RADIO_RADIUS_RATIO).clamp(RADIO_MIN_RADIUS, RADIO_MAX_RADIUS);
        let (_, center_y) = bx.center();

        Self {
            center_x: bx.x + FIELD_PADDING + radius,
            center_y,
            radius,
            fill_radius: radius * RADIO_FILL_RATIO,
            label_x: bx.x + FIELD_PADDING + 2.0 * radius + RADIO_LABEL_GAP,
            label_width: bx.width - 2.0 * FIELD_PADDING - 2.0 * radius - RADIO_LABEL_GAP,
        }
    }
}

/// Closed circle path made of four Bezier quarters
pub fn circle_path(cx: f64, cy: f64, r: f64) -> Vec<Operation> {
    let k = r * KAPPA;
    let curve = |points: [f64; 6]| Operation::new("c", points.iter().map(|v| real(*v)).collect());

    vec![
        Operation::new("m", vec![real(cx + r), real(cy)]),
        curve([cx + r, cy + k, cx + k, cy + r, cx, cy + r]),
        curve([cx - k, cy + r, cx - r, cy + k, cx - r, cy]),
        curve([cx - r, cy - k, cx - k, cy - r, cx, cy - r]),
        curve([cx + k, cy - r, cx + r, cy - k, cx + r, cy]),
        Operation::new("h", vec![]),
    ]
}

pub fn draw_radio(
    canvas: &mut PageCanvas,
    bx: DocumentBox,
    label: Option<&str>,
    selected: bool,
    font: Option<&FontHandle>,
) -> Result<(), FieldRenderError> {
    let label = label.filter(|l| !l.trim().is_empty());
    if label.is_some() && font.is_none() {
        return Err(FieldRenderError::FontUnavailable);
    }

    let layout = RadioLayout::for_box(bx);
    let mut ops = vec![
        Operation::new("q", vec![]),
        Operation::new("w", vec![real(OUTLINE_WIDTH)]),
        Operation::new("G", vec![0.into()]),
    ];
    ops.extend(circle_path(layout.center_x, layout.center_y, layout.radius));
    ops.push(Operation::new("S", vec![]));

    if selected {
        ops.push(Operation::new("g", vec![0.into()]));
        ops.extend(circle_path(
            layout.center_x,
            layout.center_y,
            layout.fill_radius,
        ));
        ops.push(Operation::new("f", vec![]));
    }
    ops.push(Operation::new("Q", vec![]));

    if let (Some(label), Some(font)) = (label, font) {
        let size = fit_font_size(font.font, label, layout.label_width, bx.height);
        let name = canvas.font_name(font);
        ops.extend(text_line(
            &name,
            font.font,
            label,
            size,
            layout.label_x,
            centered_baseline(layout.center_y, size),
        ));
    }

    canvas.extend(ops);
    Ok(())
}
