//! Text and date fields

use lopdf::content::Operation;
use lopdf::{Object, StringFormat};
use shared_pdf::{DocumentBox, StandardFont};

use super::{
    real, FontHandle, PageCanvas, DEFAULT_FONT_SIZE, FIELD_PADDING, FONT_HEIGHT_RATIO,
    FONT_SIZE_STEP, MIN_FONT_SIZE,
};
use crate::error::FieldRenderError;

/// Largest size, starting from `min(DEFAULT_FONT_SIZE, box_height * FONT_HEIGHT_RATIO)`
/// and stepping down, at which `text` fits `available_width`.
///
/// Stops at [`MIN_FONT_SIZE`] even when the text still overflows. A start size
/// already below the floor is kept as is.
pub fn fit_font_size(font: StandardFont, text: &str, available_width: f64, box_height: f64) -> f64 {
    let mut size = DEFAULT_FONT_SIZE.min(box_height * FONT_HEIGHT_RATIO);
    while font.text_width(text, size) > available_width && size > MIN_FONT_SIZE {
        size = (size - FONT_SIZE_STEP).max(MIN_FONT_SIZE);
    }
    size
}

/// Baseline that visually centres glyphs of `size` on `center_y`
pub fn centered_baseline(center_y: f64, size: f64) -> f64 {
    center_y - size / 3.0
}

/// Operations showing one line of text with its baseline starting at `(x, baseline)`
pub(crate) fn text_line(
    font_name: &str,
    font: StandardFont,
    text: &str,
    size: f64,
    x: f64,
    baseline: f64,
) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new("g", vec![0.into()]),
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![Object::Name(font_name.as_bytes().to_vec()), real(size)]),
        Operation::new("Td", vec![real(x), real(baseline)]),
        Operation::new(
            "Tj",
            vec![Object::String(font.encode(text), StringFormat::Literal)],
        ),
        Operation::new("ET", vec![]),
        Operation::new("Q", vec![]),
    ]
}

/// Left-aligned, vertically centred, shrunk to fit the padded width
pub fn draw_text(
    canvas: &mut PageCanvas,
    bx: DocumentBox,
    text: &str,
    font: Option<&FontHandle>,
) -> Result<(), FieldRenderError> {
    if text.trim().is_empty() {
        return Ok(());
    }
    let font = font.ok_or(FieldRenderError::FontUnavailable)?;

    let available = bx.width - 2.0 * FIELD_PADDING;
    let size = fit_font_size(font.font, text, available, bx.height);
    let (_, center_y) = bx.center();

    let name = canvas.font_name(font);
    canvas.extend(text_line(
        &name,
        font.font,
        text,
        size,
        bx.x + FIELD_PADDING,
        centered_baseline(center_y, size),
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::Document;
    use pretty_assertions::assert_eq;

    const HELVETICA: StandardFont = StandardFont::Helvetica;

    #[test]
    fn test_short_text_keeps_default_size() {
        assert_eq!(fit_font_size(HELVETICA, "Jane Doe", 171.6, 39.6), 10.0);
    }

    #[test]
    fn test_short_box_caps_size_by_height() {
        // 0.6 * 12 = 7.2
        let size = fit_font_size(HELVETICA, "Hi", 500.0, 12.0);
        assert!((size - 7.2).abs() < 1e-9);
    }

    #[test]
    fn test_five_char_box_shrinks_until_it_fits() {
        let text = "A much longer name";
        let available = HELVETICA.text_width("ABCDE", DEFAULT_FONT_SIZE);
        let size = fit_font_size(HELVETICA, text, available, 40.0);

        assert!(size >= MIN_FONT_SIZE);
        assert!(size < DEFAULT_FONT_SIZE);
        if size > MIN_FONT_SIZE {
            assert!(HELVETICA.text_width(text, size) <= available);
        }
    }

    #[test]
    fn test_picks_largest_fitting_size() {
        let text = "Hello";
        // Exactly fits at 8.0
        let available = HELVETICA.text_width(text, 8.0);
        assert_eq!(fit_font_size(HELVETICA, text, available, 40.0), 8.0);
    }

    #[test]
    fn test_overflow_stops_at_floor() {
        let size = fit_font_size(HELVETICA, "Supercalifragilisticexpialidocious", 10.0, 40.0);
        assert_eq!(size, MIN_FONT_SIZE);
    }

    #[test]
    fn test_us_letter_text_is_left_aligned_in_box() {
        let mut doc = Document::with_version("1.7");
        let font = FontHandle::create(&mut doc, HELVETICA);
        let mut canvas = PageCanvas::new((1, 0), Vec::<String>::new());
        let bx = DocumentBox::new(61.2, 673.2, 183.6, 39.6);

        draw_text(&mut canvas, bx, "Jane Doe", Some(&font)).unwrap();

        let ops = canvas.operations();
        let tf = ops.iter().find(|op| op.operator == "Tf").unwrap();
        let size = tf.operands[1].as_float().unwrap();
        assert!(size <= 10.0);

        let td = ops.iter().find(|op| op.operator == "Td").unwrap();
        let x = td.operands[0].as_float().unwrap() as f64;
        let y = td.operands[1].as_float().unwrap() as f64;
        assert!((x - (61.2 + FIELD_PADDING)).abs() < 1e-3);
        // 673.2 + 19.8 - 10/3
        assert!((y - 689.6667).abs() < 1e-3);
    }

    #[test]
    fn test_empty_text_draws_nothing() {
        let mut canvas = PageCanvas::new((1, 0), Vec::<String>::new());
        let bx = DocumentBox::new(0.0, 0.0, 100.0, 20.0);
        draw_text(&mut canvas, bx, "", None).unwrap();
        draw_text(&mut canvas, bx, "  ", None).unwrap();
        assert!(canvas.is_empty());
        assert!(canvas.fonts().is_empty());
    }

    #[test]
    fn test_missing_font_is_an_error() {
        let mut canvas = PageCanvas::new((1, 0), Vec::<String>::new());
        let bx = DocumentBox::new(0.0, 0.0, 100.0, 20.0);
        assert_eq!(
            draw_text(&mut canvas, bx, "x", None),
            Err(FieldRenderError::FontUnavailable)
        );
        assert!(canvas.is_empty());
    }
}
