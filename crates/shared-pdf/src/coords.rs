//! Coordinate transformation between editor fractions and PDF user space
//!
//! The editor measures rectangles from the top-left corner of the rendered
//! page; PDF user space has its origin at the bottom-left.

use shared_types::NormalizedRect;

/// Absolute box in PDF user space (bottom-left origin, points)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentBox {
    pub x: f64,
    pub y_bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl DocumentBox {
    pub fn new(x: f64, y_bottom: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y_bottom,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y_bottom + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y_bottom + self.height / 2.0)
    }

    /// Shrink by `padding` on every side.
    ///
    /// Width and height can go negative when the box is smaller than twice the
    /// padding; callers decide what that means for them.
    pub fn inset(&self, padding: f64) -> Self {
        Self {
            x: self.x + padding,
            y_bottom: self.y_bottom + padding,
            width: self.width - 2.0 * padding,
            height: self.height - 2.0 * padding,
        }
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y_bottom: self.y_bottom + dy,
            ..*self
        }
    }
}

/// Convert a page-relative rectangle to a box on a page of the given size.
///
/// Rectangles that overflow the page are left as computed.
pub fn to_document_box(rect: &NormalizedRect, page_width: f64, page_height: f64) -> DocumentBox {
    let width = rect.width_frac * page_width;
    let height = rect.height_frac * page_height;
    let x = rect.left_frac * page_width;
    let top_y = rect.top_frac * page_height;

    // Flip Y axis
    let y_bottom = page_height - (top_y + height);

    DocumentBox {
        x,
        y_bottom,
        width,
        height,
    }
}

/// Visible page area taken from the MediaBox
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub origin_x: f64,
    pub origin_y: f64,
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    /// US Letter in points
    pub fn letter() -> Self {
        Self::from_media_box([0.0, 0.0, 612.0, 792.0])
    }

    /// From a MediaBox in `[x, y, width, height]` form
    pub fn from_media_box(media_box: [f64; 4]) -> Self {
        let [origin_x, origin_y, width, height] = media_box;
        Self {
            origin_x,
            origin_y,
            width,
            height,
        }
    }

    /// Place a rectangle on this page, honouring a MediaBox that does not
    /// start at the origin
    pub fn place(&self, rect: &NormalizedRect) -> DocumentBox {
        to_document_box(rect, self.width, self.height).translate(self.origin_x, self.origin_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_full_page_maps_to_whole_page() {
        let b = to_document_box(&NormalizedRect::full_page(0), 612.0, 792.0);
        assert_eq!(b, DocumentBox::new(0.0, 0.0, 612.0, 792.0));
    }

    #[test]
    fn test_us_letter_text_field() {
        let rect = NormalizedRect::new(0, 0.1, 0.1, 0.3, 0.05);
        let b = to_document_box(&rect, 612.0, 792.0);

        assert!(approx(b.x, 61.2));
        assert!(approx(b.width, 183.6));
        assert!(approx(b.height, 39.6));
        // 792 - (79.2 + 39.6)
        assert!(approx(b.y_bottom, 673.2));
    }

    #[test]
    fn test_corners() {
        let (w, h) = (612.0, 792.0);

        // Top-left of the editor is the top of the PDF page
        let b = to_document_box(&NormalizedRect::new(0, 0.0, 0.0, 0.25, 0.1), w, h);
        assert!(approx(b.x, 0.0));
        assert!(approx(b.top(), h));

        // Bottom-right of the editor is the bottom-right of the PDF page
        let b = to_document_box(&NormalizedRect::new(0, 0.75, 0.9, 0.25, 0.1), w, h);
        assert!(approx(b.right(), w));
        assert!(approx(b.y_bottom, 0.0));
    }

    #[test]
    fn test_offset_media_box() {
        let page = PageSize::from_media_box([10.0, 20.0, 600.0, 800.0]);
        let b = page.place(&NormalizedRect::full_page(0));
        assert_eq!(b, DocumentBox::new(10.0, 20.0, 600.0, 800.0));
    }

    #[test]
    fn test_overflow_is_not_clamped() {
        let b = to_document_box(&NormalizedRect::new(0, 0.9, 0.95, 0.2, 0.1), 100.0, 100.0);
        assert!(approx(b.right(), 110.0));
        assert!(approx(b.y_bottom, -5.0));
    }

    #[test]
    fn test_inset_and_center() {
        let b = DocumentBox::new(10.0, 20.0, 100.0, 40.0);
        assert_eq!(b.center(), (60.0, 40.0));
        assert_eq!(b.inset(5.0), DocumentBox::new(15.0, 25.0, 90.0, 30.0));
        assert_eq!(b.inset(5.0).center(), b.center());
    }
}
