//! Signature and picture fields

use std::io::{Cursor, Write};

use flate2::{write::ZlibEncoder, Compression};
use image::{
    codecs::jpeg::JpegDecoder, DynamicImage, ExtendedColorType, ImageDecoder, ImageFormat,
};
use lopdf::content::Operation;
use lopdf::{dictionary, Document, Object, Stream};
use shared_pdf::DocumentBox;

use super::{real, PageCanvas, FIELD_PADDING};
use crate::error::FieldRenderError;
use crate::payload::decode_payload;

/// Pixel data ready to become an image XObject
#[derive(Debug, Clone, PartialEq)]
pub enum PixelData {
    /// 8-bit RGB triples with an optional 8-bit alpha plane
    Rgb { rgb: Vec<u8>, alpha: Option<Vec<u8>> },
    /// Untouched JPEG stream
    Dct {
        data: Vec<u8>,
        color_space: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub pixels: PixelData,
}

/// Decode PNG, falling back to JPEG
pub fn decode_image(bytes: &[u8]) -> Result<RasterImage, FieldRenderError> {
    let raster = match image::load_from_memory_with_format(bytes, ImageFormat::Png) {
        Ok(png) => from_dynamic(png),
        Err(png_err) => {
            tracing::debug!(error = %png_err, "Payload is not PNG, trying JPEG");
            decode_jpeg(bytes)?
        }
    };

    if raster.width == 0 || raster.height == 0 {
        return Err(FieldRenderError::UndecodableImage);
    }
    Ok(raster)
}

fn decode_jpeg(bytes: &[u8]) -> Result<RasterImage, FieldRenderError> {
    let decoder =
        JpegDecoder::new(Cursor::new(bytes)).map_err(|_| FieldRenderError::UndecodableImage)?;
    let (width, height) = decoder.dimensions();

    // Gray and RGB JPEGs embed as-is; CMYK and friends are re-encoded
    let color_space = match decoder.original_color_type() {
        ExtendedColorType::L8 => Some("DeviceGray"),
        ExtendedColorType::Rgb8 => Some("DeviceRGB"),
        _ => None,
    };

    match color_space {
        Some(color_space) => Ok(RasterImage {
            width,
            height,
            pixels: PixelData::Dct {
                data: bytes.to_vec(),
                color_space,
            },
        }),
        None => DynamicImage::from_decoder(decoder)
            .map(from_dynamic)
            .map_err(|_| FieldRenderError::UndecodableImage),
    }
}

fn from_dynamic(img: DynamicImage) -> RasterImage {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha = Vec::with_capacity((width * height) as usize);
    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel.0[3]);
    }
    let opaque = alpha.iter().all(|a| *a == u8::MAX);

    RasterImage {
        width,
        height,
        pixels: PixelData::Rgb {
            rgb,
            alpha: (!opaque).then_some(alpha),
        },
    }
}

fn flate(data: &[u8]) -> Result<Vec<u8>, FieldRenderError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| FieldRenderError::Encode(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| FieldRenderError::Encode(e.to_string()))
}

/// Streams for the image XObject and its soft mask, not yet added to the document
fn build_streams(image: &RasterImage) -> Result<(Stream, Option<Stream>), FieldRenderError> {
    let (width, height) = (i64::from(image.width), i64::from(image.height));

    match &image.pixels {
        PixelData::Dct { data, color_space } => {
            let dict = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => *color_space,
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            };
            Ok((Stream::new(dict, data.clone()), None))
        }
        PixelData::Rgb { rgb, alpha } => {
            let dict = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            };
            let smask = match alpha {
                Some(alpha) => {
                    let mask_dict = dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Image",
                        "Width" => width,
                        "Height" => height,
                        "ColorSpace" => "DeviceGray",
                        "BitsPerComponent" => 8,
                        "Filter" => "FlateDecode",
                    };
                    Some(Stream::new(mask_dict, flate(alpha)?))
                }
                None => None,
            };
            Ok((Stream::new(dict, flate(rgb)?), smask))
        }
    }
}

/// Aspect-preserving "contain" fit of an `img_width x img_height` image,
/// centred in `area` on both axes
pub fn contain_fit(img_width: f64, img_height: f64, area: DocumentBox) -> DocumentBox {
    let scale = (area.width / img_width).min(area.height / img_height);
    let width = img_width * scale;
    let height = img_height * scale;

    DocumentBox::new(
        area.x + (area.width - width) / 2.0,
        area.y_bottom + (area.height - height) / 2.0,
        width,
        height,
    )
}

/// Decode the payload, embed it and draw it contained in the padded box
pub fn draw_image(
    doc: &mut Document,
    canvas: &mut PageCanvas,
    bx: DocumentBox,
    payload: &str,
) -> Result<(), FieldRenderError> {
    let area = bx.inset(FIELD_PADDING);
    if area.width <= 0.0 || area.height <= 0.0 {
        return Err(FieldRenderError::AreaTooSmall);
    }

    let bytes = decode_payload(payload)?;
    let image = decode_image(&bytes)?;
    let (mut stream, smask) = build_streams(&image)?;

    if let Some(smask) = smask {
        let smask_id = doc.add_object(smask);
        stream.dict.set("SMask", Object::Reference(smask_id));
    }
    let image_id = doc.add_object(stream);
    let name = canvas.add_xobject(image_id);

    let placed = contain_fit(f64::from(image.width), f64::from(image.height), area);
    canvas.extend(vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                real(placed.width),
                0.into(),
                0.into(),
                real(placed.height),
                real(placed.x),
                real(placed.y_bottom),
            ],
        ),
        Operation::new("Do", vec![Object::Name(name.into_bytes())]),
        Operation::new("Q", vec![]),
    ]);

    tracing::debug!(
        width = image.width,
        height = image.height,
        draw_width = placed.width,
        draw_height = placed.height,
        "Placed image"
    );
    Ok(())
}
