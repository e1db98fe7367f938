use crate::render::HeadlessError;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::imageops::FilterType;

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error(transparent)]
    Headless(#[from] HeadlessError),
    #[error("failed to parse SVG")]
    SvgParse,
    #[error("failed to allocate pixmap for raster rendering")]
    PixmapAlloc,
    #[error("failed to encode PNG")]
    PngEncode,
    #[error("invalid background color for JPG rendering")]
    JpegBackground,
    #[error("JPG rendering requires an opaque background color (e.g. white)")]
    JpegOpaqueBackgroundRequired,
    #[error("failed to encode JPG")]
    JpegEncode,
}

impl From<prochart_render::Error> for RasterError {
    fn from(err: prochart_render::Error) -> Self {
        Self::Headless(err.into())
    }
}

pub type Result<T> = std::result::Result<T, RasterError>;

#[derive(Debug, Clone)]
pub struct RasterOptions {
    /// Device pixels per SVG unit for the full image.
    pub scale: f32,
    /// Fill painted under the chart. `None` keeps PNG transparent; JPG falls back to white.
    pub background: Option<String>,
    pub jpeg_quality: u8,
    /// Target width of the thumbnail in pixels; narrower charts are not upscaled.
    pub thumbnail_width: u32,
    pub thumbnail_quality: u8,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            background: None,
            jpeg_quality: 90,
            thumbnail_width: 320,
            thumbnail_quality: 70,
        }
    }
}

pub fn svg_to_png(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    let pixmap = svg_to_pixmap(svg, options.scale, options.background.as_deref())?;
    pixmap.encode_png().map_err(|_| RasterError::PngEncode)
}

pub fn svg_to_jpeg(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    let bg = opaque_background(options)?;
    let pixmap = svg_to_pixmap(svg, options.scale, Some(bg))?;
    let (w, h) = (pixmap.width(), pixmap.height());
    encode_jpeg(&to_rgb(&pixmap), w, h, options.jpeg_quality)
}

/// A small, lower-quality JPG preview: rendered at 1x, then downscaled to `thumbnail_width`.
pub fn svg_to_thumbnail_jpeg(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    let bg = opaque_background(options)?;
    let pixmap = svg_to_pixmap(svg, 1.0, Some(bg))?;
    let (w, h) = (pixmap.width(), pixmap.height());
    let rgb = image::RgbImage::from_raw(w, h, to_rgb(&pixmap)).ok_or(RasterError::PixmapAlloc)?;

    let target_w = options.thumbnail_width.clamp(1, w);
    let target_h = ((h as f64) * (target_w as f64) / (w as f64)).round().max(1.0) as u32;
    let thumb = if target_w == w {
        rgb
    } else {
        image::imageops::resize(&rgb, target_w, target_h, FilterType::Triangle)
    };
    let (tw, th) = thumb.dimensions();
    encode_jpeg(thumb.as_raw(), tw, th, options.thumbnail_quality)
}

/// Wraps encoded bytes as a `data:` URL.
pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

fn opaque_background(options: &RasterOptions) -> Result<&str> {
    let bg = options.background.as_deref().unwrap_or("white");
    let Some(color) = parse_tiny_skia_color(bg) else {
        return Err(RasterError::JpegBackground);
    };
    if color.alpha() != 1.0 {
        return Err(RasterError::JpegOpaqueBackgroundRequired);
    }
    Ok(bg)
}

// The pixmap is filled with an opaque background first, so alpha is always 255 here.
fn to_rgb(pixmap: &tiny_skia::Pixmap) -> Vec<u8> {
    let rgba = pixmap.data();
    let mut rgb = vec![0u8; (pixmap.width() as usize) * (pixmap.height() as usize) * 3];
    for (src, dst) in rgba.chunks_exact(4).zip(rgb.chunks_exact_mut(3)) {
        dst.copy_from_slice(&src[..3]);
    }
    rgb
}

fn encode_jpeg(rgb: &[u8], w: u32, h: u32, quality: u8) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut enc = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
    enc.encode(rgb, w, h, image::ExtendedColorType::Rgb8)
        .map_err(|_| RasterError::JpegEncode)?;
    Ok(out)
}

fn svg_to_pixmap(svg: &str, scale: f32, background: Option<&str>) -> Result<tiny_skia::Pixmap> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = "sans-serif".to_string();

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|_| RasterError::SvgParse)?;

    // Chart SVGs always carry a `0 0 w h` viewBox, which usvg folds into the tree size.
    let size = tree.size();
    let width_px = (size.width() * scale).ceil().max(1.0) as u32;
    let height_px = (size.height() * scale).ceil().max(1.0) as u32;

    let mut pixmap = tiny_skia::Pixmap::new(width_px, height_px).ok_or(RasterError::PixmapAlloc)?;

    if let Some(color) = background.and_then(parse_tiny_skia_color) {
        pixmap.fill(color);
    }

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Ok(pixmap)
}

fn parse_tiny_skia_color(text: &str) -> Option<tiny_skia::Color> {
    let s = text.trim().to_ascii_lowercase();
    match s.as_str() {
        "transparent" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 0)),
        "white" => return Some(tiny_skia::Color::from_rgba8(255, 255, 255, 255)),
        "black" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 255)),
        _ => {}
    }

    let hex = s.strip_prefix('#')?;
    let digit = |b: u8| (b as char).to_digit(16).map(|v| v as u8);
    let bytes = hex.as_bytes();
    let channels: Vec<u8> = match bytes.len() {
        3 | 4 => bytes
            .iter()
            .map(|&b| digit(b).map(|v| (v << 4) | v))
            .collect::<Option<_>>()?,
        6 | 8 => bytes
            .chunks_exact(2)
            .map(|p| Some((digit(p[0])? << 4) | digit(p[1])?))
            .collect::<Option<_>>()?,
        _ => return None,
    };
    let alpha = channels.get(3).copied().unwrap_or(255);
    Some(tiny_skia::Color::from_rgba8(
        channels[0],
        channels[1],
        channels[2],
        alpha,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="200" viewBox="0 0 400 200"><rect width="400" height="200" fill="#5470c6"/></svg>"##;

    #[test]
    fn svg_to_png_renders_at_scale() {
        let bytes = svg_to_png(SVG, &RasterOptions::default()).unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
        // IHDR width/height, big-endian, right after the 8-byte signature and chunk header.
        let w = u32::from_be_bytes(bytes[16..20].try_into().unwrap());
        let h = u32::from_be_bytes(bytes[20..24].try_into().unwrap());
        assert_eq!((w, h), (800, 400));
    }

    #[test]
    fn thumbnail_is_a_downscaled_jpeg() {
        let options = RasterOptions {
            thumbnail_width: 100,
            ..RasterOptions::default()
        };
        let bytes = svg_to_thumbnail_jpeg(SVG, &options).unwrap();
        assert!(bytes.starts_with(&[0xFF, 0xD8, 0xFF]));
        let full = svg_to_jpeg(SVG, &options).unwrap();
        assert!(bytes.len() < full.len());
    }

    #[test]
    fn jpeg_requires_an_opaque_background() {
        let options = RasterOptions {
            background: Some("#ffffff80".to_string()),
            ..RasterOptions::default()
        };
        assert!(matches!(
            svg_to_jpeg(SVG, &options),
            Err(RasterError::JpegOpaqueBackgroundRequired)
        ));
        let options = RasterOptions {
            background: Some("nope".to_string()),
            ..RasterOptions::default()
        };
        assert!(matches!(
            svg_to_jpeg(SVG, &options),
            Err(RasterError::JpegBackground)
        ));
    }

    #[test]
    fn colors_parse_in_short_and_long_forms() {
        let c = parse_tiny_skia_color("#fff").unwrap();
        assert_eq!(c.alpha(), 1.0);
        let c = parse_tiny_skia_color("#00000000").unwrap();
        assert_eq!(c.alpha(), 0.0);
        assert!(parse_tiny_skia_color("#12345").is_none());
        assert!(parse_tiny_skia_color("#zzz").is_none());
    }

    #[test]
    fn data_urls_are_base64() {
        assert_eq!(data_url("image/png", b"hi"), "data:image/png;base64,aGk=");
    }
}
