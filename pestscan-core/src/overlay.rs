use std::io::Cursor;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use pestscan_types::{BoundingBox, DetectionResult, FRAME_SIZE};

pub const BOX_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);
const BOX_COLOR_HEX: &str = "#00ff00";
const LINE_WIDTH: u32 = 2;
const LABEL_FONT_PX: u32 = 16;
const LABEL_OFFSET: f32 = 5.0;

/// Output flavour for an annotated scan, chosen from the file extension.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AnnotationFormat {
    /// PNG/JPEG raster: boxes only, no text labels.
    Raster,
    /// SVG: boxes plus "name (confidence%)" labels.
    Svg,
}

impl AnnotationFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => AnnotationFormat::Svg,
            _ => AnnotationFormat::Raster,
        }
    }

    pub fn has_labels(&self) -> bool {
        matches!(self, AnnotationFormat::Svg)
    }
}

/// One labelled rectangle in the coordinate space of the original image.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayBox {
    pub rect: BoundingBox,
    pub label: String,
}

/// Detection boxes mapped back onto the image they were found in.
#[derive(Clone, Debug, PartialEq)]
pub struct Overlay {
    pub width: u32,
    pub height: u32,
    pub boxes: Vec<OverlayBox>,
}

impl Overlay {
    pub fn new(width: u32, height: u32, results: &[DetectionResult]) -> Self {
        let sx = width as f32 / FRAME_SIZE as f32;
        let sy = height as f32 / FRAME_SIZE as f32;
        let boxes = results
            .iter()
            .map(|r| OverlayBox {
                rect: BoundingBox {
                    x1: r.bounding_box.x1 * sx,
                    y1: r.bounding_box.y1 * sy,
                    x2: r.bounding_box.x2 * sx,
                    y2: r.bounding_box.y2 * sy,
                },
                label: r.label(),
            })
            .collect();
        Self {
            width,
            height,
            boxes,
        }
    }

    pub fn for_image(img: &DynamicImage, results: &[DetectionResult]) -> Self {
        Self::new(img.width(), img.height(), results)
    }

    /// Raster copy of `img` with every box stroked. Labels need a font and are
    /// only carried by the SVG rendering.
    pub fn draw(&self, img: &DynamicImage) -> RgbaImage {
        let mut canvas = img.to_rgba8();
        for b in &self.boxes {
            stroke_rect(&mut canvas, &b.rect, LINE_WIDTH, BOX_COLOR);
        }
        canvas
    }

    /// SVG document embedding `img` as PNG, with boxes and text labels on top.
    pub fn to_svg(&self, img: &DynamicImage) -> Result<String, image::ImageError> {
        let mut png = Cursor::new(Vec::new());
        img.write_to(&mut png, ImageFormat::Png)?;
        let href = format!("data:image/png;base64,{}", STANDARD.encode(png.into_inner()));

        let (w, h) = (self.width, self.height);
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        );
        svg.push('\n');
        svg.push_str(&format!(
            r#"  <image href="{href}" x="0" y="0" width="{w}" height="{h}"/>"#
        ));
        svg.push('\n');
        for b in &self.boxes {
            let r = &b.rect;
            svg.push_str(&format!(
                r#"  <rect x="{}" y="{}" width="{}" height="{}" fill="none" stroke="{BOX_COLOR_HEX}" stroke-width="{LINE_WIDTH}"/>"#,
                r.x1,
                r.y1,
                r.width(),
                r.height()
            ));
            svg.push('\n');
            svg.push_str(&format!(
                r#"  <text x="{}" y="{}" fill="{BOX_COLOR_HEX}" font-family="Arial" font-size="{LABEL_FONT_PX}">{}</text>"#,
                r.x1,
                r.y1 - LABEL_OFFSET,
                escape_xml(&b.label)
            ));
            svg.push('\n');
        }
        svg.push_str("</svg>\n");
        Ok(svg)
    }
}

fn stroke_rect(canvas: &mut RgbaImage, rect: &BoundingBox, line: u32, color: Rgba<u8>) {
    let (w, h) = (canvas.width() as i64, canvas.height() as i64);
    if w == 0 || h == 0 {
        return;
    }
    // NaN casts to 0 and infinities saturate; spans are clipped to the canvas.
    let x1 = rect.x1.round() as i64;
    let y1 = rect.y1.round() as i64;
    let x2 = rect.x2.round() as i64;
    let y2 = rect.y2.round() as i64;
    let (span_x1, span_x2) = (x1.max(0), x2.min(w - 1));
    let (span_y1, span_y2) = (y1.max(0), y2.min(h - 1));

    for t in 0..line as i64 {
        for y in [y1.saturating_add(t), y2.saturating_sub(t)] {
            if (0..h).contains(&y) {
                for x in span_x1..=span_x2 {
                    canvas.put_pixel(x as u32, y as u32, color);
                }
            }
        }
        for x in [x1.saturating_add(t), x2.saturating_sub(t)] {
            if (0..w).contains(&x) {
                for y in span_y1..=span_y2 {
                    canvas.put_pixel(x as u32, y as u32, color);
                }
            }
        }
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use pestscan_types::Severity;

    fn result(x1: f32, y1: f32, x2: f32, y2: f32) -> DetectionResult {
        DetectionResult {
            name: "Fall Armyworm".into(),
            confidence: 95,
            description: String::new(),
            severity: Severity::Low,
            bounding_box: BoundingBox { x1, y1, x2, y2 },
        }
    }

    #[test]
    fn boxes_scale_to_image_size() {
        let o = Overlay::new(1200, 300, &[result(100.0, 100.0, 200.0, 200.0)]);
        let r = o.boxes[0].rect;
        assert_eq!((r.x1, r.x2), (200.0, 400.0));
        assert_eq!((r.y1, r.y2), (50.0, 100.0));
        assert_eq!(o.boxes[0].label, "Fall Armyworm (95%)");
    }

    #[test]
    fn raster_strokes_edges_only() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(600, 600, Rgb([0, 0, 0])));
        let o = Overlay::for_image(&img, &[result(100.0, 100.0, 200.0, 200.0)]);
        let out = o.draw(&img);
        assert_eq!(*out.get_pixel(150, 100), BOX_COLOR);
        assert_eq!(*out.get_pixel(150, 101), BOX_COLOR);
        assert_eq!(*out.get_pixel(200, 150), BOX_COLOR);
        assert_eq!(*out.get_pixel(150, 150), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn boxes_past_the_edge_are_clipped() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::new(60, 60));
        let o = Overlay::for_image(&img, &[result(-50.0, -50.0, 900.0, 900.0)]);
        let out = o.draw(&img);
        assert_eq!(out.dimensions(), (60, 60));
    }

    #[test]
    fn runaway_boxes_are_clipped_without_walking_the_span() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::new(32, 32));
        let wild = [
            result(0.0, 0.0, f32::INFINITY, f32::INFINITY),
            result(f32::NEG_INFINITY, f32::NEG_INFINITY, 1.0e30, 1.0e30),
            result(f32::NAN, 5.0, 20.0, f32::NAN),
        ];
        let out = Overlay::new(32, 32, &wild).draw(&img);
        assert_eq!(out.dimensions(), (32, 32));
        // left edge of the first box is on canvas
        assert_eq!(*out.get_pixel(0, 16), BOX_COLOR);
    }

    #[test]
    fn only_svg_annotations_carry_labels() {
        assert_eq!(AnnotationFormat::from_path(Path::new("scan.SVG")), AnnotationFormat::Svg);
        assert!(AnnotationFormat::from_path(Path::new("scan.svg")).has_labels());
        assert!(!AnnotationFormat::from_path(Path::new("scan.png")).has_labels());
        assert_eq!(AnnotationFormat::from_path(Path::new("scan")), AnnotationFormat::Raster);
    }

    #[test]
    fn svg_carries_label_above_box() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::new(600, 600));
        let mut r = result(100.0, 100.0, 200.0, 200.0);
        r.name = "Mites & <Thrips>".into();
        let svg = Overlay::for_image(&img, &[r]).to_svg(&img).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"<rect x="100" y="100" width="100" height="100""#));
        assert!(svg.contains(r#"<text x="100" y="95""#));
        assert!(svg.contains("Mites &amp; &lt;Thrips&gt; (95%)"));
        assert!(svg.contains("data:image/png;base64,"));
    }
}
