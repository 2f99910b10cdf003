//! Line segment extraction from an edge map
//!
//! Lines come from a standard Hough transform; each detected line is then
//! walked across the edge map to split it into finite segments, bridging
//! gaps up to `max_gap` pixels and dropping pieces shorter than
//! `min_length`.

use image::GrayImage;
use imageproc::hough::{detect_lines, LineDetectionOptions, PolarLine};

/// Finite line segment in pixel coordinates, ordered top to bottom
/// (left to right when horizontal)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl LineSegment {
    fn ordered(a: (f32, f32), b: (f32, f32)) -> Self {
        let (start, end) = if a.1 < b.1 || (a.1 == b.1 && a.0 <= b.0) {
            (a, b)
        } else {
            (b, a)
        };
        Self {
            x1: start.0,
            y1: start.1,
            x2: end.0,
            y2: end.1,
        }
    }

    pub fn length(&self) -> f32 {
        (self.x2 - self.x1).hypot(self.y2 - self.y1)
    }

    /// Direction in degrees, in [0, 180); vertical is 90
    pub fn angle_deg(&self) -> f32 {
        (self.y2 - self.y1).atan2(self.x2 - self.x1).to_degrees()
    }
}

/// Parameters for [`detect_segments`]
#[derive(Debug, Clone, Copy)]
pub struct SegmentDetectionOptions {
    /// Hough accumulator votes needed for a line
    pub vote_threshold: u32,
    /// Non-maximum suppression radius in the accumulator
    pub suppression_radius: u32,
    pub min_length: f32,
    pub max_gap: f32,
}

impl Default for SegmentDetectionOptions {
    fn default() -> Self {
        Self {
            vote_threshold: 50,
            suppression_radius: 8,
            min_length: 30.0,
            max_gap: 10.0,
        }
    }
}

/// Detect line segments in a binary edge map (nonzero pixels are edges)
pub fn detect_segments(edges: &GrayImage, options: &SegmentDetectionOptions) -> Vec<LineSegment> {
    let (width, height) = edges.dimensions();
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let lines = detect_lines(
        edges,
        LineDetectionOptions {
            vote_threshold: options.vote_threshold,
            suppression_radius: options.suppression_radius,
        },
    );

    let mut segments = Vec::new();
    for line in &lines {
        trace_line(edges, line, options, &mut segments);
    }
    segments
}

/// Walk `x cos t + y sin t = r` across the image, collecting edge runs
fn trace_line(edges: &GrayImage, line: &PolarLine, options: &SegmentDetectionOptions, out: &mut Vec<LineSegment>) {
    let (width, height) = edges.dimensions();
    let (sin, cos) = (line.angle_in_degrees as f32).to_radians().sin_cos();
    let (x0, y0) = (line.r * cos, line.r * sin);
    let reach = ((width as f32).powi(2) + (height as f32).powi(2)).sqrt().ceil();
    let steps = (2.0 * reach) as u32;

    // (start, last hit)
    let mut run: Option<((f32, f32), (f32, f32))> = None;
    let mut gap = 0.0f32;

    for i in 0..=steps {
        let t = i as f32 - reach;
        let point = (x0 - t * sin, y0 + t * cos);

        if is_edge_near(edges, point, (cos, sin)) {
            run = Some(match run {
                Some((start, _)) => (start, point),
                None => (point, point),
            });
            gap = 0.0;
        } else if let Some((start, last)) = run {
            gap += 1.0;
            if gap > options.max_gap {
                push_segment(start, last, options.min_length, out);
                run = None;
                gap = 0.0;
            }
        }
    }

    if let Some((start, last)) = run {
        push_segment(start, last, options.min_length, out);
    }
}

fn push_segment(start: (f32, f32), end: (f32, f32), min_length: f32, out: &mut Vec<LineSegment>) {
    let segment = LineSegment::ordered(start, end);
    if segment.length() >= min_length {
        out.push(segment);
    }
}

/// Accumulator rounding puts the true line up to a pixel off `r`
fn is_edge_near(edges: &GrayImage, (x, y): (f32, f32), (nx, ny): (f32, f32)) -> bool {
    let (width, height) = edges.dimensions();
    [-1.0f32, 0.0, 1.0].iter().any(|k| {
        let px = (x + k * nx).round();
        let py = (y + k * ny).round();
        px >= 0.0
            && py >= 0.0
            && (px as u32) < width
            && (py as u32) < height
            && edges.get_pixel(px as u32, py as u32)[0] > 0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn vertical_line(x: u32, rows: impl Iterator<Item = u32>) -> GrayImage {
        let mut img = GrayImage::new(200, 200);
        for y in rows {
            img.put_pixel(x, y, Luma([255]));
        }
        img
    }

    #[test]
    fn test_blank_image_has_no_segments() {
        let img = GrayImage::new(100, 100);
        assert!(detect_segments(&img, &SegmentDetectionOptions::default()).is_empty());
        assert!(detect_segments(&GrayImage::new(0, 0), &SegmentDetectionOptions::default()).is_empty());
    }

    #[test]
    fn test_vertical_line_segment() {
        let img = vertical_line(50, 20..120);
        let segments = detect_segments(&img, &SegmentDetectionOptions::default());

        assert!(!segments.is_empty());
        for s in &segments {
            assert!((s.angle_deg() - 90.0).abs() < 2.0, "angle {}", s.angle_deg());
        }
        assert!(segments.iter().any(|s| s.length() > 90.0));
    }

    #[test]
    fn test_small_gap_bridged() {
        let img = vertical_line(50, (20..70).chain(75..120));
        let segments = detect_segments(&img, &SegmentDetectionOptions::default());
        assert!(segments.iter().any(|s| s.length() > 90.0));
    }

    #[test]
    fn test_large_gap_splits() {
        let img = vertical_line(50, (20..60).chain(80..120));
        let segments = detect_segments(&img, &SegmentDetectionOptions::default());
        assert!(segments.len() >= 2);
        assert!(segments.iter().all(|s| s.length() < 45.0));
    }

    #[test]
    fn test_horizontal_segment_angle() {
        let segment = LineSegment::ordered((120.0, 40.0), (10.0, 40.0));
        assert_eq!(segment.x1, 10.0);
        assert!(segment.angle_deg().abs() < 1e-6);
    }
}
