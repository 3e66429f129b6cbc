use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};

use crate::{
    config::ExportConfig,
    graph::{
        error::{GraphError, GraphResult},
        export::{
            interchange::Interchange,
            layout::{force_directed, Point},
            style,
        },
    },
};

pub fn render(view: &Interchange, options: &ExportConfig) -> GraphResult<Vec<u8>> {
    let (width, height) = (options.image_width, options.image_height);
    let points = force_directed(
        view,
        width as f64,
        height as f64,
        options.layout_iterations,
        options.layout_seed,
    );
    let index = view.positions();
    let max_weight = view.max_weight();

    let mut canvas = RgbImage::from_pixel(width, height, Rgb(style::BACKGROUND));

    for link in &view.links {
        let (Some(&s), Some(&t)) = (index.get(&link.source), index.get(&link.target)) else {
            continue;
        };
        draw_line(
            &mut canvas,
            points[s],
            points[t],
            style::edge_width(link.weight, max_weight),
            style::EDGE,
            style::EDGE_OPACITY,
        );
    }

    for (node, point) in view.nodes.iter().zip(&points) {
        if node.starred {
            fill_disc(&mut canvas, *point, style::STARRED_RING_RADIUS, style::STARRED_RING, 1.0);
        }
        fill_disc(&mut canvas, *point, style::NODE_RADIUS + 0.5, style::NODE_OUTLINE, 1.0);
        fill_disc(
            &mut canvas,
            *point,
            style::NODE_RADIUS,
            style::group_color(&node.group),
            1.0,
        );
    }

    let mut data = Vec::new();
    canvas
        .write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
        .map_err(|err| GraphError::export(format!("couldnt encode png: {err}")))?;
    Ok(data)
}

fn blend(canvas: &mut RgbImage, x: i64, y: i64, color: style::Rgb, alpha: f64) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    for (channel, target) in pixel.0.iter_mut().zip(color) {
        let mixed = *channel as f64 * (1.0 - alpha) + target as f64 * alpha;
        *channel = mixed.round().clamp(0.0, 255.0) as u8;
    }
}

fn fill_disc(canvas: &mut RgbImage, center: Point, radius: f64, color: style::Rgb, alpha: f64) {
    let r2 = radius * radius;
    let (x0, x1) = ((center.x - radius).floor() as i64, (center.x + radius).ceil() as i64);
    let (y0, y1) = ((center.y - radius).floor() as i64, (center.y + radius).ceil() as i64);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f64 + 0.5 - center.x;
            let dy = y as f64 + 0.5 - center.y;
            if dx * dx + dy * dy <= r2 {
                blend(canvas, x, y, color, alpha);
            }
        }
    }
}

/// Thick line as the set of pixels within `width / 2` of the segment, each
/// touched once so translucent strokes blend evenly.
fn draw_line(canvas: &mut RgbImage, a: Point, b: Point, width: f64, color: style::Rgb, alpha: f64) {
    let half = (width / 2.0).max(0.5);
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx * dx + dy * dy;

    let x0 = (a.x.min(b.x) - half).floor() as i64;
    let x1 = (a.x.max(b.x) + half).ceil() as i64;
    let y0 = (a.y.min(b.y) - half).floor() as i64;
    let y1 = (a.y.max(b.y) + half).ceil() as i64;

    for y in y0..=y1 {
        for x in x0..=x1 {
            let px = x as f64 + 0.5;
            let py = y as f64 + 0.5;
            let t = if len2 > 0.0 {
                (((px - a.x) * dx + (py - a.y) * dy) / len2).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let (cx, cy) = (a.x + t * dx - px, a.y + t * dy - py);
            if cx * cx + cy * cy <= half * half {
                blend(canvas, x, y, color, alpha);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::export::interchange::{InterchangeEdge, InterchangeNode};

    fn view() -> Interchange {
        let node = |id: u64, starred: bool| InterchangeNode {
            id,
            title: String::new(),
            url: String::new(),
            tags: vec![],
            starred,
            group: "untagged".into(),
        };
        Interchange {
            nodes: vec![node(1, true), node(2, false)],
            links: vec![InterchangeEdge {
                source: 1,
                target: 2,
                weight: 2.0,
                domain: 2.0,
                tag: 0.0,
                direct_link: 0.0,
                indirect_link: 0.0,
            }],
        }
    }

    #[test]
    fn test_png_decodes_with_requested_size() {
        let options = ExportConfig {
            image_width: 120,
            image_height: 80,
            layout_iterations: 20,
            ..Default::default()
        };
        let data = render(&view(), &options).unwrap();

        let decoded = image::load_from_memory_with_format(&data, ImageFormat::Png).unwrap();
        assert_eq!(decoded.width(), 120);
        assert_eq!(decoded.height(), 80);

        // something other than background got drawn
        let rgb = decoded.to_rgb8();
        assert!(rgb.pixels().any(|p| p.0 != style::BACKGROUND));
    }

    #[test]
    fn test_fill_disc_clips_at_border() {
        let mut canvas = RgbImage::from_pixel(10, 10, Rgb([0, 0, 0]));
        fill_disc(&mut canvas, Point { x: 0.0, y: 0.0 }, 3.0, [255, 255, 255], 1.0);
        assert_eq!(canvas.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(canvas.get_pixel(9, 9).0, [0, 0, 0]);
    }

    #[test]
    fn test_line_blends_once_per_pixel() {
        let mut canvas = RgbImage::from_pixel(20, 5, Rgb([0, 0, 0]));
        draw_line(
            &mut canvas,
            Point { x: 0.0, y: 2.5 },
            Point { x: 20.0, y: 2.5 },
            1.0,
            [200, 200, 200],
            0.5,
        );
        assert_eq!(canvas.get_pixel(10, 2).0, [100, 100, 100]);
        assert_eq!(canvas.get_pixel(10, 0).0, [0, 0, 0]);
    }
}
