//! Colours and sizes shared by the svg and png renderers.

pub type Rgb = [u8; 3];

pub const BACKGROUND: Rgb = [255, 255, 255];
pub const EDGE: Rgb = [150, 150, 150];
pub const STARRED_RING: Rgb = [230, 180, 20];
pub const NODE_OUTLINE: Rgb = [60, 60, 60];

pub const NODE_RADIUS: f64 = 5.0;
pub const STARRED_RING_RADIUS: f64 = 8.0;
pub const EDGE_OPACITY: f64 = 0.55;
pub const MIN_EDGE_WIDTH: f64 = 0.5;
pub const MAX_EDGE_WIDTH: f64 = 4.0;

// tableau 10
const PALETTE: [Rgb; 10] = [
    [78, 121, 167],
    [242, 142, 43],
    [225, 87, 89],
    [118, 183, 178],
    [89, 161, 79],
    [237, 201, 72],
    [176, 122, 161],
    [255, 157, 167],
    [156, 117, 95],
    [186, 176, 172],
];

/// Stable colour for a tag group, the same in every export.
pub fn group_color(group: &str) -> Rgb {
    let hash = crc32fast::hash(group.as_bytes());
    PALETTE[hash as usize % PALETTE.len()]
}

/// Stroke width scaled linearly by weight relative to the strongest edge.
pub fn edge_width(weight: f64, max_weight: f64) -> f64 {
    if max_weight <= 0.0 {
        return MIN_EDGE_WIDTH;
    }
    let ratio = (weight / max_weight).clamp(0.0, 1.0);
    MIN_EDGE_WIDTH + ratio * (MAX_EDGE_WIDTH - MIN_EDGE_WIDTH)
}

pub fn hex(color: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", color[0], color[1], color[2])
}
