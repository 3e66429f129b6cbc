//! Fruchterman-Reingold force-directed placement.
//!
//! Initial positions come from a seeded rng, so the same graph and seed always
//! produce the same picture.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::graph::export::interchange::Interchange;

/// Upper bound on repulsion pair evaluations for a whole layout run. Large
/// graphs get fewer iterations instead of an unbounded render time.
const PAIR_BUDGET: u64 = 200_000_000;
const MIN_ITERATIONS: u32 = 10;
const GRAVITY: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// One position per entry of `view.nodes`, inside a `width` x `height` frame
/// with a small margin.
pub fn force_directed(
    view: &Interchange,
    width: f64,
    height: f64,
    iterations: u32,
    seed: u64,
) -> Vec<Point> {
    let n = view.nodes.len();
    let margin = (width.min(height) * 0.05).max(10.0);
    let (left, top) = (margin, margin);
    let (right, bottom) = ((width - margin).max(left), (height - margin).max(top));
    let center = Point {
        x: (left + right) / 2.0,
        y: (top + bottom) / 2.0,
    };

    if n == 0 {
        return vec![];
    }
    if n == 1 {
        return vec![center];
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut positions: Vec<Point> = (0..n)
        .map(|_| Point {
            x: rng.random_range(left..=right),
            y: rng.random_range(top..=bottom),
        })
        .collect();

    let index = view.positions();
    let max_weight = view.max_weight();
    let springs: Vec<(usize, usize, f64)> = view
        .links
        .iter()
        .filter_map(|link| {
            let s = *index.get(&link.source)?;
            let t = *index.get(&link.target)?;
            let strength = if max_weight > 0.0 {
                0.2 + 0.8 * (link.weight / max_weight)
            } else {
                1.0
            };
            Some((s, t, strength))
        })
        .collect();

    let area = (right - left).max(1.0) * (bottom - top).max(1.0);
    let k = (area / n as f64).sqrt();

    let pairs_per_round = (n as u64 * (n as u64 - 1)) / 2;
    let affordable = (PAIR_BUDGET / pairs_per_round.max(1)).min(u32::MAX as u64) as u32;
    let rounds = iterations.min(affordable.max(MIN_ITERATIONS));
    if rounds < iterations {
        log::debug!("layout of {n} nodes limited to {rounds} of {iterations} iterations");
    }

    let start_temperature = (right - left).max(bottom - top) / 10.0;
    let mut displacement = vec![(0.0f64, 0.0f64); n];

    for round in 0..rounds {
        let temperature = start_temperature * (1.0 - round as f64 / rounds as f64);
        displacement.iter_mut().for_each(|d| *d = (0.0, 0.0));

        for i in 0..n {
            for j in (i + 1)..n {
                let dx = positions[i].x - positions[j].x;
                let dy = positions[i].y - positions[j].y;
                let dist = (dx * dx + dy * dy).sqrt().max(0.01);
                let force = k * k / dist;
                let (fx, fy) = (dx / dist * force, dy / dist * force);
                displacement[i].0 += fx;
                displacement[i].1 += fy;
                displacement[j].0 -= fx;
                displacement[j].1 -= fy;
            }
        }

        for &(s, t, strength) in &springs {
            let dx = positions[s].x - positions[t].x;
            let dy = positions[s].y - positions[t].y;
            let dist = (dx * dx + dy * dy).sqrt().max(0.01);
            let force = dist * dist / k * strength;
            let (fx, fy) = (dx / dist * force, dy / dist * force);
            displacement[s].0 -= fx;
            displacement[s].1 -= fy;
            displacement[t].0 += fx;
            displacement[t].1 += fy;
        }

        for (point, (dx, dy)) in positions.iter_mut().zip(&displacement) {
            // pull everything gently toward the middle so isolated nodes stay in frame
            let dx = dx + (center.x - point.x) * GRAVITY;
            let dy = dy + (center.y - point.y) * GRAVITY;
            let len = (dx * dx + dy * dy).sqrt();
            if len > 0.0 {
                let step = len.min(temperature);
                point.x = (point.x + dx / len * step).clamp(left, right);
                point.y = (point.y + dy / len * step).clamp(top, bottom);
            }
        }
    }

    positions
}
