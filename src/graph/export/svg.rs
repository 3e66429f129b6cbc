use std::fmt::Write;

use crate::{
    config::ExportConfig,
    graph::export::{
        interchange::Interchange,
        layout::force_directed,
        style::{self, hex},
        xml_escape,
    },
};

/// Legend entries past this are dropped, the colours repeat anyway.
const LEGEND_LIMIT: usize = 10;

pub fn render(view: &Interchange, options: &ExportConfig) -> String {
    let (width, height) = (options.image_width as f64, options.image_height as f64);
    let points = force_directed(
        view,
        width,
        height,
        options.layout_iterations,
        options.layout_seed,
    );
    let index = view.positions();
    let max_weight = view.max_weight();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
        w = options.image_width,
        h = options.image_height
    );
    let _ = writeln!(
        out,
        "  <rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        hex(style::BACKGROUND)
    );

    let _ = writeln!(
        out,
        "  <g class=\"edges\" stroke=\"{}\" stroke-opacity=\"{}\">",
        hex(style::EDGE),
        style::EDGE_OPACITY
    );
    for link in &view.links {
        let (Some(&s), Some(&t)) = (index.get(&link.source), index.get(&link.target)) else {
            continue;
        };
        let _ = writeln!(
            out,
            "    <line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke-width=\"{:.2}\"/>",
            points[s].x,
            points[s].y,
            points[t].x,
            points[t].y,
            style::edge_width(link.weight, max_weight)
        );
    }
    out.push_str("  </g>\n");

    let _ = writeln!(
        out,
        "  <g class=\"nodes\" stroke=\"{}\" stroke-width=\"0.5\">",
        hex(style::NODE_OUTLINE)
    );
    for (node, point) in view.nodes.iter().zip(&points) {
        out.push_str("    <g>\n");
        let _ = writeln!(
            out,
            "      <title>{}</title>",
            xml_escape(if node.title.is_empty() {
                &node.url
            } else {
                &node.title
            })
        );
        if node.starred {
            let _ = writeln!(
                out,
                "      <circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"/>",
                point.x,
                point.y,
                style::STARRED_RING_RADIUS,
                hex(style::STARRED_RING)
            );
        }
        let _ = writeln!(
            out,
            "      <circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{}\" fill=\"{}\"/>",
            point.x,
            point.y,
            style::NODE_RADIUS,
            hex(style::group_color(&node.group))
        );
        out.push_str("    </g>\n");
    }
    out.push_str("  </g>\n");

    render_legend(&mut out, view);

    out.push_str("</svg>\n");
    out
}

/// Most common groups first.
fn render_legend(out: &mut String, view: &Interchange) {
    let mut counts: std::collections::BTreeMap<&str, usize> = Default::default();
    for node in &view.nodes {
        *counts.entry(node.group.as_str()).or_default() += 1;
    }
    let mut groups: Vec<(&str, usize)> = counts.into_iter().collect();
    groups.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    if groups.is_empty() {
        return;
    }

    out.push_str("  <g class=\"legend\" font-family=\"sans-serif\" font-size=\"12\">\n");
    for (row, (group, count)) in groups.iter().take(LEGEND_LIMIT).enumerate() {
        let y = 16.0 + row as f64 * 16.0;
        let _ = writeln!(
            out,
            "    <circle cx=\"12\" cy=\"{y}\" r=\"5\" fill=\"{}\"/>",
            hex(style::group_color(group))
        );
        let _ = writeln!(
            out,
            "    <text x=\"22\" y=\"{}\">{} ({count})</text>",
            y + 4.0,
            xml_escape(group)
        );
    }
    out.push_str("  </g>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::export::interchange::{InterchangeEdge, InterchangeNode};

    fn view() -> Interchange {
        let node = |id: u64, group: &str, starred: bool| InterchangeNode {
            id,
            title: format!("<{id}>"),
            url: String::new(),
            tags: vec![group.to_string()],
            starred,
            group: group.to_string(),
        };
        let edge = |source, target, weight| InterchangeEdge {
            source,
            target,
            weight,
            domain: weight,
            tag: 0.0,
            direct_link: 0.0,
            indirect_link: 0.0,
        };
        Interchange {
            nodes: vec![node(1, "rust", true), node(2, "rust", false), node(3, "go", false)],
            links: vec![edge(1, 2, 4.0), edge(2, 3, 1.0)],
        }
    }

    fn options() -> ExportConfig {
        ExportConfig {
            image_width: 300,
            image_height: 200,
            layout_iterations: 30,
            ..Default::default()
        }
    }

    #[test]
    fn test_svg_elements() {
        let doc = render(&view(), &options());
        assert!(doc.starts_with("<svg "));
        assert!(doc.contains("viewBox=\"0 0 300 200\""));
        assert_eq!(doc.matches("<line ").count(), 2);
        assert!(doc.contains("<title>&lt;1&gt;</title>"));
        // one ring for the single starred bookmark
        assert_eq!(doc.matches(&hex(style::STARRED_RING)).count(), 1);
        assert!(doc.contains("rust (2)"));
        assert!(doc.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_stronger_edge_is_wider() {
        let doc = render(&view(), &options());
        let widths: Vec<f64> = doc
            .lines()
            .filter(|line| line.contains("<line "))
            .filter_map(|line| line.split("stroke-width=\"").nth(1))
            .filter_map(|rest| rest.split('"').next())
            .map(|w| w.parse().unwrap())
            .collect();
        assert_eq!(widths.len(), 2);
        assert!(widths[0] > widths[1]);
    }

    #[test]
    fn test_svg_is_reproducible() {
        assert_eq!(render(&view(), &options()), render(&view(), &options()));
    }
}
