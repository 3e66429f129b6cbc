use std::fmt::Write;

use crate::graph::export::{interchange::Interchange, xml_escape};

const NODE_KEYS: [(&str, &str); 5] = [
    ("title", "string"),
    ("url", "string"),
    ("tags", "string"),
    ("starred", "boolean"),
    ("group", "string"),
];

const EDGE_KEYS: [&str; 5] = ["weight", "domain", "tag", "direct_link", "indirect_link"];

pub fn render(view: &Interchange) -> String {
    let mut out = String::new();

    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\">\n");
    for (name, kind) in NODE_KEYS {
        let _ = writeln!(
            out,
            "  <key id=\"{name}\" for=\"node\" attr.name=\"{name}\" attr.type=\"{kind}\"/>"
        );
    }
    for name in EDGE_KEYS {
        let _ = writeln!(
            out,
            "  <key id=\"{name}\" for=\"edge\" attr.name=\"{name}\" attr.type=\"double\"/>"
        );
    }
    out.push_str("  <graph id=\"bookmarks\" edgedefault=\"undirected\">\n");

    for node in &view.nodes {
        let _ = writeln!(out, "    <node id=\"n{}\">", node.id);
        let values = [
            xml_escape(&node.title),
            xml_escape(&node.url),
            xml_escape(&node.tags.join(",")),
            node.starred.to_string(),
            xml_escape(&node.group),
        ];
        for ((key, _), value) in NODE_KEYS.iter().zip(values) {
            let _ = writeln!(out, "      <data key=\"{key}\">{value}</data>");
        }
        out.push_str("    </node>\n");
    }

    for (idx, edge) in view.links.iter().enumerate() {
        let _ = writeln!(
            out,
            "    <edge id=\"e{idx}\" source=\"n{}\" target=\"n{}\">",
            edge.source, edge.target
        );
        let values = [
            edge.weight,
            edge.domain,
            edge.tag,
            edge.direct_link,
            edge.indirect_link,
        ];
        for (key, value) in EDGE_KEYS.iter().zip(values) {
            let _ = writeln!(out, "      <data key=\"{key}\">{value}</data>");
        }
        out.push_str("    </edge>\n");
    }

    out.push_str("  </graph>\n");
    out.push_str("</graphml>\n");
    out
}
