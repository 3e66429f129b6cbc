use std::fmt::Write;

use crate::graph::export::{interchange::Interchange, xml_escape};

const NODE_ATTRIBUTES: [(&str, &str); 4] = [
    ("url", "string"),
    ("tags", "string"),
    ("starred", "boolean"),
    ("group", "string"),
];

const EDGE_ATTRIBUTES: [&str; 4] = ["domain", "tag", "direct_link", "indirect_link"];

/// GEXF 1.3, readable by Gephi.
pub fn render(view: &Interchange) -> String {
    let mut out = String::new();
    let today = chrono::Local::now().format("%Y-%m-%d");

    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<gexf xmlns=\"http://gexf.net/1.3\" version=\"1.3\">\n");
    let _ = writeln!(out, "  <meta lastmodifieddate=\"{today}\">");
    let _ = writeln!(out, "    <creator>bb-graph {}</creator>", env!("CARGO_PKG_VERSION"));
    out.push_str("    <description>Bookmark similarity graph</description>\n");
    out.push_str("  </meta>\n");
    out.push_str("  <graph mode=\"static\" defaultedgetype=\"undirected\">\n");

    out.push_str("    <attributes class=\"node\">\n");
    for (idx, (title, kind)) in NODE_ATTRIBUTES.iter().enumerate() {
        let _ = writeln!(
            out,
            "      <attribute id=\"{idx}\" title=\"{title}\" type=\"{kind}\"/>"
        );
    }
    out.push_str("    </attributes>\n");

    out.push_str("    <attributes class=\"edge\">\n");
    for (idx, title) in EDGE_ATTRIBUTES.iter().enumerate() {
        let _ = writeln!(
            out,
            "      <attribute id=\"{idx}\" title=\"{title}\" type=\"double\"/>"
        );
    }
    out.push_str("    </attributes>\n");

    out.push_str("    <nodes>\n");
    for node in &view.nodes {
        let values = [
            xml_escape(&node.url),
            xml_escape(&node.tags.join(",")),
            node.starred.to_string(),
            xml_escape(&node.group),
        ];
        let _ = writeln!(
            out,
            "      <node id=\"{}\" label=\"{}\">",
            node.id,
            xml_escape(&node.title)
        );
        out.push_str("        <attvalues>\n");
        for (idx, value) in values.iter().enumerate() {
            let _ = writeln!(out, "          <attvalue for=\"{idx}\" value=\"{value}\"/>");
        }
        out.push_str("        </attvalues>\n");
        out.push_str("      </node>\n");
    }
    out.push_str("    </nodes>\n");

    out.push_str("    <edges>\n");
    for (idx, edge) in view.links.iter().enumerate() {
        let _ = writeln!(
            out,
            "      <edge id=\"{idx}\" source=\"{}\" target=\"{}\" weight=\"{}\">",
            edge.source, edge.target, edge.weight
        );
        out.push_str("        <attvalues>\n");
        let values = [edge.domain, edge.tag, edge.direct_link, edge.indirect_link];
        for (slot, value) in values.iter().enumerate() {
            let _ = writeln!(out, "          <attvalue for=\"{slot}\" value=\"{value}\"/>");
        }
        out.push_str("        </attvalues>\n");
        out.push_str("      </edge>\n");
    }
    out.push_str("    </edges>\n");

    out.push_str("  </graph>\n");
    out.push_str("</gexf>\n");
    out
}
