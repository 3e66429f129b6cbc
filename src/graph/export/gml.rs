use std::fmt::Write;

use crate::graph::export::interchange::Interchange;

pub fn render(view: &Interchange) -> String {
    let mut out = String::new();

    out.push_str("graph [\n");
    out.push_str("  directed 0\n");
    out.push_str("  label \"bookmarks\"\n");

    for node in &view.nodes {
        out.push_str("  node [\n");
        let _ = writeln!(out, "    id {}", node.id);
        let _ = writeln!(out, "    label \"{}\"", gml_escape(&node.title));
        let _ = writeln!(out, "    url \"{}\"", gml_escape(&node.url));
        let _ = writeln!(out, "    tags \"{}\"", gml_escape(&node.tags.join(",")));
        let _ = writeln!(out, "    starred {}", u8::from(node.starred));
        let _ = writeln!(out, "    group \"{}\"", gml_escape(&node.group));
        out.push_str("  ]\n");
    }

    for edge in &view.links {
        out.push_str("  edge [\n");
        let _ = writeln!(out, "    source {}", edge.source);
        let _ = writeln!(out, "    target {}", edge.target);
        let _ = writeln!(out, "    weight {}", gml_real(edge.weight));
        let _ = writeln!(out, "    domain {}", gml_real(edge.domain));
        let _ = writeln!(out, "    tag {}", gml_real(edge.tag));
        let _ = writeln!(out, "    direct_link {}", gml_real(edge.direct_link));
        let _ = writeln!(out, "    indirect_link {}", gml_real(edge.indirect_link));
        out.push_str("  ]\n");
    }

    out.push_str("]\n");
    out
}

/// GML strings cannot contain `"` and are ISO 8859-1, anything else goes
/// through HTML character entities.
fn gml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            c if c.is_ascii() && !c.is_ascii_control() => escaped.push(c),
            c if c.is_ascii_control() => escaped.push(' '),
            c => {
                let _ = write!(escaped, "&#{};", c as u32);
            }
        }
    }
    escaped
}

/// GML tells integers and reals apart by the decimal point.
fn gml_real(value: f64) -> String {
    let text = value.to_string();
    if text.contains(['.', 'e', 'E']) || !value.is_finite() {
        text
    } else {
        format!("{text}.0")
    }
}
