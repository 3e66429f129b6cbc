//! Graph export.
//!
//! Every format renders the same [`Interchange`] view of the graph, so node
//! and edge attributes stay identical across formats.

mod gexf;
mod gml;
mod graphml;
mod html;
mod interchange;
mod layout;
mod png;
mod style;
mod svg;

use std::{fmt::Display, path::Path, str::FromStr};

use crate::{
    config::ExportConfig,
    graph::{
        error::{GraphError, GraphResult},
        store::Graph,
    },
    storage,
};

pub use interchange::{primary_tag, Interchange, InterchangeEdge, InterchangeNode};
pub use layout::{force_directed, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Gexf,
    Graphml,
    Gml,
    Json,
    Html,
    Svg,
    Png,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 7] = [
        ExportFormat::Gexf,
        ExportFormat::Graphml,
        ExportFormat::Gml,
        ExportFormat::Json,
        ExportFormat::Html,
        ExportFormat::Svg,
        ExportFormat::Png,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Gexf => "gexf",
            ExportFormat::Graphml => "graphml",
            ExportFormat::Gml => "gml",
            ExportFormat::Json => "json",
            ExportFormat::Html => "html",
            ExportFormat::Svg => "svg",
            ExportFormat::Png => "png",
        }
    }

    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> GraphResult<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                GraphError::config(format!(
                    "cannot infer export format from {}, pass one explicitly",
                    path.display()
                ))
            })?;
        ext.parse()
    }
}

impl Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gexf" => Ok(ExportFormat::Gexf),
            "graphml" | "xml" => Ok(ExportFormat::Graphml),
            "gml" => Ok(ExportFormat::Gml),
            "json" | "d3" => Ok(ExportFormat::Json),
            "html" | "htm" => Ok(ExportFormat::Html),
            "svg" => Ok(ExportFormat::Svg),
            "png" => Ok(ExportFormat::Png),
            other => Err(GraphError::config(format!(
                "unknown export format {other:?}, expected one of: {}",
                ExportFormat::ALL.map(|f| f.extension()).join(", ")
            ))),
        }
    }
}

/// Render `graph` in memory. `min_weight` drops weaker edges; it can only
/// remove edges, never bring back ones pruned at build time.
pub fn render(
    graph: &Graph,
    format: ExportFormat,
    min_weight: Option<f64>,
    options: &ExportConfig,
) -> GraphResult<Vec<u8>> {
    options.validate()?;

    let filtered;
    let graph = match min_weight {
        Some(min) if min.is_nan() => {
            return Err(GraphError::config("export min_weight must be a number"));
        }
        Some(min) => {
            filtered = graph.filtered(min);
            &filtered
        }
        None => graph,
    };

    let view = Interchange::from_graph(graph);
    let data = match format {
        ExportFormat::Gexf => gexf::render(&view).into_bytes(),
        ExportFormat::Graphml => graphml::render(&view).into_bytes(),
        ExportFormat::Gml => gml::render(&view).into_bytes(),
        ExportFormat::Json => view.to_json()?,
        ExportFormat::Html => html::render(&view)?.into_bytes(),
        ExportFormat::Svg => svg::render(&view, options).into_bytes(),
        ExportFormat::Png => png::render(&view, options)?,
    };

    Ok(data)
}

/// Render `graph` and write it to `path` atomically.
pub fn export(
    graph: &Graph,
    format: ExportFormat,
    path: &Path,
    min_weight: Option<f64>,
    options: &ExportConfig,
) -> GraphResult<()> {
    let data = render(graph, format, min_weight, options)?;

    storage::write_atomic(path, &data)
        .map_err(|err| GraphError::export(format!("couldnt write {}: {err}", path.display())))?;

    log::info!(
        "exported graph as {format} to {} ({} bytes)",
        path.display(),
        data.len()
    );
    Ok(())
}

pub(crate) fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            // not representable in XML 1.0
            c if (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r') => {}
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{
        store::GraphNode,
        weight::{EdgeKey, EdgeWeight},
    };
    use tempfile::TempDir;

    fn sample() -> Graph {
        let node = |id: u64| GraphNode {
            id,
            title: format!("B{id}"),
            url: format!("https://x.com/{id}"),
            tags: vec!["rust".to_string()],
            starred: false,
        };
        Graph::new(
            [node(1), node(2), node(3)],
            [
                (
                    EdgeKey::new(1, 2).unwrap(),
                    EdgeWeight {
                        domain: 1.0,
                        ..Default::default()
                    },
                ),
                (
                    EdgeKey::new(2, 3).unwrap(),
                    EdgeWeight {
                        direct_link: 5.0,
                        ..Default::default()
                    },
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("GEXF".parse::<ExportFormat>().unwrap(), ExportFormat::Gexf);
        assert_eq!(" d3 ".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!(matches!(
            "dot".parse::<ExportFormat>(),
            Err(GraphError::Config(_))
        ));
        for format in ExportFormat::ALL {
            assert_eq!(format.extension().parse::<ExportFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ExportFormat::from_path(Path::new("/tmp/out.graphml")).unwrap(),
            ExportFormat::Graphml
        );
        assert!(ExportFormat::from_path(Path::new("/tmp/out")).is_err());
        assert!(ExportFormat::from_path(Path::new("/tmp/out.txt")).is_err());
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(
            xml_escape("a<b> & \"c\" 'd'\u{1}"),
            "a&lt;b&gt; &amp; &quot;c&quot; &apos;d&apos;"
        );
    }

    #[test]
    fn test_every_format_renders() {
        let graph = sample();
        let options = ExportConfig {
            layout_iterations: 20,
            image_width: 200,
            image_height: 150,
            ..Default::default()
        };
        for format in ExportFormat::ALL {
            let data = render(&graph, format, None, &options).unwrap();
            assert!(!data.is_empty(), "{format} produced nothing");
        }
    }

    #[test]
    fn test_min_weight_refilter_does_not_touch_graph() {
        let graph = sample();
        let data = render(&graph, ExportFormat::Json, Some(2.0), &ExportConfig::default()).unwrap();
        let view: Interchange = serde_json::from_slice(&data).unwrap();

        assert_eq!(view.nodes.len(), 3);
        assert_eq!(view.links.len(), 1);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_export_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph.gml");
        export(&sample(), ExportFormat::Gml, &path, None, &ExportConfig::default()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("graph ["));
    }

    #[test]
    fn test_export_to_unwritable_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("graph.json");
        let result = export(&sample(), ExportFormat::Json, &path, None, &ExportConfig::default());
        assert!(matches!(result, Err(GraphError::Export(_))));
    }
}
