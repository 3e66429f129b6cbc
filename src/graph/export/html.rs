use crate::graph::{
    error::GraphResult,
    export::{interchange::Interchange, xml_escape},
};

const D3_URL: &str = "https://cdn.jsdelivr.net/npm/d3@7";

const TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{TITLE}}</title>
<style>
  html, body { margin: 0; height: 100%; font-family: sans-serif; background: #fff; }
  #graph { width: 100vw; height: 100vh; display: block; }
  #info { position: fixed; top: 8px; left: 8px; font-size: 12px; color: #555; }
  .tooltip { position: fixed; pointer-events: none; background: #222; color: #fff;
             padding: 4px 6px; border-radius: 3px; font-size: 12px; display: none; }
</style>
</head>
<body>
<div id="info">{{SUMMARY}}</div>
<div class="tooltip" id="tooltip"></div>
<svg id="graph"></svg>
<script type="application/json" id="graph-data">{{DATA}}</script>
<script src="{{D3}}"></script>
<script>
const data = JSON.parse(document.getElementById("graph-data").textContent);
const svg = d3.select("#graph");
const width = window.innerWidth, height = window.innerHeight;
const maxWeight = d3.max(data.links, d => d.weight) || 1;
const color = d3.scaleOrdinal(d3.schemeTableau10);
const tooltip = d3.select("#tooltip");

const root = svg.append("g");
svg.call(d3.zoom().scaleExtent([0.1, 8]).on("zoom", e => root.attr("transform", e.transform)));

const simulation = d3.forceSimulation(data.nodes)
  .force("link", d3.forceLink(data.links).id(d => d.id).strength(d => 0.1 + 0.9 * d.weight / maxWeight))
  .force("charge", d3.forceManyBody().strength(-40))
  .force("center", d3.forceCenter(width / 2, height / 2));

const link = root.append("g").attr("stroke", "#999").attr("stroke-opacity", 0.55)
  .selectAll("line").data(data.links).join("line")
  .attr("stroke-width", d => 0.5 + 3.5 * d.weight / maxWeight);

const node = root.append("g").selectAll("circle").data(data.nodes).join("circle")
  .attr("r", 5)
  .attr("fill", d => color(d.group))
  .attr("stroke", d => d.starred ? "#e6b414" : "#3c3c3c")
  .attr("stroke-width", d => d.starred ? 3 : 0.5)
  .on("mouseover", (e, d) => tooltip.style("display", "block").text(d.title || d.url))
  .on("mousemove", e => tooltip.style("left", (e.clientX + 12) + "px").style("top", (e.clientY + 12) + "px"))
  .on("mouseout", () => tooltip.style("display", "none"))
  .on("click", (e, d) => { if (d.url) window.open(d.url, "_blank"); })
  .call(d3.drag()
    .on("start", (e, d) => { if (!e.active) simulation.alphaTarget(0.3).restart(); d.fx = d.x; d.fy = d.y; })
    .on("drag", (e, d) => { d.fx = e.x; d.fy = e.y; })
    .on("end", (e, d) => { if (!e.active) simulation.alphaTarget(0); d.fx = null; d.fy = null; }));

simulation.on("tick", () => {
  link.attr("x1", d => d.source.x).attr("y1", d => d.source.y)
      .attr("x2", d => d.target.x).attr("y2", d => d.target.y);
  node.attr("cx", d => d.x).attr("cy", d => d.y);
});
</script>
</body>
</html>
"##;

/// Self-contained page with a d3-force view of the graph.
pub fn render(view: &Interchange) -> GraphResult<String> {
    let json = serde_json::to_string(view)?;
    // keep the json from closing its <script> element early
    let json = json.replace("</", "<\\/");

    let summary = format!(
        "{} bookmarks, {} edges",
        view.nodes.len(),
        view.links.len()
    );

    Ok(TEMPLATE
        .replace("{{TITLE}}", "Bookmark graph")
        .replace("{{SUMMARY}}", &xml_escape(&summary))
        .replace("{{D3}}", D3_URL)
        .replace("{{DATA}}", &json))
}
