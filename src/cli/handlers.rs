use crate::{
    app::GraphService,
    cli::{types::BuildArgs, Command},
    graph::{export::ExportFormat, CancelToken, EdgeWeight},
};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::Path;

/// Neighbor row as printed, with enough of the bookmark to recognise it.
#[derive(Debug, Serialize)]
pub struct NeighborRow {
    pub id: u64,
    pub title: String,
    pub url: String,
    pub total: f64,
    pub weight: EdgeWeight,
}

pub fn handle(command: Command, service: &GraphService) -> Result<()> {
    match command {
        Command::Build { build_args } => handle_build(&build_args, service),
        Command::Neighbors {
            id,
            limit,
            min_weight,
        } => handle_neighbors(id, limit, min_weight, service),
        Command::Stats {} => handle_stats(service),
        Command::Export {
            path,
            format,
            min_weight,
        } => handle_export(&path, format.as_deref(), min_weight, service),
        #[cfg(feature = "markdown-docs")]
        Command::MarkdownDocs {} => Ok(()),
    }
}

pub fn handle_build(build_args: &BuildArgs, service: &GraphService) -> Result<()> {
    let build_config = build_args.apply(&service.config().graph);
    let _span = tracing::info_span!("build", workers = build_config.workers as u64).entered();

    let cancel = CancelToken::new();
    let trip = cancel.clone();
    ctrlc::set_handler(move || {
        log::warn!("cancelling graph build");
        trip.cancel();
    })
    .context("Failed to set Ctrl+C handler")?;

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} pairs, {msg}")
            .context("invalid progress template")?
            .progress_chars("=>-"),
    );

    let result = service.build(&build_config, cancel, |progress| {
        bar.set_length(progress.total as u64);
        bar.set_position(progress.processed as u64);
        bar.set_message(format!("{} edges", progress.edges));
    });
    bar.finish_and_clear();

    let graph = result?;
    println!("{}", serde_json::to_string_pretty(&graph.stats())?);
    Ok(())
}

pub fn handle_neighbors(
    id: u64,
    limit: Option<usize>,
    min_weight: Option<f64>,
    service: &GraphService,
) -> Result<()> {
    let graph = service.graph()?;
    let rows: Vec<NeighborRow> = service
        .neighbors(id, limit, min_weight)?
        .into_iter()
        .map(|neighbor| {
            let node = graph.node(neighbor.id);
            NeighborRow {
                id: neighbor.id,
                title: node.map(|n| n.title.clone()).unwrap_or_default(),
                url: node.map(|n| n.url.clone()).unwrap_or_default(),
                total: neighbor.total,
                weight: neighbor.weight,
            }
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

pub fn handle_stats(service: &GraphService) -> Result<()> {
    let stats = service.stats()?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

pub fn handle_export(
    path: &Path,
    format: Option<&str>,
    min_weight: Option<f64>,
    service: &GraphService,
) -> Result<()> {
    let format = match format {
        Some(name) => name.parse::<ExportFormat>()?,
        None => ExportFormat::from_path(path)?,
    };

    let _span = tracing::info_span!("export", %format).entered();
    service.export(path, format, min_weight)?;
    println!("graph exported to {}", path.display());
    Ok(())
}
