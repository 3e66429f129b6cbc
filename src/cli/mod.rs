use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod handlers;
mod types;

pub use handlers::*;
pub use types::*;

#[derive(Parser, Debug)]
#[command(version, about = "Similarity graph over your bb bookmarks", long_about = None)]
pub struct Args {
    /// Read bookmarks from this csv instead of the bb database
    #[clap(long, global = true)]
    pub bookmarks: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate api docs in markdown format
    #[cfg(feature = "markdown-docs")]
    #[clap(hide = true)]
    MarkdownDocs {},

    /// Build the graph from all bookmarks and save it.
    /// Ctrl-C cancels without touching the previous graph.
    Build {
        #[clap(flatten)]
        build_args: BuildArgs,
    },

    /// Most related bookmarks, strongest first
    Neighbors {
        /// Bookmark id
        id: u64,

        /// How many neighbors to print
        #[clap(short, long)]
        limit: Option<usize>,

        /// Ignore edges lighter than this
        #[clap(short = 'w', long)]
        min_weight: Option<f64>,
    },

    /// Print graph statistics
    Stats {},

    /// Write the graph to a file
    Export {
        /// Output file
        path: PathBuf,

        /// gexf, graphml, gml, json, html, svg or png.
        /// Guessed from the file extension when omitted.
        #[clap(short, long)]
        format: Option<String>,

        /// Drop edges lighter than this from the output
        #[clap(short = 'w', long)]
        min_weight: Option<f64>,
    },
}
