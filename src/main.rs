use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
mod bookmarks;
mod cli;
mod config;
mod graph;
mod lock;
mod storage;
#[cfg(test)]
mod tests;

use app::AppFactory;

pub fn parse_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .flat_map(|value| value.split([' ', '\u{a0}']).filter(|value| !value.is_empty()))
        .map(|s| s.to_lowercase())
        .collect::<Vec<_>>()
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();

    #[cfg(feature = "markdown-docs")]
    if let cli::Command::MarkdownDocs {} = args.command {
        clap_markdown::print_help_markdown::<cli::Args>();
        return Ok(());
    }

    let paths = AppFactory::get_paths(args.bookmarks)?;
    let service = AppFactory::create_service(&paths)?;

    cli::handle(args.command, &service)
}
