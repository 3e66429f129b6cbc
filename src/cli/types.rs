use clap::Args as ClapArgs;

use crate::config::BuildConfig;

/// One-off overrides of the `graph` section of config.yaml.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Drop edges lighter than this
    #[clap(short = 'w', long)]
    pub min_weight: Option<f64>,

    /// Only use the N most recently added bookmarks
    #[clap(short = 'n', long)]
    pub max_bookmarks: Option<usize>,

    /// Weight of multi-hop links, 0 disables them
    #[clap(long)]
    pub indirect_weight: Option<f64>,

    /// How far to follow links for the indirect signal
    #[clap(long)]
    pub max_hops: Option<u32>,

    /// Worker threads, 0 for one per core
    #[clap(short = 'j', long)]
    pub workers: Option<usize>,
}

impl BuildArgs {
    pub fn apply(&self, config: &BuildConfig) -> BuildConfig {
        let mut config = config.clone();
        if let Some(min_weight) = self.min_weight {
            config.min_edge_weight = min_weight;
        }
        if let Some(max_bookmarks) = self.max_bookmarks {
            config.max_bookmarks = Some(max_bookmarks);
        }
        if let Some(weight) = self.indirect_weight {
            config.indirect_link_weight = weight;
        }
        if let Some(max_hops) = self.max_hops {
            config.max_hops = max_hops;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        config
    }
}
