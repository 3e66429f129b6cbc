use crate::{
    graph::GraphError,
    storage::{self, StorageManager},
};
use anyhow::Context;
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.yaml";

const DEFAULT_DOMAIN_WEIGHT: f64 = 1.0;
const DEFAULT_TAG_WEIGHT: f64 = 2.0;
const DEFAULT_DIRECT_LINK_WEIGHT: f64 = 5.0;
const DEFAULT_MAX_HOPS: u32 = 3;
/// Candidate pairs handed to a worker at once; cancellation is checked between chunks
const DEFAULT_CHUNK_SIZE: usize = 1024;
/// Leading path segments that still earn a domain bonus
const DEFAULT_MAX_PATH_SEGMENTS: usize = 5;

const MIN_IMAGE_SIDE: u32 = 64;
/// Largest side an export image may have; bigger canvases cannot be allocated
const MAX_IMAGE_SIDE: u32 = 16_384;
const DEFAULT_IMAGE_WIDTH: u32 = 1600;
const DEFAULT_IMAGE_HEIGHT: u32 = 1200;
const DEFAULT_LAYOUT_ITERATIONS: u32 = 300;
const DEFAULT_LAYOUT_SEED: u64 = 42;

/// Weights and limits used when building the similarity graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "default_domain_weight")]
    pub domain_weight: f64,

    #[serde(default = "default_tag_weight")]
    pub tag_weight: f64,

    #[serde(default = "default_direct_link_weight")]
    pub direct_link_weight: f64,

    /// Multi-hop link signal, disabled while 0.0
    #[serde(default)]
    pub indirect_link_weight: f64,

    /// Edges with a lower total are never stored
    #[serde(default)]
    pub min_edge_weight: f64,

    /// Depth bound for the indirect link search
    #[serde(default = "default_max_hops")]
    pub max_hops: u32,

    /// Keep only the N most recently added bookmarks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bookmarks: Option<usize>,

    /// Worker threads for weight computation, 0 means one per core
    #[serde(default)]
    pub workers: usize,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Domain/tag buckets larger than this are paired with a sliding window
    /// instead of every member against every other member.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bucket_size: Option<usize>,

    #[serde(default = "default_max_path_segments")]
    pub max_path_segments: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            domain_weight: DEFAULT_DOMAIN_WEIGHT,
            tag_weight: DEFAULT_TAG_WEIGHT,
            direct_link_weight: DEFAULT_DIRECT_LINK_WEIGHT,
            indirect_link_weight: 0.0,
            min_edge_weight: 0.0,
            max_hops: DEFAULT_MAX_HOPS,
            max_bookmarks: None,
            workers: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_bucket_size: None,
            max_path_segments: DEFAULT_MAX_PATH_SEGMENTS,
        }
    }
}

fn default_domain_weight() -> f64 {
    DEFAULT_DOMAIN_WEIGHT
}

fn default_tag_weight() -> f64 {
    DEFAULT_TAG_WEIGHT
}

fn default_direct_link_weight() -> f64 {
    DEFAULT_DIRECT_LINK_WEIGHT
}

fn default_max_hops() -> u32 {
    DEFAULT_MAX_HOPS
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_max_path_segments() -> usize {
    DEFAULT_MAX_PATH_SEGMENTS
}

impl BuildConfig {
    pub fn validate(&self) -> Result<(), GraphError> {
        let weights = [
            ("domain_weight", self.domain_weight),
            ("tag_weight", self.tag_weight),
            ("direct_link_weight", self.direct_link_weight),
            ("indirect_link_weight", self.indirect_link_weight),
            ("min_edge_weight", self.min_edge_weight),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(GraphError::config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        if self.max_hops < 1 {
            return Err(GraphError::config("max_hops must be at least 1"));
        }

        if self.chunk_size == 0 {
            return Err(GraphError::config("chunk_size must be greater than 0"));
        }

        if self.max_bookmarks == Some(0) {
            return Err(GraphError::config("max_bookmarks must be greater than 0"));
        }

        if let Some(cap) = self.max_bucket_size {
            if cap < 2 {
                return Err(GraphError::config(format!(
                    "max_bucket_size must be at least 2, got {cap}"
                )));
            }
        }

        Ok(())
    }

    pub fn indirect_enabled(&self) -> bool {
        self.indirect_link_weight > 0.0
    }
}

/// Rendering options for image and html exports.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_image_width")]
    pub image_width: u32,

    #[serde(default = "default_image_height")]
    pub image_height: u32,

    /// Force-directed layout iterations for svg/png output
    #[serde(default = "default_layout_iterations")]
    pub layout_iterations: u32,

    /// Seed for initial node placement, keeps images reproducible
    #[serde(default = "default_layout_seed")]
    pub layout_seed: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            image_width: DEFAULT_IMAGE_WIDTH,
            image_height: DEFAULT_IMAGE_HEIGHT,
            layout_iterations: DEFAULT_LAYOUT_ITERATIONS,
            layout_seed: DEFAULT_LAYOUT_SEED,
        }
    }
}

fn default_image_width() -> u32 {
    DEFAULT_IMAGE_WIDTH
}

fn default_image_height() -> u32 {
    DEFAULT_IMAGE_HEIGHT
}

fn default_layout_iterations() -> u32 {
    DEFAULT_LAYOUT_ITERATIONS
}

fn default_layout_seed() -> u64 {
    DEFAULT_LAYOUT_SEED
}

impl ExportConfig {
    pub fn validate(&self) -> Result<(), GraphError> {
        let sides = MIN_IMAGE_SIDE..=MAX_IMAGE_SIDE;
        if !sides.contains(&self.image_width) || !sides.contains(&self.image_height) {
            return Err(GraphError::config(format!(
                "export image sides must be between {MIN_IMAGE_SIDE} and {MAX_IMAGE_SIDE}, got {}x{}",
                self.image_width, self.image_height
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub graph: BuildConfig,
    #[serde(default)]
    pub export: ExportConfig,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: String,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.graph.validate().context("graph section of config.yaml")?;
        self.export
            .validate()
            .context("export section of config.yaml")?;
        Ok(())
    }

    pub fn load_with(base_path: &str) -> anyhow::Result<Self> {
        let store = storage::BackendLocal::new(base_path)?;

        // create new if does not exist
        if !store.exists(CONFIG_FILE) {
            store.write(
                CONFIG_FILE,
                serde_yml::to_string(&Self::default())?.as_bytes(),
            )?;
        }

        let config_str = String::from_utf8(store.read(CONFIG_FILE)?)
            .context("config file is not valid utf8")?;
        let mut config: Self = serde_yml::from_str(&config_str).context("config is malformed")?;

        config.base_path = base_path.to_string();

        config.validate()?;

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config)? {
            config.save()?;
        }

        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let store = storage::BackendLocal::new(&self.base_path)?;

        let config_str = serde_yml::to_string(&self)?;
        store.write(CONFIG_FILE, config_str.as_bytes())?;
        Ok(())
    }
}
