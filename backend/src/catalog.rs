use std::{
    collections::HashSet,
    fs::File,
    io::{self, BufReader, Read},
    path::Path,
};

use shared::TrailRecord;

/// Dongguan trail set bundled with the binary.
pub const DEFAULT_TRAILS_JSON: &str = include_str!("../data/trails.json");

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read trail file: {0}")]
    Io(#[from] io::Error),
    #[error("invalid trail definition: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("trail id {0} appears more than once")]
    DuplicateId(u32),
}

/// Read-only set of trails served by the API, kept in file order.
#[derive(Debug, Clone, Default)]
pub struct TrailCatalog {
    trails: Vec<TrailRecord>,
}

impl TrailCatalog {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let trails: Vec<TrailRecord> = serde_json::from_reader(reader)?;
        Self::from_trails(trails)
    }

    pub fn from_trails(trails: Vec<TrailRecord>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(trails.len());
        for trail in &trails {
            if !seen.insert(trail.id) {
                return Err(CatalogError::DuplicateId(trail.id));
            }
        }

        for trail in &trails {
            if let Err(err) = trail.coordinate() {
                tracing::warn!(
                    trail_id = trail.id,
                    "trail {:?} will be left out of distance ranking: {err}",
                    trail.name
                );
            }
        }

        Ok(Self { trails })
    }

    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_reader(DEFAULT_TRAILS_JSON.as_bytes())
    }

    /// Loads `path` when given, the embedded trail set otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::embedded(),
        }
    }

    pub fn trails(&self) -> &[TrailRecord] {
        &self.trails
    }

    pub fn find(&self, id: u32) -> Option<&TrailRecord> {
        self.trails.iter().find(|trail| trail.id == id)
    }

    pub fn len(&self) -> usize {
        self.trails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trails.is_empty()
    }
}
