use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use geojson::GeoJson;

use crate::error::MapDataError;

/// Country boundaries for the choropleth; optional, the map falls back to
/// capital markers without it.
pub const BOUNDARIES_FILE: &str = "asean.geojson";

/// Local data directory.
pub struct DataDir {
    base: PathBuf,
}

impl DataDir {
    pub fn new<P: AsRef<Path>>(base: P) -> Self {
        Self { base: base.as_ref().to_path_buf() }
    }

    pub fn boundaries_path(&self) -> PathBuf {
        self.base.join(BOUNDARIES_FILE)
    }

    /// `Ok(None)` when the file simply isn't there.
    pub fn load_boundaries(&self) -> Result<Option<GeoJson>, MapDataError> {
        let path = self.boundaries_path();
        if !path.exists() {
            return Ok(None);
        }
        let txt = fs::read_to_string(&path).map_err(|source| MapDataError::Io { path, source })?;
        Ok(Some(GeoJson::from_str(&txt)?))
    }
}
