//! Run parameters and the species → Bowtie2 index registry.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::libs::error::{DesignError, Result};
use crate::libs::probe::Channel;

/// Everything one design run needs, defaults matching the assay protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignParams {
    pub tile_size: usize,
    pub tile_step: usize,
    pub max_run_length: usize,
    pub max_run_mismatches: usize,
    /// Hairpins melting above this are rejected, °C
    pub max_hairpin_tm: f64,
    /// Genome alignments a tile may have
    pub max_hits: usize,
    pub min_gc: f64,
    pub max_gc: f64,
    /// kcal/mol
    pub min_gibbs: f64,
    pub max_gibbs: f64,
    pub target_gibbs: f64,
    /// Reject tiles whose halves differ by more than `dtm_max`
    pub dtm_filter: bool,
    pub dtm_max: f64,
    pub max_probes: usize,
    pub channel: Channel,
}

impl Default for DesignParams {
    fn default() -> Self {
        Self {
            tile_size: 52,
            tile_step: 1,
            max_run_length: 7,
            max_run_mismatches: 2,
            max_hairpin_tm: 45.0,
            max_hits: 1,
            min_gc: 45.0,
            max_gc: 55.0,
            min_gibbs: -70.0,
            max_gibbs: -50.0,
            target_gibbs: -60.0,
            dtm_filter: false,
            dtm_max: 5.0,
            max_probes: 20,
            channel: Channel::B1,
        }
    }
}

/// Shortest tile whose halves still have two bases each
pub const MIN_TILE_SIZE: usize = 6;

impl DesignParams {
    pub fn validate(&self) -> Result<()> {
        if self.tile_size < MIN_TILE_SIZE {
            return Err(DesignError::Configuration(format!(
                "tile size {} is below {}, halves would be too short",
                self.tile_size, MIN_TILE_SIZE
            )));
        }
        if self.tile_step == 0 {
            return Err(DesignError::Configuration(
                "tile step must be at least 1".to_string(),
            ));
        }
        if self.min_gc > self.max_gc {
            return Err(DesignError::Configuration(format!(
                "min GC {} exceeds max GC {}",
                self.min_gc, self.max_gc
            )));
        }
        if self.min_gibbs > self.max_gibbs {
            return Err(DesignError::Configuration(format!(
                "min Gibbs {} exceeds max Gibbs {}",
                self.min_gibbs, self.max_gibbs
            )));
        }
        if self.dtm_max < 0.0 {
            return Err(DesignError::Configuration(format!(
                "dTm max {} is negative",
                self.dtm_max
            )));
        }
        Ok(())
    }
}

/// How to reach the genome index for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenomeMaskConfig {
    /// Bowtie2 index prefix
    pub index: PathBuf,
    pub n_alignments: usize,
    pub timeout: Option<Duration>,
}

impl GenomeMaskConfig {
    pub fn new(index: impl Into<PathBuf>) -> Self {
        Self {
            index: index.into(),
            n_alignments: 3,
            timeout: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesEntry {
    pub bowtie2_index: String,
}

/// JSON document mapping species names to index prefixes.
///
/// ```json
/// {"species": {"mouse": {"bowtie2_index": "indices/mouse/mouse"}}}
/// ```
///
/// Relative prefixes are taken relative to the registry file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeciesRegistry {
    #[serde(default)]
    pub species: BTreeMap<String, SpeciesEntry>,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl SpeciesRegistry {
    /// A missing file is an empty registry.
    pub fn load(path: &Path) -> Result<Self> {
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        if !path.is_file() {
            return Ok(Self {
                base_dir,
                ..Default::default()
            });
        }

        let text = std::fs::read_to_string(path).map_err(|e| DesignError::io(e, path))?;
        let mut registry: SpeciesRegistry = serde_json::from_str(&text).map_err(|e| {
            DesignError::Configuration(format!("cannot parse {}: {}", path.display(), e))
        })?;
        registry.base_dir = base_dir;
        Ok(registry)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir).map_err(|e| DesignError::io(e, dir))?;
            }
        }
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| DesignError::Configuration(e.to_string()))?;
        std::fs::write(path, text + "\n").map_err(|e| DesignError::io(e, path))
    }

    /// Absolute or registry-relative index prefix of `species`.
    pub fn resolve_index(&self, species: &str) -> Result<PathBuf> {
        let entry = self.species.get(species).ok_or_else(|| {
            let known: Vec<&str> = self.species.keys().map(String::as_str).collect();
            DesignError::Configuration(format!(
                "species '{}' is not registered (known: {})",
                species,
                if known.is_empty() {
                    "none".to_string()
                } else {
                    known.join(", ")
                }
            ))
        })?;

        let index = Path::new(&entry.bowtie2_index);
        if index.is_absolute() {
            Ok(index.to_path_buf())
        } else {
            Ok(self.base_dir.join(index))
        }
    }

    pub fn register(&mut self, species: &str, index: &Path, force: bool) -> Result<()> {
        if self.species.contains_key(species) && !force {
            return Err(DesignError::Configuration(format!(
                "species '{}' already registered, use --force to replace",
                species
            )));
        }

        // keep prefixes below the registry directory relative
        let stored = match index.strip_prefix(&self.base_dir) {
            Ok(rel) if !self.base_dir.as_os_str().is_empty() => rel.to_path_buf(),
            _ => index.to_path_buf(),
        };
        self.species.insert(
            species.to_string(),
            SpeciesEntry {
                bowtie2_index: stored.to_string_lossy().to_string(),
            },
        );
        Ok(())
    }
}

/// `$HOME/.hcrpd/species.json`
pub fn default_registry_path() -> PathBuf {
    let home = std::env::var_os("HOME").unwrap_or_default();
    Path::new(&home).join(".hcrpd").join("species.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_validate() {
        let params = DesignParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.tile_size, 52);
        assert_eq!(params.channel, Channel::B1);
    }

    #[test]
    fn test_conflicting_bounds() {
        let params = DesignParams {
            min_gc: 60.0,
            max_gc: 40.0,
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(DesignError::Configuration(_))));

        let params = DesignParams {
            min_gibbs: -40.0,
            max_gibbs: -60.0,
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(DesignError::Configuration(_))));

        let params = DesignParams {
            tile_step: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = DesignParams {
            tile_size: 3,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_params_json() {
        let params = DesignParams::default();
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains("\"channel\":\"B1\""));
        let back: DesignParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }

    #[test]
    fn test_registry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("species.json");

        let mut registry = SpeciesRegistry::load(&path).unwrap();
        assert!(registry.species.is_empty());
        assert!(registry.resolve_index("mouse").is_err());

        registry
            .register("mouse", &dir.path().join("indices/mouse/mouse"), false)
            .unwrap();
        registry
            .register("fly", Path::new("/data/dm6/dm6"), false)
            .unwrap();
        assert!(registry
            .register("fly", Path::new("/data/dm6/dm6"), false)
            .is_err());
        registry.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"indices/mouse/mouse\""));

        let loaded = SpeciesRegistry::load(&path).unwrap();
        assert_eq!(
            loaded.resolve_index("mouse").unwrap(),
            dir.path().join("indices/mouse/mouse")
        );
        assert_eq!(
            loaded.resolve_index("fly").unwrap(),
            PathBuf::from("/data/dm6/dm6")
        );
    }

    #[test]
    fn test_registry_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("species.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            SpeciesRegistry::load(&path),
            Err(DesignError::Configuration(_))
        ));
    }
}
