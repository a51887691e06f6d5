//! Candidate filters, cheapest first.
//!
//! Every stage takes the surviving tiles and returns the ones it keeps, in
//! the same order. A rejected tile is gone for good.

use log::info;

use crate::libs::config::DesignParams;
use crate::libs::error::Result;
use crate::libs::mask::{check_correspondence, GenomeAligner};
use crate::libs::predict::ThermoPredictor;
use crate::libs::tile::{GibbsTile, SplitTile, Tile};

/// Drops tiles with a `c` or `g` homopolymer run.
pub fn reject_homopolymers(tiles: Vec<Tile>, run_length: usize, max_mismatches: usize) -> Vec<Tile> {
    tiles
        .into_iter()
        .filter_map(|mut tile| {
            tile.has_homopolymer_run(b'c', run_length, max_mismatches);
            tile.has_homopolymer_run(b'g', run_length, max_mismatches);
            (!tile.masked()).then_some(tile)
        })
        .collect()
}

/// Drops tiles folding into a hairpin that melts above `max_tm`.
///
/// A tile with no structure passes whatever Tm the predictor reports.
pub fn reject_hairpins(
    tiles: Vec<Tile>,
    predictor: &dyn ThermoPredictor,
    max_tm: f64,
) -> Result<Vec<Tile>> {
    let mut kept = Vec::with_capacity(tiles.len());
    for tile in tiles {
        let hairpin = predictor.hairpin(tile.sequence())?;
        if !hairpin.structure_found || hairpin.tm <= max_tm {
            kept.push(tile);
        }
    }
    Ok(kept)
}

/// Aligns the whole batch once and drops tiles with more than `max_hits`
/// genome alignments. Surviving tiles carry their hit count.
pub fn reject_repeated(
    mut tiles: Vec<Tile>,
    aligner: &dyn GenomeAligner,
    max_hits: usize,
) -> Result<Vec<Tile>> {
    if tiles.is_empty() {
        return Ok(tiles);
    }

    let reads: Vec<(String, String)> = tiles
        .iter()
        .map(|t| (t.name(), t.sequence().to_string()))
        .collect();
    let hits = aligner.align(&reads)?;
    check_correspondence(&tiles, &hits)?;

    for (tile, &count) in tiles.iter_mut().zip(hits.values()) {
        tile.set_hit_count(count);
    }
    tiles.retain(|t| t.hit_count().is_some_and(|c| c <= max_hits));
    Ok(tiles)
}

/// Keeps tiles with GC% in `[min_gc, max_gc]`.
pub fn gc_bounds(tiles: Vec<Tile>, min_gc: f64, max_gc: f64) -> Vec<Tile> {
    tiles
        .into_iter()
        .filter(|t| (min_gc..=max_gc).contains(&t.gc_content()))
        .collect()
}

/// Scores ΔG and keeps tiles with it in `[min_gibbs, max_gibbs]`.
pub fn gibbs_bounds(tiles: Vec<Tile>, min_gibbs: f64, max_gibbs: f64) -> Result<Vec<GibbsTile>> {
    let mut kept = Vec::with_capacity(tiles.len());
    for tile in tiles {
        let scored = tile.score_gibbs()?;
        if (min_gibbs..=max_gibbs).contains(&scored.gibbs()) {
            kept.push(scored);
        }
    }
    Ok(kept)
}

/// Splits every tile into its two halves. With `dtm_max`, tiles whose halves
/// differ in Tm by more than that are dropped.
pub fn split_and_balance(
    tiles: Vec<GibbsTile>,
    predictor: &dyn ThermoPredictor,
    dtm_max: Option<f64>,
) -> Result<Vec<SplitTile>> {
    let mut kept = Vec::with_capacity(tiles.len());
    for scored in tiles {
        let split = scored.split(predictor)?;
        match dtm_max {
            Some(max) if split.half_tm_delta() > max => {}
            _ => kept.push(split),
        }
    }
    Ok(kept)
}

/// All stages in order. Genome uniqueness runs only with an aligner.
///
/// `label` prefixes the per-stage counts in the log.
pub fn run_filters(
    label: &str,
    tiles: Vec<Tile>,
    params: &DesignParams,
    predictor: &dyn ThermoPredictor,
    aligner: Option<&dyn GenomeAligner>,
) -> Result<Vec<SplitTile>> {
    info!("{}: {} tiles", label, tiles.len());

    let tiles = reject_homopolymers(tiles, params.max_run_length, params.max_run_mismatches);
    info!("{}: {} tiles after homopolymer masking", label, tiles.len());

    let tiles = reject_hairpins(tiles, predictor, params.max_hairpin_tm)?;
    info!("{}: {} tiles after hairpin masking", label, tiles.len());

    let tiles = match aligner {
        Some(aligner) => {
            let tiles = reject_repeated(tiles, aligner, params.max_hits)?;
            info!("{}: {} tiles after genome masking", label, tiles.len());
            tiles
        }
        None => tiles,
    };

    let tiles = gc_bounds(tiles, params.min_gc, params.max_gc);
    info!("{}: {} tiles after GC filter", label, tiles.len());

    let tiles = gibbs_bounds(tiles, params.min_gibbs, params.max_gibbs)?;
    info!("{}: {} tiles after Gibbs filter", label, tiles.len());

    let dtm_max = params.dtm_filter.then_some(params.dtm_max);
    let tiles = split_and_balance(tiles, predictor, dtm_max)?;
    if dtm_max.is_some() {
        info!("{}: {} tiles after dTm filter", label, tiles.len());
    }

    Ok(tiles)
}
