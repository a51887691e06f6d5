//! One design run: mask, scan, filter, select, assemble.

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::libs::config::DesignParams;
use crate::libs::error::Result;
use crate::libs::filter::run_filters;
use crate::libs::mask::{GenomeAligner, RepeatMasker};
use crate::libs::predict::ThermoPredictor;
use crate::libs::probe::assemble_all;
use crate::libs::report::ProbeRow;
use crate::libs::scan::scan_sequence;
use crate::libs::select::{by_position, select};

/// Parameters plus the collaborators of a run.
///
/// Collaborators are `Sync` so that targets can be designed in parallel;
/// each target still owns its own tiles.
pub struct Designer<'a> {
    pub params: DesignParams,
    pub masker: &'a (dyn RepeatMasker + Sync),
    pub predictor: &'a (dyn ThermoPredictor + Sync),
    pub aligner: Option<&'a (dyn GenomeAligner + Sync)>,
}

impl<'a> Designer<'a> {
    /// Fails on inconsistent parameters.
    pub fn new(
        params: DesignParams,
        masker: &'a (dyn RepeatMasker + Sync),
        predictor: &'a (dyn ThermoPredictor + Sync),
        aligner: Option<&'a (dyn GenomeAligner + Sync)>,
    ) -> Result<Self> {
        params.validate()?;
        if let Ok(json) = serde_json::to_string(&params) {
            debug!("Design parameters: {}", json);
        }
        Ok(Self {
            params,
            masker,
            predictor,
            aligner,
        })
    }

    /// Probe rows for one target, ordered along the target.
    ///
    /// A target shorter than the tile size yields no rows.
    pub fn design_target(&self, name: &str, sequence: &str) -> Result<Vec<ProbeRow>> {
        let params = &self.params;
        if params.tile_size > sequence.len() {
            warn!(
                "{}: {} bp is shorter than the tile size {}, skipped",
                name,
                sequence.len(),
                params.tile_size
            );
            return Ok(vec![]);
        }

        let masked = self.masker.mask(sequence)?;
        let tiles = scan_sequence(&masked, name, params.tile_step, params.tile_size);

        let predictor: &dyn ThermoPredictor = self.predictor;
        let aligner = self.aligner.map(|a| a as &dyn GenomeAligner);
        let filtered = run_filters(name, tiles, params, predictor, aligner)?;

        let selected = by_position(select(filtered, params.target_gibbs, params.max_probes));
        info!("{}: {} probes selected", name, selected.len());

        assemble_all(selected, params.channel)
            .iter()
            .map(|p| ProbeRow::from_probe(p, predictor))
            .collect()
    }

    /// Designs every record independently; results keep the input order.
    pub fn design_batch(
        &self,
        records: &[(String, String)],
        parallel: bool,
    ) -> Result<Vec<(String, Vec<ProbeRow>)>> {
        let run = |(name, seq): &(String, String)| -> Result<(String, Vec<ProbeRow>)> {
            Ok((name.clone(), self.design_target(name, seq)?))
        };

        if parallel {
            records.par_iter().map(run).collect()
        } else {
            records.iter().map(run).collect()
        }
    }
}
