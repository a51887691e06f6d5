//! Melting-temperature and hairpin prediction.
//!
//! The design pipeline only talks to [`ThermoPredictor`]. [`NearestNeighbor`]
//! is the engine shipped with the crate; anything with the same contract
//! (an external folding program, a cached table) can be swapped in.

use crate::libs::error::{DesignError, Result};
use crate::libs::{nt, thermo};

/// Result of a hairpin search on a single strand.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hairpin {
    /// Melting temperature of the most stable stem-loop, °C
    pub tm: f64,
    pub structure_found: bool,
}

pub trait ThermoPredictor {
    /// Duplex melting temperature of `seq` against its perfect complement, °C.
    fn melting_temp(&self, seq: &str) -> Result<f64>;

    /// Most stable intramolecular structure of `seq`.
    fn hairpin(&self, seq: &str) -> Result<Hairpin>;
}

/// Minimum number of consecutive base pairs that make a stem
pub const MIN_STEM: usize = 4;

/// Minimum number of unpaired bases closing a hairpin loop
pub const MIN_LOOP: usize = 3;

/// SantaLucia DNA/DNA nearest-neighbor model.
#[derive(Debug, Clone, Copy)]
pub struct NearestNeighbor {
    /// Strand concentration, mol/L
    pub oligo_conc: f64,
    /// Na+ concentration, mol/L
    pub salt: f64,
}

impl Default for NearestNeighbor {
    fn default() -> Self {
        Self {
            oligo_conc: 50e-9,
            salt: 0.05,
        }
    }
}

impl NearestNeighbor {
    pub fn new(oligo_conc: f64, salt: f64) -> Self {
        Self { oligo_conc, salt }
    }

    /// Tm of the stem `seq[start..start + len]` closed by a loop of `loop_len` bases.
    fn stem_tm(&self, seq: &str, start: usize, len: usize, loop_len: usize) -> Result<f64> {
        let stem = &seq[start..start + len];
        let (dh, ds) = thermo::dna_stacking_energies(stem)?;
        let ds = ds + 0.368 * (len - 1) as f64 * self.salt.ln() + loop_entropy(loop_len);
        Ok(dh * 1000.0 / ds - 273.15)
    }
}

/// Hairpin loop initiation expressed as entropy, cal/(mol·K).
///
/// Loop free energies at 37 °C from SantaLucia & Hicks (2004); loops longer
/// than 9 extrapolate with the Jacobson-Stockmayer term.
fn loop_entropy(loop_len: usize) -> f64 {
    let dg = match loop_len {
        0..=4 => 3.5,
        5 => 3.3,
        6 => 4.0,
        7 => 4.2,
        8 => 4.3,
        9 => 4.5,
        n => 4.5 + 1.75 * thermo::GAS_CONSTANT * 310.15 / 1000.0 * (n as f64 / 9.0).ln(),
    };
    -dg * 1000.0 / 310.15
}

impl ThermoPredictor for NearestNeighbor {
    fn melting_temp(&self, seq: &str) -> Result<f64> {
        if seq.len() < 2 {
            return Err(DesignError::InvalidSequence(format!(
                "'{}' is too short for a melting temperature",
                seq
            )));
        }
        let (dh_s, ds_s) = thermo::dna_stacking_energies(seq)?;
        let (dh_i, ds_i) = thermo::dna_duplex_initiation(seq)?;
        Ok(thermo::melting_temp(
            dh_s + dh_i,
            ds_s + ds_i,
            self.oligo_conc,
            0.0,
            self.salt,
        ))
    }

    fn hairpin(&self, seq: &str) -> Result<Hairpin> {
        let bytes = seq.as_bytes();
        let n = bytes.len();
        let mut best = Hairpin::default();

        // i: 5' base of the stem, j: its 3' partner
        for i in 0..n {
            for j in (i + 2 * MIN_STEM + MIN_LOOP - 1)..n {
                // only maximal stems; skip if the stem extends outward
                if i > 0 && j + 1 < n && nt::pairs(bytes[i - 1], bytes[j + 1]) {
                    continue;
                }

                let mut len = 0;
                while i + len < j - len
                    && (j - len) - (i + len) - 1 >= MIN_LOOP
                    && nt::pairs(bytes[i + len], bytes[j - len])
                {
                    len += 1;
                }
                if len < MIN_STEM {
                    continue;
                }

                let loop_len = (j + 1 - len) - (i + len);
                let tm = self.stem_tm(seq, i, len, loop_len)?;
                if !best.structure_found || tm > best.tm {
                    best = Hairpin {
                        tm,
                        structure_found: true,
                    };
                }
            }
        }

        Ok(best)
    }
}
