//! Nearest-neighbor thermodynamics for RNA/DNA and DNA/DNA duplexes.
//!
//! Enthalpies are kcal/mol, entropies cal/(mol·K). Everything here is a pure
//! function of its arguments.

use crate::libs::error::{DesignError, Result};

/// Gas constant, cal/(mol·K)
pub const GAS_CONSTANT: f64 = 1.9872;

/// Assay temperature used for probe free energies, °C
pub const HYBRID_TEMP: f64 = 37.0;

/// Na+ concentration used for probe free energies, mol/L
pub const HYBRID_SALT: f64 = 0.33;

// Sugimoto et al. (1995) Biochemistry 34:11211, Table 3. RNA strand 5'->3', U as T.
fn rna_dna_stack(pair: [u8; 2]) -> Option<(f64, f64)> {
    let v = match &pair {
        b"aa" => (-7.8, -21.9),
        b"ac" => (-5.9, -12.3),
        b"ag" => (-9.1, -23.5),
        b"at" => (-8.3, -23.9),
        b"ca" => (-9.0, -26.1),
        b"cc" => (-9.3, -23.2),
        b"cg" => (-16.3, -47.1),
        b"ct" => (-7.0, -19.7),
        b"ga" => (-5.5, -13.5),
        b"gc" => (-8.0, -17.1),
        b"gg" => (-12.8, -31.9),
        b"gt" => (-7.8, -21.6),
        b"ta" => (-7.8, -23.2),
        b"tc" => (-8.6, -22.9),
        b"tg" => (-10.4, -28.4),
        b"tt" => (-11.5, -36.4),
        _ => return None,
    };
    Some(v)
}

// SantaLucia (1998) PNAS 95:1460, Table 2.
fn dna_dna_stack(pair: [u8; 2]) -> Option<(f64, f64)> {
    let v = match &pair {
        b"aa" => (-7.9, -22.2),
        b"ac" => (-8.4, -22.4),
        b"ag" => (-7.8, -21.0),
        b"at" => (-7.2, -20.4),
        b"ca" => (-8.5, -22.7),
        b"cc" => (-8.0, -19.9),
        b"cg" => (-10.6, -27.2),
        b"ct" => (-7.8, -21.0),
        b"ga" => (-8.2, -22.2),
        b"gc" => (-9.8, -24.4),
        b"gg" => (-8.0, -19.9),
        b"gt" => (-8.4, -22.4),
        b"ta" => (-7.2, -21.3),
        b"tc" => (-8.2, -22.2),
        b"tg" => (-8.5, -22.7),
        b"tt" => (-7.9, -22.2),
        _ => return None,
    };
    Some(v)
}

fn sum_stacks(seq: &str, table: fn([u8; 2]) -> Option<(f64, f64)>) -> Result<(f64, f64)> {
    let bytes = seq.as_bytes();
    let mut dh = 0.0;
    let mut ds = 0.0;
    for w in bytes.windows(2) {
        let pair = [w[0].to_ascii_lowercase(), w[1].to_ascii_lowercase()];
        let (h, s) = table(pair).ok_or_else(|| {
            DesignError::InvalidSequence(format!(
                "no stacking parameters for dinucleotide '{}' in {}",
                String::from_utf8_lossy(&pair),
                seq
            ))
        })?;
        dh += h;
        ds += s;
    }
    Ok((dh, ds))
}

/// Summed RNA/DNA stacking enthalpy and entropy; `n` bases give `n - 1` terms.
///
/// ```
/// let (dh, ds) = hcrpd::libs::thermo::stacking_energies("acg").unwrap();
/// assert!((dh - (-5.9 - 16.3)).abs() < 1e-9);
/// assert!((ds - (-12.3 - 47.1)).abs() < 1e-9);
/// assert!(hcrpd::libs::thermo::stacking_energies("acng").is_err());
/// ```
pub fn stacking_energies(seq: &str) -> Result<(f64, f64)> {
    sum_stacks(seq, rna_dna_stack)
}

/// RNA/DNA duplex initiation (Sugimoto 1995).
pub fn duplex_initiation() -> (f64, f64) {
    (1.9, -3.9)
}

/// Summed DNA/DNA stacking enthalpy and entropy.
pub fn dna_stacking_energies(seq: &str) -> Result<(f64, f64)> {
    sum_stacks(seq, dna_dna_stack)
}

/// DNA/DNA initiation with terminal G·C or A·T corrections (SantaLucia 1998).
pub fn dna_duplex_initiation(seq: &str) -> Result<(f64, f64)> {
    let bytes = seq.as_bytes();
    let (first, last) = match (bytes.first(), bytes.last()) {
        (Some(f), Some(l)) => (*f, *l),
        _ => {
            return Err(DesignError::InvalidSequence(
                "empty sequence has no duplex initiation".to_string(),
            ))
        }
    };

    let mut dh = 0.0;
    let mut ds = 0.0;
    for end in [first, last] {
        match end.to_ascii_lowercase() {
            b'c' | b'g' => {
                dh += 0.1;
                ds += -2.8;
            }
            b'a' | b't' => {
                dh += 2.3;
                ds += 4.1;
            }
            other => {
                return Err(DesignError::InvalidSequence(format!(
                    "terminal base '{}' in {}",
                    other as char, seq
                )))
            }
        }
    }
    Ok((dh, ds))
}

/// ΔG in cal/mol from ΔH (kcal/mol), ΔS (cal/(mol·K)) and °C.
///
/// ```
/// let g = hcrpd::libs::thermo::gibbs(-10.0, -20.0, 37.0);
/// assert!((g - (-10000.0 + 310.15 * 20.0)).abs() < 1e-9);
/// ```
pub fn gibbs(dh: f64, ds: f64, temp: f64) -> f64 {
    dh * 1000.0 - (temp + 273.15) * ds
}

/// Moves ΔG (kcal/mol) from 1 M Na+ to `salt` mol/L (SantaLucia 1998, eq. 7).
pub fn salt_adjust(dg: f64, n_bases: usize, salt: f64) -> f64 {
    dg - 0.114 * n_bases as f64 * salt.ln()
}

/// Two-state melting temperature in °C.
///
/// `ca` and `cb` are the strand concentrations (mol/L) of a
/// non-self-complementary pair, `salt` the Na+ concentration.
pub fn melting_temp(dh: f64, ds: f64, ca: f64, cb: f64, salt: f64) -> f64 {
    let ct = ca - cb / 2.0;
    dh * 1000.0 / (ds + GAS_CONSTANT * ct.ln()) + 16.6 * salt.log10() - 273.15
}

/// Salt-adjusted RNA/DNA hybrid ΔG in kcal/mol at 37 °C and 0.33 M Na+.
pub fn hybrid_gibbs(seq: &str) -> Result<f64> {
    let (dh_s, ds_s) = stacking_energies(seq)?;
    let (dh_i, ds_i) = duplex_initiation();
    let dg = gibbs(dh_s + dh_i, ds_s + ds_i, HYBRID_TEMP);
    Ok(salt_adjust(dg / 1000.0, seq.len(), HYBRID_SALT))
}
