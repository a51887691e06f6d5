//! Nucleotide helpers shared by the scanner, the tiles and the maskers.

use bio::alphabets::dna;

/// A, C, G, T or U in either case.
pub fn is_unambiguous(base: u8) -> bool {
    matches!(base.to_ascii_lowercase(), b'a' | b'c' | b'g' | b't' | b'u')
}

/// True if `seq` holds `n`, an IUPAC code or any other non-ACGTU symbol.
///
/// ```
/// assert!(hcrpd::libs::nt::has_ambiguous("acgNt"));
/// assert!(hcrpd::libs::nt::has_ambiguous("acgRt"));
/// assert!(!hcrpd::libs::nt::has_ambiguous("ACGUt"));
/// ```
pub fn has_ambiguous(seq: &str) -> bool {
    !seq.bytes().all(is_unambiguous)
}

/// Antisense of a window, lower-cased. `U` is read as `T`.
///
/// ```
/// assert_eq!(hcrpd::libs::nt::antisense(b"ACGTACGTAC"), "gtacgtacgt");
/// assert_eq!(hcrpd::libs::nt::antisense(b"aaUc"), "gatt");
/// ```
pub fn antisense(window: &[u8]) -> String {
    let dna_window: Vec<u8> = window.iter().map(|&b| to_dna(b)).collect();
    dna::revcomp(&dna_window)
        .into_iter()
        .map(|b| char::from(b.to_ascii_lowercase()))
        .collect()
}

fn to_dna(base: u8) -> u8 {
    match base {
        b'U' => b'T',
        b'u' => b't',
        _ => base,
    }
}

/// GC percentage over unambiguous bases only.
///
/// G/C divided by G/C/A/T(U); `n` and other symbols stay out of the
/// denominator. A sequence without any unambiguous base gives `0.0`.
pub fn gc_percent(seq: &str) -> f64 {
    let mut gc = 0usize;
    let mut at = 0usize;
    for b in seq.bytes() {
        match b {
            b'G' | b'C' | b'g' | b'c' => gc += 1,
            b'A' | b'T' | b'U' | b'a' | b't' | b'u' => at += 1,
            _ => {}
        }
    }

    if gc + at == 0 {
        return 0.0;
    }
    100.0 * gc as f64 / (gc + at) as f64
}

/// Returns true if `a` and `b` form a Watson-Crick pair.
pub fn pairs(a: u8, b: u8) -> bool {
    let a = to_dna(a.to_ascii_lowercase());
    let b = to_dna(b.to_ascii_lowercase());
    is_unambiguous(a) && dna::complement(a) == b
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gc_percent() {
        assert_relative_eq!(gc_percent("gcgcgcgcgc"), 100.0);
        assert_relative_eq!(gc_percent("aaaaaaaaaa"), 0.0);
        assert_relative_eq!(gc_percent("acgt"), 50.0);
        // n is excluded from the denominator
        assert_relative_eq!(gc_percent("gcnnnnnnat"), 50.0);
        assert_relative_eq!(gc_percent("nnnn"), 0.0);
    }

    #[test]
    fn test_pairs() {
        assert!(pairs(b'a', b't'));
        assert!(pairs(b'G', b'c'));
        assert!(pairs(b'a', b'u'));
        assert!(!pairs(b'g', b't'));
        assert!(!pairs(b'n', b'n'));
        // IUPAC codes never pair
        assert!(!pairs(b'r', b'y'));
    }

    #[test]
    fn test_antisense() {
        assert_eq!(antisense(b"aaaaccccggggtttt"), "aaaaccccggggtttt");
        assert_eq!(antisense(b"AACG"), "cgtt");
        assert_eq!(antisense(b""), "");
    }
}
