//! Candidate probe-binding sites.
//!
//! A [`Tile`] is one window of the target, already reverse-complemented, with
//! the sticky `masked` flag and the genome hit count. Scores are not stored
//! on the tile; each scoring step wraps it into the next stage type:
//!
//! ```text
//! Tile --gibbs--> GibbsTile --split--> SplitTile --channel--> probe::Probe
//! ```

use std::collections::HashSet;

use crate::libs::error::Result;
use crate::libs::predict::ThermoPredictor;
use crate::libs::{nt, thermo};

#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    seq_name: String,
    start: usize,
    sequence: String,
    masked: bool,
    hit_count: Option<usize>,
}

impl Tile {
    /// `start` is the 1-based offset of the window on the target.
    pub fn new(seq_name: &str, start: usize, sequence: &str) -> Self {
        Self {
            seq_name: seq_name.to_string(),
            start,
            sequence: sequence.to_ascii_lowercase(),
            masked: false,
            hit_count: None,
        }
    }

    pub fn seq_name(&self) -> &str {
        &self.seq_name
    }

    pub fn start(&self) -> usize {
        self.start
    }

    /// `start + len`, the inclusive right edge used by [`Tile::overlaps`]
    pub fn end(&self) -> usize {
        self.start + self.len()
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn masked(&self) -> bool {
        self.masked
    }

    /// `None` until the genome-uniqueness stage has run
    pub fn hit_count(&self) -> Option<usize> {
        self.hit_count
    }

    pub fn set_hit_count(&mut self, count: usize) {
        self.hit_count = Some(count);
    }

    /// Key for de-duplicating biologically identical probes: the sequence.
    ///
    /// Tiles from different loci with the same sequence share a key. Do not
    /// mix tiles of different targets in one keyed collection.
    pub fn canonical_key(&self) -> &str {
        &self.sequence
    }

    /// `seq_name:start-end`, whitespace replaced by `_`.
    ///
    /// ```
    /// let tile = hcrpd::libs::tile::Tile::new("my gene", 3, "ACGT");
    /// assert_eq!(tile.name(), "my_gene:3-7");
    /// ```
    pub fn name(&self) -> String {
        format!("{}:{}-{}", self.seq_name, self.start, self.end()).replace(' ', "_")
    }

    pub fn to_fasta(&self) -> String {
        format!(">{}\n{}", self.name(), self.sequence)
    }

    /// Percentage of G/C among G/C/A/T bases.
    pub fn gc_content(&self) -> f64 {
        nt::gc_percent(&self.sequence)
    }

    /// Flags a run of `base` of `run_length` with at most `max_mismatches`
    /// other bases in it. Any hit marks the tile as masked.
    pub fn has_homopolymer_run(
        &mut self,
        base: u8,
        run_length: usize,
        max_mismatches: usize,
    ) -> bool {
        if run_length == 0 || run_length > self.len() {
            return false;
        }

        let base = base.to_ascii_lowercase();
        let needed = run_length.saturating_sub(max_mismatches);
        let found = self
            .sequence
            .as_bytes()
            .windows(run_length)
            .any(|w| w.iter().filter(|&&b| b == base).count() >= needed);

        if found {
            self.masked = true;
        }
        found
    }

    /// Returns true and masks the tile if it holds a base outside ACGTU.
    ///
    /// Only the sequence decides; an earlier homopolymer mask is kept but
    /// does not make the tile ambiguous.
    pub fn is_ambiguous(&mut self) -> bool {
        let ambiguous = nt::has_ambiguous(&self.sequence);
        if ambiguous {
            self.masked = true;
        }
        ambiguous
    }

    /// Inclusive, symmetric interval test on the target axis.
    ///
    /// ```
    /// use hcrpd::libs::tile::Tile;
    /// let a = Tile::new("t", 1, "acgtacgtac"); // 1..=11
    /// let b = Tile::new("t", 11, "acgtacgtac");
    /// let c = Tile::new("t", 12, "acgtacgtac");
    /// assert!(a.overlaps(&b) && b.overlaps(&a));
    /// assert!(!a.overlaps(&c) && !c.overlaps(&a));
    /// ```
    pub fn overlaps(&self, other: &Tile) -> bool {
        (self.start <= other.start && other.start <= self.end())
            || (self.start >= other.start && self.start <= other.end())
    }

    /// RNA/DNA hybrid ΔG in kcal/mol at 37 °C, 0.33 M Na+.
    pub fn compute_gibbs(&self) -> Result<f64> {
        thermo::hybrid_gibbs(&self.sequence)
    }

    /// Splits into 5' and 3' halves, dropping the two middle bases.
    ///
    /// The first half is `[0, n/2 - 1)`, the second `[n/2 + 1, n)`; for odd
    /// `n` the second half is one base longer.
    ///
    /// ```
    /// let tile = hcrpd::libs::tile::Tile::new("t", 1, "aaaacctttt");
    /// assert_eq!(tile.split_for_probe(), ("aaaa".to_string(), "tttt".to_string()));
    /// ```
    pub fn split_for_probe(&self) -> (String, String) {
        let n = self.len();
        let half = n / 2;
        let five = &self.sequence[..half.saturating_sub(1)];
        let three = &self.sequence[(half + 1).min(n)..];
        (five.to_string(), three.to_string())
    }

    pub fn score_gibbs(self) -> Result<GibbsTile> {
        let gibbs = self.compute_gibbs()?;
        Ok(GibbsTile { tile: self, gibbs })
    }
}

/// A tile with its hybrid free energy.
#[derive(Debug, Clone, PartialEq)]
pub struct GibbsTile {
    tile: Tile,
    gibbs: f64,
}

impl GibbsTile {
    pub fn tile(&self) -> &Tile {
        &self.tile
    }

    /// kcal/mol
    pub fn gibbs(&self) -> f64 {
        self.gibbs
    }

    /// Splits the binding region and scores the Tm balance of the halves.
    pub fn split(self, predictor: &dyn ThermoPredictor) -> Result<SplitTile> {
        let (five_prime, three_prime) = self.tile.split_for_probe();
        let half_tm_delta =
            (predictor.melting_temp(&five_prime)? - predictor.melting_temp(&three_prime)?).abs();
        Ok(SplitTile {
            scored: self,
            five_prime,
            three_prime,
            half_tm_delta,
        })
    }
}

/// A scored tile divided into the two half-probe binding regions.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitTile {
    scored: GibbsTile,
    five_prime: String,
    three_prime: String,
    half_tm_delta: f64,
}

impl SplitTile {
    pub fn tile(&self) -> &Tile {
        self.scored.tile()
    }

    pub fn gibbs(&self) -> f64 {
        self.scored.gibbs()
    }

    pub fn five_prime(&self) -> &str {
        &self.five_prime
    }

    pub fn three_prime(&self) -> &str {
        &self.three_prime
    }

    /// `|Tm(5' half) - Tm(3' half)|`, °C
    pub fn half_tm_delta(&self) -> f64 {
        self.half_tm_delta
    }
}

/// Keeps the first tile of every distinct sequence, in input order.
pub fn unique_tiles(tiles: Vec<Tile>) -> Vec<Tile> {
    let mut seen: HashSet<String> = HashSet::new();
    tiles
        .into_iter()
        .filter(|t| seen.insert(t.canonical_key().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::predict::Hairpin;
    use approx::assert_relative_eq;

    struct LengthTm;

    impl ThermoPredictor for LengthTm {
        fn melting_temp(&self, seq: &str) -> Result<f64> {
            Ok(seq.len() as f64)
        }

        fn hairpin(&self, _seq: &str) -> Result<Hairpin> {
            Ok(Hairpin::default())
        }
    }

    #[test]
    fn test_gc_content() {
        assert_relative_eq!(Tile::new("t", 1, "gcgcgcgcgc").gc_content(), 100.0);
        assert_relative_eq!(Tile::new("t", 1, "aaaaaaaaaa").gc_content(), 0.0);
        assert_relative_eq!(Tile::new("t", 1, "GGAA").gc_content(), 50.0);
    }

    #[test]
    fn test_homopolymer_run() {
        let mut tile = Tile::new("t", 1, "atatgggggggatat");
        assert!(tile.has_homopolymer_run(b'g', 7, 0));
        assert!(tile.masked());

        let mut tile = Tile::new("t", 1, "atatggggggatata");
        assert!(!tile.has_homopolymer_run(b'g', 7, 0));
        assert!(!tile.masked());

        // two mismatches tolerated
        let mut tile = Tile::new("t", 1, "aaagggaggaaaa");
        assert!(tile.has_homopolymer_run(b'g', 7, 2));

        // longer than the tile: no window
        let mut tile = Tile::new("t", 1, "gggg");
        assert!(!tile.has_homopolymer_run(b'g', 999, 2));
    }

    #[test]
    fn test_masking_is_sticky() {
        let mut tile = Tile::new("t", 1, "cccccccaaaa");
        assert!(tile.has_homopolymer_run(b'c', 7, 0));
        assert!(!tile.has_homopolymer_run(b'g', 7, 0));
        assert!(tile.masked());
        // masked by the run, but every base is unambiguous
        assert!(!tile.is_ambiguous());
        assert!(tile.masked());
    }

    #[test]
    fn test_is_ambiguous() {
        let mut tile = Tile::new("t", 1, "acgNacgt");
        assert!(tile.is_ambiguous());
        assert!(tile.masked());

        let mut tile = Tile::new("t", 1, "acgtacgt");
        assert!(!tile.is_ambiguous());
        assert!(!tile.masked());

        let mut tile = Tile::new("t", 1, "acgyacgt");
        assert!(tile.is_ambiguous());
    }

    #[test]
    fn test_split_52() {
        let seq: String = "acgt".repeat(13);
        let tile = Tile::new("t", 1, &seq);
        let (five, three) = tile.split_for_probe();
        assert_eq!(five.len(), 25);
        assert_eq!(three.len(), 25);
        assert_eq!(five, &seq[..25]);
        assert_eq!(three, &seq[27..]);
    }

    #[test]
    fn test_split_odd() {
        let tile = Tile::new("t", 1, "aaaaXYccccc");
        let (five, three) = tile.split_for_probe();
        assert_eq!(five, "aaaa");
        assert_eq!(three, "ccccc");
    }

    #[test]
    fn test_overlaps() {
        let a = Tile::new("t", 10, "acgtacgtac");
        let inside = Tile::new("t", 12, "acgt");
        let left = Tile::new("t", 1, "acgtacgtac");
        let far = Tile::new("t", 30, "acgt");

        for (x, y, expected) in [(&a, &inside, true), (&a, &left, true), (&a, &far, false)] {
            assert_eq!(x.overlaps(y), expected);
            assert_eq!(y.overlaps(x), expected);
        }
    }

    #[test]
    fn test_stage_wrappers() {
        let tile = Tile::new("t", 5, "gtacgtacgt");
        let expected = tile.compute_gibbs().unwrap();

        let scored = tile.clone().score_gibbs().unwrap();
        assert_relative_eq!(scored.gibbs(), expected);

        let split = scored.split(&LengthTm).unwrap();
        assert_eq!(split.five_prime(), "gtac");
        assert_eq!(split.three_prime(), "acgt");
        assert_relative_eq!(split.half_tm_delta(), 0.0);
        assert_eq!(split.tile(), &tile);
    }

    #[test]
    fn test_unique_tiles() {
        let tiles = vec![
            Tile::new("t", 1, "acgt"),
            Tile::new("t", 9, "ACGT"),
            Tile::new("t", 3, "ggcc"),
        ];
        let uniq = unique_tiles(tiles);
        assert_eq!(uniq.len(), 2);
        assert_eq!(uniq[0].start(), 1);
        assert_eq!(uniq[1].canonical_key(), "ggcc");
    }
}
