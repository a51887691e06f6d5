use crate::libs::nt;
use crate::libs::tile::Tile;

/// Number of full windows of `tile_size` taken every `tile_step` bases.
///
/// ```
/// use hcrpd::libs::scan::num_windows;
/// assert_eq!(num_windows(10, 1, 10), 1);
/// assert_eq!(num_windows(10, 2, 4), 4);
/// assert_eq!(num_windows(5, 1, 10), 0);
/// ```
pub fn num_windows(seq_len: usize, tile_step: usize, tile_size: usize) -> usize {
    if tile_step == 0 || tile_size == 0 || tile_size > seq_len {
        return 0;
    }
    (seq_len - tile_size) / tile_step + 1
}

/// Slides a window over the target and emits the antisense tiles.
///
/// Each window is reverse-complemented and gets a 1-based `start`. Windows
/// holding an ambiguous base (`n`, or any symbol outside ACGTU) are dropped.
/// A target shorter than `tile_size` gives no tiles.
pub fn scan_sequence(sequence: &str, seq_name: &str, tile_step: usize, tile_size: usize) -> Vec<Tile> {
    let bytes = sequence.as_bytes();
    let n = num_windows(bytes.len(), tile_step, tile_size);

    let mut tiles = Vec::with_capacity(n);
    for i in (0..n * tile_step).step_by(tile_step.max(1)) {
        let window = &bytes[i..i + tile_size];
        if !window.iter().all(|&b| nt::is_unambiguous(b)) {
            continue;
        }
        tiles.push(Tile::new(seq_name, i + 1, &nt::antisense(window)));
    }

    tiles
}
