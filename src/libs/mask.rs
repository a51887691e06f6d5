//! Repeat masking of the target and genome-uniqueness checks of the tiles.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use log::debug;

use crate::libs::config::GenomeMaskConfig;
use crate::libs::error::{DesignError, Result};
use crate::libs::tile::Tile;

//----------------------------
// Repeat masking
//----------------------------

/// Replaces repeat positions of a target with ambiguous bases.
///
/// The result is never longer than the input.
pub trait RepeatMasker {
    fn mask(&self, sequence: &str) -> Result<String>;
}

/// Leaves the target untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMask;

impl RepeatMasker for NoMask {
    fn mask(&self, sequence: &str) -> Result<String> {
        Ok(sequence.to_string())
    }
}

/// Turns soft-masked (lower-case) bases into `n`.
///
/// Genome FASTA from UCSC or Ensembl carry RepeatMasker output this way.
///
/// ```
/// use hcrpd::libs::mask::{RepeatMasker, SoftMask};
/// assert_eq!(SoftMask.mask("ACGTacgtACGT").unwrap(), "ACGTnnnnACGT");
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct SoftMask;

impl RepeatMasker for SoftMask {
    fn mask(&self, sequence: &str) -> Result<String> {
        Ok(sequence
            .chars()
            .map(|c| if c.is_ascii_lowercase() { 'n' } else { c })
            .collect())
    }
}

//----------------------------
// Genome masking
//----------------------------

/// Counts genome alignments for a batch of reads.
pub trait GenomeAligner {
    /// `reads` are `(name, sequence)` pairs. The returned map must list every
    /// read once, in submission order.
    fn align(&self, reads: &[(String, String)]) -> Result<IndexMap<String, usize>>;
}

/// Runs `bowtie2` against a prebuilt index.
#[derive(Debug, Clone)]
pub struct Bowtie2 {
    pub program: PathBuf,
    pub index: PathBuf,
    /// Alignments reported per read (`-k`)
    pub n_alignments: usize,
    pub timeout: Option<Duration>,
}

impl Bowtie2 {
    pub fn new(index: impl Into<PathBuf>) -> Self {
        Self {
            program: PathBuf::from("bowtie2"),
            index: index.into(),
            n_alignments: 3,
            timeout: None,
        }
    }

    pub fn from_config(config: &GenomeMaskConfig) -> Self {
        Self {
            n_alignments: config.n_alignments,
            timeout: config.timeout,
            ..Self::new(&config.index)
        }
    }

    fn wait(&self, child: &mut std::process::Child) -> Result<std::process::ExitStatus> {
        let Some(limit) = self.timeout else {
            return Ok(child.wait()?);
        };

        let started = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if started.elapsed() > limit {
                // the process may have exited in between; either way it is gone after this
                let _ = child.kill();
                let _ = child.wait();
                return Err(DesignError::ExternalTool(format!(
                    "{} did not finish within {:?}",
                    self.program.display(),
                    limit
                )));
            }
            std::thread::sleep(Duration::from_millis(50));
        }
    }
}

impl GenomeAligner for Bowtie2 {
    fn align(&self, reads: &[(String, String)]) -> Result<IndexMap<String, usize>> {
        if which::which(&self.program).is_err() {
            return Err(DesignError::ExternalTool(format!(
                "{} not found in PATH",
                self.program.display()
            )));
        }

        let dir = tempfile::tempdir()?;
        let reads_file = dir.path().join("reads.fa");
        let sam_file = dir.path().join("hits.sam");
        let log_file = dir.path().join("bowtie2.log");

        {
            let mut writer = std::io::BufWriter::new(
                std::fs::File::create(&reads_file).map_err(|e| DesignError::io(e, &reads_file))?,
            );
            for (name, seq) in reads {
                writeln!(writer, ">{}\n{}", name, seq)?;
            }
            writer.flush()?;
        }

        let mut cmd = Command::new(&self.program);
        cmd.arg(format!("-k{}", self.n_alignments))
            .arg("-x")
            .arg(&self.index)
            .arg("-f")
            .arg("-U")
            .arg(&reads_file)
            .arg("-S")
            .arg(&sam_file)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(std::fs::File::create(&log_file).map_err(|e| DesignError::io(e, &log_file))?);
        debug!("Running {:?}", cmd);

        let mut child = cmd.spawn().map_err(|e| {
            DesignError::ExternalTool(format!("failed to start {}: {}", self.program.display(), e))
        })?;
        let status = self.wait(&mut child)?;

        if !status.success() {
            let log = std::fs::read_to_string(&log_file).unwrap_or_default();
            return Err(DesignError::ExternalTool(format!(
                "{} exited with {}: {}",
                self.program.display(),
                status,
                log.trim()
            )));
        }

        let file = std::fs::File::open(&sam_file).map_err(|e| {
            DesignError::ExternalTool(format!("{} wrote no SAM output: {}", self.program.display(), e))
        })?;
        count_hits_from_sam(std::io::BufReader::new(file))
    }
}

/// Number of mapped records per read name, in first-seen order.
///
/// Unmapped records (flag 0x4) register the read with zero hits.
pub fn count_hits_from_sam<R: BufRead>(reader: R) -> Result<IndexMap<String, usize>> {
    let mut hits: IndexMap<String, usize> = IndexMap::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() || line.starts_with('@') {
            continue;
        }

        let mut fields = line.split('\t');
        let (Some(qname), Some(flag)) = (fields.next(), fields.next()) else {
            return Err(DesignError::ExternalTool(format!(
                "malformed SAM record at line {}: {}",
                i + 1,
                line
            )));
        };
        let flag: u16 = flag.parse().map_err(|_| {
            DesignError::ExternalTool(format!("bad SAM flag at line {}: {}", i + 1, flag))
        })?;

        let count = hits.entry(qname.to_string()).or_insert(0);
        if flag & 0x4 == 0 {
            *count += 1;
        }
    }

    Ok(hits)
}

/// Fails unless `hits` lists exactly the tiles, one to one and in order.
pub fn check_correspondence(tiles: &[Tile], hits: &IndexMap<String, usize>) -> Result<()> {
    if tiles.len() != hits.len() {
        return Err(DesignError::AlignmentCorrespondence(format!(
            "{} tiles submitted, {} reads reported",
            tiles.len(),
            hits.len()
        )));
    }

    for (i, (tile, read)) in tiles.iter().zip(hits.keys()).enumerate() {
        let name = tile.name();
        if &name != read {
            return Err(DesignError::AlignmentCorrespondence(format!(
                "read {} is {}, expected {}",
                i + 1,
                read,
                name
            )));
        }
    }

    Ok(())
}
