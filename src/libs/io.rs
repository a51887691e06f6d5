use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::libs::error::{DesignError, Result};

/// `stdin` or a file path; `.gz` files are decompressed on the fly.
///
/// ```
/// use std::io::BufRead;
/// let reader = hcrpd::reader("tests/hcr/target1.fa").unwrap();
/// assert_eq!(reader.lines().count(), 2);
///
/// assert!(hcrpd::reader("tests/hcr/missing.fa").is_err());
/// ```
pub fn reader(input: &str) -> Result<Box<dyn BufRead>> {
    let reader: Box<dyn BufRead> = if input == "stdin" {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let path = Path::new(input);
        let file = std::fs::File::open(path).map_err(|e| DesignError::io(e, path))?;

        if path.extension() == Some(std::ffi::OsStr::new("gz")) {
            Box::new(BufReader::new(flate2::read::MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        }
    };

    Ok(reader)
}

pub fn writer(output: &str) -> Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = if output == "stdout" {
        Box::new(BufWriter::new(std::io::stdout()))
    } else {
        let file = std::fs::File::create(output).map_err(|e| DesignError::io(e, output))?;
        Box::new(BufWriter::new(file))
    };

    Ok(writer)
}

/// All `(name, sequence)` records of a FASTA file, in file order.
pub fn read_fasta(input: &str) -> Result<Vec<(String, String)>> {
    let mut fa_in = noodles_fasta::io::Reader::new(reader(input)?);

    let mut records = vec![];
    for result in fa_in.records() {
        let record = result.map_err(|e| DesignError::io(e, input))?;
        let name = String::from_utf8(record.name().into()).map_err(|e| {
            DesignError::InvalidSequence(format!("non UTF-8 record name in {}: {}", input, e))
        })?;
        let seq = String::from_utf8(record.sequence().as_ref().to_vec()).map_err(|e| {
            DesignError::InvalidSequence(format!("non UTF-8 sequence {}: {}", name, e))
        })?;
        records.push((name, seq));
    }

    Ok(records)
}
