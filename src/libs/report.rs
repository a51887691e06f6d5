//! Output rows and their serialisations.

use std::io::Write;

use serde::Serialize;

use crate::libs::error::Result;
use crate::libs::predict::ThermoPredictor;
use crate::libs::probe::{Channel, Probe};

/// US$ per synthesised base, standard desalted oligos
pub const COST_PER_BASE: f64 = 0.19;

pub const TABLE_HEADER: [&str; 11] = [
    "name", "probe", "start", "length", "P1", "P2", "channel", "GC", "Tm", "dTm", "GibbsFE",
];

/// One selected binding site with both oligos.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeRow {
    pub name: String,
    pub sequence: String,
    pub start: usize,
    pub length: usize,
    pub probe_one: String,
    pub probe_two: String,
    pub channel: Channel,
    pub gc: f64,
    pub tm: f64,
    pub dtm: f64,
    pub gibbs: f64,
}

impl ProbeRow {
    pub fn from_probe(probe: &Probe, predictor: &dyn ThermoPredictor) -> Result<Self> {
        let tile = probe.tile();
        Ok(Self {
            name: tile.name(),
            sequence: tile.sequence().to_string(),
            start: tile.start(),
            length: tile.len(),
            probe_one: probe.probe_one().to_string(),
            probe_two: probe.probe_two().to_string(),
            channel: probe.channel(),
            gc: tile.gc_content(),
            tm: predictor.melting_temp(tile.sequence())?,
            dtm: probe.split().half_tm_delta(),
            gibbs: probe.split().gibbs(),
        })
    }
}

/// Tab-separated table with a header line, floats to two decimals.
pub fn write_table<W: Write>(writer: &mut W, rows: &[ProbeRow]) -> Result<()> {
    writeln!(writer, "{}", TABLE_HEADER.join("\t"))?;
    for row in rows {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.2}\t{:.2}\t{:.2}\t{:.2}",
            row.name,
            row.sequence,
            row.start,
            row.length,
            row.probe_one,
            row.probe_two,
            row.channel,
            row.gc,
            row.tm,
            row.dtm,
            row.gibbs,
        )?;
    }
    Ok(())
}

pub fn write_json<W: Write>(writer: &mut W, rows: &[ProbeRow]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, rows).map_err(std::io::Error::from)?;
    writeln!(writer)?;
    Ok(())
}

/// Bulk-order sheet: all odd oligos, then all even ones.
pub fn write_idt<W: Write>(writer: &mut W, rows: &[ProbeRow]) -> Result<()> {
    writeln!(writer, "Name\tSequence")?;
    for row in rows {
        writeln!(writer, "{}:{}:odd\t{}", row.name, row.channel, row.probe_one)?;
    }
    for row in rows {
        writeln!(writer, "{}:{}:even\t{}", row.name, row.channel, row.probe_two)?;
    }
    Ok(())
}

/// Price of synthesising every oligo in `rows`.
pub fn oligo_cost(rows: &[ProbeRow]) -> f64 {
    let bases: usize = rows
        .iter()
        .map(|r| r.probe_one.len() + r.probe_two.len())
        .sum();
    bases as f64 * COST_PER_BASE
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn row(name: &str, channel: Channel) -> ProbeRow {
        ProbeRow {
            name: name.to_string(),
            sequence: "gtacgtacgt".to_string(),
            start: 1,
            length: 10,
            probe_one: format!("{}acgt", channel.odd()),
            probe_two: format!("gtac{}", channel.even()),
            channel,
            gc: 50.0,
            tm: 31.456,
            dtm: 0.0,
            gibbs: -9.876,
        }
    }

    #[test]
    fn test_write_table() {
        let mut out = Vec::new();
        write_table(&mut out, &[row("t:1-11", Channel::B1)]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("name\tprobe\tstart\tlength\tP1\tP2\tchannel"));
        let fields: Vec<&str> = lines[1].split('\t').collect();
        assert_eq!(fields.len(), 11);
        assert_eq!(fields[0], "t:1-11");
        assert_eq!(fields[6], "B1");
        assert_eq!(fields[8], "31.46");
        assert_eq!(fields[10], "-9.88");
    }

    #[test]
    fn test_write_idt() {
        let rows = vec![row("a:1-11", Channel::B3), row("a:20-30", Channel::B3)];
        let mut out = Vec::new();
        write_idt(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();
        let names: Vec<&str> = text
            .lines()
            .map(|l| l.split('\t').next().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "Name",
                "a:1-11:B3:odd",
                "a:20-30:B3:odd",
                "a:1-11:B3:even",
                "a:20-30:B3:even"
            ]
        );
    }

    #[test]
    fn test_write_json() {
        let mut out = Vec::new();
        write_json(&mut out, &[row("t:1-11", Channel::B5)]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["channel"], "B5");
        assert_eq!(value[0]["start"], 1);
    }

    #[test]
    fn test_oligo_cost() {
        let rows = vec![row("t:1-11", Channel::B1)];
        // 24 + 24 bases
        assert_relative_eq!(oligo_cost(&rows), 48.0 * 0.19);
        assert_relative_eq!(oligo_cost(&[]), 0.0);
    }
}
