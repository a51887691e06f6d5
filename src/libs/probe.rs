//! HCR initiators and split-probe assembly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::libs::error::{DesignError, Result};
use crate::libs::tile::{SplitTile, Tile};

/// Amplifier channel of an HCR v3 probe set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    B1,
    B2,
    B3,
    B4,
    B5,
}

impl Channel {
    pub const ALL: [Channel; 5] = [
        Channel::B1,
        Channel::B2,
        Channel::B3,
        Channel::B4,
        Channel::B5,
    ];

    /// Initiator half prepended to the 3' binding region
    pub fn odd(&self) -> &'static str {
        match self {
            Channel::B1 => "gAggAgggCAgCAAACggAA",
            Channel::B2 => "CCTCgTAAATCCTCATCAAA",
            Channel::B3 => "gTCCCTgCCTCTATATCTTT",
            Channel::B4 => "CCTCAACCTACCTCCAACAA",
            Channel::B5 => "CTCACTCCCAATCTCTATAA",
        }
    }

    /// Initiator half appended to the 5' binding region
    pub fn even(&self) -> &'static str {
        match self {
            Channel::B1 => "TAgAAgAgTCTTCCTTTACg",
            Channel::B2 => "AAATCATCCAgTAAACCgCC",
            Channel::B3 => "TTCCACTCAACTTTAACCCg",
            Channel::B4 => "ATTCTCACCATATTCgCTTC",
            Channel::B5 => "AACTACCCTACAAATCCAAT",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::B1 => "B1",
            Channel::B2 => "B2",
            Channel::B3 => "B3",
            Channel::B4 => "B4",
            Channel::B5 => "B5",
        };
        write!(f, "{}", name)
    }
}

/// Case-insensitive: `b3` and `B3` are the same channel.
impl FromStr for Channel {
    type Err = DesignError;

    fn from_str(s: &str) -> Result<Self> {
        Channel::ALL
            .into_iter()
            .find(|c| c.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                DesignError::Configuration(format!(
                    "unknown channel '{}', expected one of B1, B2, B3, B4, B5",
                    s
                ))
            })
    }
}

/// The two oligos ordered for one binding site.
#[derive(Debug, Clone, PartialEq)]
pub struct Probe {
    split: SplitTile,
    channel: Channel,
    probe_one: String,
    probe_two: String,
}

impl Probe {
    /// `probe_one = odd + 3' half`, `probe_two = 5' half + even`.
    ///
    /// This pairing is the assay's convention, keep it unless the initiator
    /// chemistry changes.
    pub fn assemble(split: SplitTile, channel: Channel) -> Self {
        let probe_one = format!("{}{}", channel.odd(), split.three_prime());
        let probe_two = format!("{}{}", split.five_prime(), channel.even());
        Self {
            split,
            channel,
            probe_one,
            probe_two,
        }
    }

    pub fn tile(&self) -> &Tile {
        self.split.tile()
    }

    pub fn split(&self) -> &SplitTile {
        &self.split
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn probe_one(&self) -> &str {
        &self.probe_one
    }

    pub fn probe_two(&self) -> &str {
        &self.probe_two
    }
}

pub fn assemble_all(selected: Vec<SplitTile>, channel: Channel) -> Vec<Probe> {
    selected
        .into_iter()
        .map(|s| Probe::assemble(s, channel))
        .collect()
}
