//! Amateur band plan

use serde::{Deserialize, Serialize};

/// HF/VHF amateur bands tracked by the engine, ordered low to high.
///
/// The derived `Ord` follows declaration order, so iterating a
/// `BTreeMap<Band, _>` always walks 160m -> 6m.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Band {
    #[serde(rename = "160m")]
    M160,
    #[serde(rename = "80m")]
    M80,
    #[serde(rename = "40m")]
    M40,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "20m")]
    M20,
    #[serde(rename = "17m")]
    M17,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "12m")]
    M12,
    #[serde(rename = "10m")]
    M10,
    #[serde(rename = "6m")]
    M6,
}

impl Band {
    pub const ALL: [Band; 10] = [
        Band::M160,
        Band::M80,
        Band::M40,
        Band::M30,
        Band::M20,
        Band::M17,
        Band::M15,
        Band::M12,
        Band::M10,
        Band::M6,
    ];

    /// Representative frequency used for scoring (MHz).
    pub fn frequency_mhz(self) -> f64 {
        match self {
            Band::M160 => 1.8,
            Band::M80 => 3.5,
            Band::M40 => 7.0,
            Band::M30 => 10.1,
            Band::M20 => 14.0,
            Band::M17 => 18.1,
            Band::M15 => 21.0,
            Band::M12 => 24.9,
            Band::M10 => 28.0,
            Band::M6 => 50.0,
        }
    }

    /// Allocation edges (MHz, inclusive) used to classify live samples.
    pub fn edges_mhz(self) -> (f64, f64) {
        match self {
            Band::M160 => (1.8, 2.0),
            Band::M80 => (3.5, 4.0),
            Band::M40 => (7.0, 7.3),
            Band::M30 => (10.1, 10.15),
            Band::M20 => (14.0, 14.35),
            Band::M17 => (18.068, 18.168),
            Band::M15 => (21.0, 21.45),
            Band::M12 => (24.89, 24.99),
            Band::M10 => (28.0, 29.7),
            Band::M6 => (50.0, 54.0),
        }
    }

    /// Classify a frequency (MHz) into its band, if it falls inside an allocation.
    pub fn from_frequency(mhz: f64) -> Option<Band> {
        Self::ALL.into_iter().find(|band| {
            let (lo, hi) = band.edges_mhz();
            (lo..=hi).contains(&mhz)
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            Band::M160 => "160m",
            Band::M80 => "80m",
            Band::M40 => "40m",
            Band::M30 => "30m",
            Band::M20 => "20m",
            Band::M17 => "17m",
            Band::M15 => "15m",
            Band::M12 => "12m",
            Band::M10 => "10m",
            Band::M6 => "6m",
        }
    }

    /// Lower HF bands that survive geomagnetic storms and absorb by day.
    pub fn is_low(self) -> bool {
        matches!(self, Band::M160 | Band::M80 | Band::M40)
    }

    pub fn is_high(self) -> bool {
        matches!(self, Band::M15 | Band::M12 | Band::M10)
    }

    pub fn is_vhf(self) -> bool {
        matches!(self, Band::M6)
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Band {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown band '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_frequencies_into_bands() {
        assert_eq!(Band::from_frequency(14.074), Some(Band::M20));
        assert_eq!(Band::from_frequency(7.074), Some(Band::M40));
        assert_eq!(Band::from_frequency(28.5), Some(Band::M10));
        assert_eq!(Band::from_frequency(50.313), Some(Band::M6));
        // Between allocations
        assert_eq!(Band::from_frequency(12.0), None);
    }

    #[test]
    fn ordering_is_low_to_high() {
        let mut bands = Band::ALL.to_vec();
        bands.sort();
        for pair in bands.windows(2) {
            assert!(pair[0].frequency_mhz() < pair[1].frequency_mhz());
        }
    }

    #[test]
    fn parse_and_display_agree() {
        for band in Band::ALL {
            assert_eq!(band.to_string().parse::<Band>(), Ok(band));
        }
    }

    #[test]
    fn serializes_as_band_name() {
        let json = serde_json::to_string(&Band::M160).unwrap();
        assert_eq!(json, "\"160m\"");
    }
}
