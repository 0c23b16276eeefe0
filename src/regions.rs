//! Region and currency catalog
//!
//! Static lookup tables for the price areas published by the upstream data
//! sources: the currency each area is quoted in, the country, a readable
//! description, the statutory VAT rate and the sources known to publish it.
//! Nothing here is mutated after first access.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub const AREA_DK_EAST: &str = "East of the great belt";
pub const AREA_DK_WEST: &str = "West of the great belt";

/// Multiplier for expressing a major currency unit in its minor unit
pub const CENT_MULTIPLIER: u32 = 100;

/// Source currency of every upstream price
pub const SOURCE_CURRENCY: &str = "EUR";

/// Currency descriptor: ISO name plus major and minor unit symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrencyInfo {
    pub name: &'static str,
    pub symbol: &'static str,
    pub cent: &'static str,
}

pub const DKK: CurrencyInfo = CurrencyInfo {
    name: "DKK",
    symbol: "Kr",
    cent: "Øre",
};
pub const NOK: CurrencyInfo = CurrencyInfo {
    name: "NOK",
    symbol: "Kr",
    cent: "Øre",
};
pub const SEK: CurrencyInfo = CurrencyInfo {
    name: "SEK",
    symbol: "Kr",
    cent: "Öre",
};
pub const EUR: CurrencyInfo = CurrencyInfo {
    name: "EUR",
    symbol: "€",
    cent: "c",
};
pub const USD: CurrencyInfo = CurrencyInfo {
    name: "USD",
    symbol: "$",
    cent: "¢",
};

/// All known currencies
pub const CURRENCY_TABLE: [CurrencyInfo; 5] = [DKK, NOK, SEK, EUR, USD];

/// Upstream data sources
pub const SOURCE_ENERGIDATASERVICE: &str = "energidataservice";
pub const SOURCE_NORDPOOL: &str = "nordpool";
pub const SOURCE_ENERGIDATABASE: &str = "energidatabase";

/// A price area in the catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionEntry {
    pub currency: CurrencyInfo,
    pub country: &'static str,
    pub description: &'static str,
    pub vat_rate: f64,
    pub sources: BTreeSet<&'static str>,
}

impl RegionEntry {
    fn new(
        currency: CurrencyInfo,
        country: &'static str,
        description: &'static str,
        vat_rate: f64,
        sources: &[&'static str],
    ) -> Self {
        Self {
            currency,
            country,
            description,
            vat_rate,
            sources: sources.iter().copied().collect(),
        }
    }

    /// Whether the given data source publishes prices for this area
    pub fn supports_source(&self, source: &str) -> bool {
        self.sources.contains(source)
    }
}

static REGIONS: Lazy<BTreeMap<&'static str, RegionEntry>> = Lazy::new(|| {
    const EDS: &str = SOURCE_ENERGIDATASERVICE;
    const EDB: &str = SOURCE_ENERGIDATABASE;
    const NP: &str = SOURCE_NORDPOOL;

    let mut m = BTreeMap::new();
    m.insert(
        "DK1",
        RegionEntry::new(DKK, "Denmark", AREA_DK_WEST, 0.25, &[EDS, NP]),
    );
    m.insert(
        "DK2",
        RegionEntry::new(DKK, "Denmark", AREA_DK_EAST, 0.25, &[EDS, NP]),
    );
    m.insert("FI", RegionEntry::new(EUR, "Finland", "Finland", 0.24, &[NP]));
    m.insert("EE", RegionEntry::new(EUR, "Estonia", "Estonia", 0.20, &[NP]));
    m.insert(
        "LT",
        RegionEntry::new(EUR, "Lithuania", "Lithuania", 0.21, &[NP]),
    );
    m.insert("LV", RegionEntry::new(EUR, "Latvia", "Latvia", 0.21, &[NP]));
    m.insert("Oslo", RegionEntry::new(NOK, "Norway", "Oslo", 0.25, &[NP]));
    m.insert(
        "Kr.Sand",
        RegionEntry::new(NOK, "Norway", "Kristiansand", 0.25, &[EDS, NP]),
    );
    m.insert(
        "Molde",
        RegionEntry::new(NOK, "Norway", "Molde, Trondheim", 0.25, &[NP]),
    );
    m.insert("Tromsø", RegionEntry::new(NOK, "Norway", "Tromsø", 0.25, &[NP]));
    m.insert("Bergen", RegionEntry::new(NOK, "Norway", "Bergen", 0.25, &[NP]));
    m.insert("SE1", RegionEntry::new(SEK, "Sweden", "Luleå", 0.25, &[NP]));
    m.insert("SE2", RegionEntry::new(SEK, "Sweden", "Sundsvall", 0.25, &[NP]));
    m.insert(
        "SE3",
        RegionEntry::new(SEK, "Sweden", "Stockholm", 0.25, &[EDB, NP]),
    );
    m.insert(
        "SE4",
        RegionEntry::new(SEK, "Sweden", "Malmö", 0.25, &[EDS, NP]),
    );
    m.insert("FR", RegionEntry::new(EUR, "France", "France", 0.055, &[NP]));
    m.insert(
        "NL",
        RegionEntry::new(EUR, "Netherlands", "Netherlands", 0.21, &[NP]),
    );
    m.insert("BE", RegionEntry::new(EUR, "Belgium", "Belgium", 0.21, &[NP]));
    m.insert("AT", RegionEntry::new(EUR, "Austria", "Austria", 0.20, &[NP]));
    m.insert(
        "DE",
        RegionEntry::new(EUR, "Germany", "Germany", 0.19, &[EDS, NP]),
    );
    m
});

/// Look up a region by its area code
pub fn region(code: &str) -> Option<&'static RegionEntry> {
    REGIONS.get(code)
}

/// Iterate over all regions, ordered by area code
pub fn regions() -> impl Iterator<Item = (&'static str, &'static RegionEntry)> {
    REGIONS.iter().map(|(k, v)| (*k, v))
}

/// Look up a currency descriptor by ISO name
pub fn currency(name: &str) -> Option<CurrencyInfo> {
    CURRENCY_TABLE.iter().copied().find(|c| c.name == name)
}

// Legacy mappings kept for configurations written against the first release

/// Readable area label to area code
pub fn area_code_for_label(label: &str) -> Option<&'static str> {
    match label {
        AREA_DK_WEST => Some("DK1"),
        AREA_DK_EAST => Some("DK2"),
        _ => None,
    }
}

/// Area code to readable area label
pub fn label_for_area_code(code: &str) -> Option<&'static str> {
    match code {
        "DK1" => Some(AREA_DK_WEST),
        "DK2" => Some(AREA_DK_EAST),
        _ => None,
    }
}

/// Currency label to ISO code
pub fn currency_code_for_label(label: &str) -> Option<&'static str> {
    match label {
        "Danske Kroner" => Some("DKK"),
        "Euro" => Some("EUR"),
        _ => None,
    }
}

/// Sorted legacy currency labels
pub fn currency_labels() -> Vec<&'static str> {
    let mut labels = vec!["Danske Kroner", "Euro"];
    labels.sort_unstable();
    labels
}

/// Energy unit prices are expressed per
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PriceUnit {
    MWh,
    #[serde(rename = "kWh")]
    KWh,
    Wh,
}

impl PriceUnit {
    /// Parse a price type label; `mWh` is accepted as a legacy spelling of MWh
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "MWh" | "mWh" => Some(Self::MWh),
            "kWh" => Some(Self::KWh),
            "Wh" => Some(Self::Wh),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MWh => "MWh",
            Self::KWh => "kWh",
            Self::Wh => "Wh",
        }
    }

    /// MWh-equivalent multiplier; 0 marks the source unit itself
    pub fn multiplier(&self) -> u32 {
        match self {
            Self::MWh => 0,
            Self::KWh => 1_000,
            Self::Wh => 1_000_000,
        }
    }

    /// Inverse of [`PriceUnit::multiplier`]
    pub fn from_multiplier(multiplier: u32) -> Option<Self> {
        match multiplier {
            0 => Some(Self::MWh),
            1_000 => Some(Self::KWh),
            1_000_000 => Some(Self::Wh),
            _ => None,
        }
    }
}

impl fmt::Display for PriceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn danish_regions_are_published_by_energidataservice() {
        let dk1 = region("DK1").unwrap();
        assert_eq!(dk1.currency, DKK);
        assert_eq!(dk1.country, "Denmark");
        assert_eq!(dk1.description, AREA_DK_WEST);
        assert!((dk1.vat_rate - 0.25).abs() < f64::EPSILON);
        assert!(dk1.supports_source(SOURCE_ENERGIDATASERVICE));
        assert!(dk1.supports_source(SOURCE_NORDPOOL));
    }

    #[test]
    fn catalog_covers_all_areas() {
        assert_eq!(regions().count(), 20);
        assert!(region("Tromsø").is_some());
        assert!(region("Kr.Sand").is_some());
        assert!(region("XX").is_none());
    }

    #[test]
    fn vat_rates_span_expected_range() {
        let (min, max) = regions().fold((f64::MAX, f64::MIN), |(lo, hi), (_, r)| {
            (lo.min(r.vat_rate), hi.max(r.vat_rate))
        });
        assert!((min - 0.055).abs() < f64::EPSILON);
        assert!((max - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn legacy_mappings_are_inverse() {
        for code in ["DK1", "DK2"] {
            let label = label_for_area_code(code).unwrap();
            assert_eq!(area_code_for_label(label), Some(code));
        }
        assert_eq!(currency_code_for_label("Danske Kroner"), Some("DKK"));
        assert_eq!(currency_code_for_label("Euro"), Some("EUR"));
        assert_eq!(currency_labels(), vec!["Danske Kroner", "Euro"]);
    }

    #[test]
    fn price_unit_multipliers() {
        assert_eq!(PriceUnit::parse("mWh"), Some(PriceUnit::MWh));
        assert_eq!(PriceUnit::parse("kWh").unwrap().multiplier(), 1_000);
        assert_eq!(PriceUnit::from_multiplier(1_000_000), Some(PriceUnit::Wh));
        assert_eq!(PriceUnit::parse("GWh"), None);
        assert_eq!(currency("SEK").unwrap().cent, "Öre");
    }
}
