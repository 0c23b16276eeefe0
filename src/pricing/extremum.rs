use crate::pricing::types::FormattedPriceRecord;

/// Which extremum to look for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Min,
    Max,
}

impl Extremum {
    /// Accepts `min`/`Min`/`MIN` and `max`/`Max`/`MAX`
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "min" | "Min" | "MIN" => Some(Self::Min),
            "max" | "Max" | "MAX" => Some(Self::Max),
            _ => None,
        }
    }

    fn improves(self, candidate: f64, current: f64) -> bool {
        match self {
            Self::Min => candidate < current,
            Self::Max => candidate > current,
        }
    }
}

/// Find the cheapest or most expensive record.
///
/// Returns a reference into `data`; on ties the first occurrence wins.
/// Empty or absent input yields `None`.
pub fn find_extremum(
    mode: Extremum,
    data: Option<&[FormattedPriceRecord]>,
) -> Option<&FormattedPriceRecord> {
    let mut iter = data?.iter();
    let mut best = iter.next()?;
    for record in iter {
        if mode.improves(record.price, best.price) {
            best = record;
        }
    }
    Some(best)
}
