use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::error::PipelineError;

use super::record::{DateDomain, DeltaRecord};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BinBounds {
    /// Inclusive.
    pub start: NaiveDate,
    /// Exclusive.
    pub end: NaiveDate,
}

impl BinBounds {
    pub fn contains(self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    pub fn year(self) -> i32 {
        self.start.year()
    }

    /// Calendar quarter (1..=4) of the bin start.
    pub fn quarter(self) -> u32 {
        self.start.month0() / 3 + 1
    }

    pub fn quarter_label(self) -> String {
        format!("Q{}", self.quarter())
    }
}

#[derive(Clone, Debug)]
pub struct Bin<'a> {
    pub bounds: BinBounds,
    pub records: Vec<&'a DeltaRecord>,
}

/// Quarter-aligned partition of a date domain.
///
/// The first bin starts at the domain minimum, every later bin starts on the
/// first day of January, April, July or October, and the last bin ends the
/// day after the domain maximum.
#[derive(Clone, Debug)]
pub struct QuarterBins {
    domain: DateDomain,
    bounds: Vec<BinBounds>,
}

impl QuarterBins {
    pub fn new(domain: Option<DateDomain>) -> Result<Self, PipelineError> {
        let domain = domain.ok_or(PipelineError::NullDomain)?;

        let mut edges = Vec::with_capacity(2);
        edges.push(domain.min);
        edges.extend(quarter_boundaries(domain));
        edges.push(domain.max.succ_opt().unwrap_or(NaiveDate::MAX));

        let bounds = edges
            .windows(2)
            .map(|pair| BinBounds {
                start: pair[0],
                end: pair[1],
            })
            .collect();

        Ok(Self { domain, bounds })
    }

    pub fn domain(&self) -> DateDomain {
        self.domain
    }

    pub fn bounds(&self) -> &[BinBounds] {
        &self.bounds
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub fn bin_index(&self, date: NaiveDate) -> Option<usize> {
        let index = self.bounds.partition_point(|bounds| bounds.end <= date);
        self.bounds
            .get(index)
            .filter(|bounds| bounds.contains(date))
            .map(|_| index)
    }

    /// Every record inside the domain lands in exactly one bin; the rest are
    /// dropped.
    pub fn assign<'a>(&self, records: &'a [DeltaRecord]) -> Vec<Bin<'a>> {
        let mut bins = self
            .bounds
            .iter()
            .map(|&bounds| Bin {
                bounds,
                records: Vec::new(),
            })
            .collect::<Vec<_>>();

        let mut dropped = 0usize;
        for record in records {
            match self.bin_index(record.date()) {
                Some(index) => bins[index].records.push(record),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            debug!(dropped, "records outside the date domain were not binned");
        }
        bins
    }
}

/// First days of Jan/Apr/Jul/Oct strictly after `domain.min` and no later
/// than `domain.max`.
pub fn quarter_boundaries(domain: DateDomain) -> Vec<NaiveDate> {
    let mut year = domain.min.year();
    let mut month0 = (domain.min.month0() / 3 + 1) * 3;
    let mut boundaries = Vec::new();

    loop {
        if month0 >= 12 {
            year += 1;
            month0 -= 12;
        }
        let Some(boundary) = NaiveDate::from_ymd_opt(year, month0 + 1, 1) else {
            break;
        };
        if boundary > domain.max {
            break;
        }
        boundaries.push(boundary);
        month0 += 3;
    }

    boundaries
}
