use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub location: String,
    pub date: NaiveDate,
    pub vaccine: String,
    /// Cumulative count as reported upstream; revisions may make it shrink.
    pub total_vaccinations: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeltaRecord {
    pub record: Record,
    /// Doses attributable to this observation relative to the previous one
    /// of the same location and vaccine. Never negative.
    pub current_value: u64,
}

impl DeltaRecord {
    pub fn date(&self) -> NaiveDate {
        self.record.date
    }

    pub fn vaccine(&self) -> &str {
        &self.record.vaccine
    }
}

/// Closed `[min, max]` date range over every record of the dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateDomain {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DateDomain {
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn from_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Option<Self> {
        let mut dates = dates.into_iter();
        let first = dates.next()?;
        let (min, max) = dates.fold((first, first), |(min, max), date| {
            (min.min(date), max.max(date))
        });
        Some(Self { min, max })
    }

    pub fn from_records(records: &[Record]) -> Option<Self> {
        Self::from_dates(records.iter().map(|record| record.date))
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date >= self.min && date <= self.max
    }
}

/// The whole parsed table plus the lookups the front end needs.
#[derive(Clone, Debug)]
pub struct VaccinationTable {
    pub records: Vec<Record>,
    pub locations: Vec<String>,
    /// In order of first appearance; drives the colour palette.
    pub vaccines: Vec<String>,
    pub domain: Option<DateDomain>,
}

impl VaccinationTable {
    pub fn new(records: Vec<Record>) -> Self {
        let locations = records
            .iter()
            .map(|record| record.location.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut seen = HashSet::new();
        let vaccines = records
            .iter()
            .filter(|record| seen.insert(record.vaccine.as_str()))
            .map(|record| record.vaccine.clone())
            .collect();

        let domain = DateDomain::from_records(&records);

        Self {
            records,
            locations,
            vaccines,
            domain,
        }
    }

    pub fn records_for(&self, location: &str) -> Vec<Record> {
        self.records
            .iter()
            .filter(|record| record.location == location)
            .cloned()
            .collect()
    }

    pub fn vaccine_index(&self, vaccine: &str) -> Option<usize> {
        self.vaccines.iter().position(|name| name == vaccine)
    }
}
