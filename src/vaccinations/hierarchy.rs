use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::error::PipelineError;

use super::bins::{Bin, QuarterBins};
use super::record::{DateDomain, DeltaRecord};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HierarchyRoot {
    pub location: String,
    pub years: Vec<YearNode>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct YearNode {
    /// Four-digit year, e.g. `"2021"`.
    pub label: String,
    pub quarters: Vec<QuarterNode>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuarterNode {
    /// `"Q1"` through `"Q4"`.
    pub label: String,
    /// May be empty when no vaccine reached a positive sum in the quarter.
    pub leaves: Vec<VaccineLeaf>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VaccineLeaf {
    pub vaccine: String,
    /// Always positive.
    pub doses: u64,
}

impl HierarchyRoot {
    pub fn empty(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            years: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn leaves(&self) -> impl Iterator<Item = &VaccineLeaf> {
        self.years
            .iter()
            .flat_map(|year| &year.quarters)
            .flat_map(|quarter| &quarter.leaves)
    }

    pub fn total_doses(&self, vaccine: &str) -> u64 {
        self.leaves()
            .filter(|leaf| leaf.vaccine == vaccine)
            .map(|leaf| leaf.doses)
            .sum()
    }

    pub fn max_leaf_doses(&self) -> u64 {
        self.leaves().map(|leaf| leaf.doses).max().unwrap_or(0)
    }

    pub fn node_count(&self) -> usize {
        1 + self
            .years
            .iter()
            .map(|year| {
                1 + year
                    .quarters
                    .iter()
                    .map(|quarter| 1 + quarter.leaves.len())
                    .sum::<usize>()
            })
            .sum::<usize>()
    }
}

/// Folds one location's deltas into location → year → quarter → vaccine.
///
/// Bin boundaries come from the global `domain` so they stay put when the
/// location changes. Only the bins from the one holding the location's first
/// record to the one holding its last are listed, grouped by year.
pub fn build_hierarchy(
    location: &str,
    deltas: &[DeltaRecord],
    domain: Option<DateDomain>,
) -> Result<HierarchyRoot, PipelineError> {
    let bins = QuarterBins::new(domain)?;
    let assigned = bins.assign(deltas);

    let mut seen = HashSet::new();
    let vaccines = deltas
        .iter()
        .map(DeltaRecord::vaccine)
        .filter(|vaccine| seen.insert(*vaccine))
        .collect::<Vec<_>>();

    // Bins before the location's first record and after its last one are
    // left out; empty bins in between stay.
    let first = assigned.iter().position(|bin| !bin.records.is_empty());
    let last = assigned.iter().rposition(|bin| !bin.records.is_empty());
    let span = match (first, last) {
        (Some(first), Some(last)) => &assigned[first..=last],
        _ => &assigned[..0],
    };

    let mut years: Vec<i32> = Vec::new();
    for bin in span {
        let year = bin.bounds.year();
        if !years.contains(&year) {
            years.push(year);
        }
    }

    let years = years
        .into_iter()
        .map(|year| YearNode {
            label: format!("{year:04}"),
            quarters: span
                .iter()
                .filter(|bin| bin.bounds.year() == year)
                .map(|bin| quarter_node(bin, &vaccines))
                .collect(),
        })
        .collect::<Vec<_>>();

    let root = HierarchyRoot {
        location: location.to_owned(),
        years,
    };
    debug!(
        location,
        years = root.years.len(),
        nodes = root.node_count(),
        "built vaccination hierarchy"
    );
    Ok(root)
}

fn quarter_node(bin: &Bin<'_>, vaccines: &[&str]) -> QuarterNode {
    let leaves = vaccines
        .iter()
        .filter_map(|&vaccine| {
            let doses = bin
                .records
                .iter()
                .filter(|record| record.vaccine() == vaccine)
                .map(|record| record.current_value)
                .sum::<u64>();
            (doses > 0).then(|| VaccineLeaf {
                vaccine: vaccine.to_owned(),
                doses,
            })
        })
        .collect();

    QuarterNode {
        label: bin.bounds.quarter_label(),
        leaves,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::vaccinations::deltas::compute_deltas;
    use crate::vaccinations::record::Record;

    fn record(vaccine: &str, ymd: (i32, u32, u32), total: u64) -> Record {
        Record {
            location: "X".into(),
            date: NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2).unwrap(),
            vaccine: vaccine.into(),
            total_vaccinations: total,
        }
    }

    fn domain(records: &[Record]) -> Option<DateDomain> {
        DateDomain::from_records(records)
    }

    #[test]
    fn clamped_revision_example() {
        let records = vec![
            record("V", (2021, 1, 5), 100),
            record("V", (2021, 1, 20), 150),
            record("V", (2021, 2, 1), 120),
        ];
        let deltas = compute_deltas(&records);
        let values = deltas.iter().map(|d| d.current_value).collect::<Vec<_>>();
        assert_eq!(values, vec![100, 50, 0]);

        let root = build_hierarchy("X", &deltas, domain(&records)).unwrap();
        assert_eq!(root.years.len(), 1);
        assert_eq!(root.years[0].label, "2021");
        assert_eq!(root.years[0].quarters.len(), 1);
        assert_eq!(root.years[0].quarters[0].label, "Q1");
        assert_eq!(
            root.years[0].quarters[0].leaves,
            vec![VaccineLeaf {
                vaccine: "V".into(),
                doses: 150
            }]
        );
    }

    #[test]
    fn empty_location_yields_empty_root() {
        let global = DateDomain::new(
            NaiveDate::from_ymd_opt(2020, 12, 1).unwrap(),
            NaiveDate::from_ymd_opt(2022, 6, 1).unwrap(),
        );
        let root = build_hierarchy("Nowhere", &[], Some(global)).unwrap();
        assert_eq!(root, HierarchyRoot::empty("Nowhere"));
        assert_eq!(root.node_count(), 1);
    }

    #[test]
    fn missing_domain_fails() {
        assert!(matches!(
            build_hierarchy("X", &[], None),
            Err(PipelineError::NullDomain)
        ));
    }

    #[test]
    fn zero_sum_leaves_are_dropped_but_quarters_remain() {
        let records = vec![
            record("V", (2021, 1, 5), 100),
            record("W", (2021, 1, 6), 10),
            record("V", (2021, 4, 5), 90),
            record("W", (2021, 4, 6), 20),
            record("V", (2021, 10, 5), 90),
        ];
        let deltas = compute_deltas(&records);
        let root = build_hierarchy("X", &deltas, domain(&records)).unwrap();

        let quarters = &root.years[0].quarters;
        let labels = quarters.iter().map(|q| q.label.as_str()).collect::<Vec<_>>();
        assert_eq!(labels, vec!["Q1", "Q2", "Q3", "Q4"]);

        assert_eq!(quarters[1].leaves.len(), 1);
        assert_eq!(quarters[1].leaves[0].vaccine, "W");
        assert!(quarters[2].leaves.is_empty());
        assert!(quarters[3].leaves.is_empty());
        assert!(root.leaves().all(|leaf| leaf.doses > 0));
    }

    #[test]
    fn leaf_sums_track_final_totals_without_revisions() {
        let records = vec![
            record("V", (2020, 12, 20), 10),
            record("V", (2021, 2, 1), 60),
            record("V", (2021, 5, 1), 200),
            record("V", (2022, 1, 3), 500),
        ];
        let deltas = compute_deltas(&records);
        let root = build_hierarchy("X", &deltas, domain(&records)).unwrap();

        let years = root.years.iter().map(|y| y.label.as_str()).collect::<Vec<_>>();
        assert_eq!(years, vec!["2020", "2021", "2022"]);
        assert_eq!(root.total_doses("V"), 500);
    }

    #[test]
    fn quarters_outside_the_location_span_are_trimmed() {
        let global = DateDomain::new(
            NaiveDate::from_ymd_opt(2020, 12, 1).unwrap(),
            NaiveDate::from_ymd_opt(2022, 6, 1).unwrap(),
        );
        let records = vec![
            record("V", (2021, 1, 10), 10),
            record("V", (2021, 2, 10), 30),
            record("V", (2021, 8, 1), 70),
        ];
        let deltas = compute_deltas(&records);
        let root = build_hierarchy("X", &deltas, Some(global)).unwrap();

        let years = root.years.iter().map(|y| y.label.as_str()).collect::<Vec<_>>();
        assert_eq!(years, vec!["2021"]);
        let quarters = &root.years[0].quarters;
        let labels = quarters.iter().map(|q| q.label.as_str()).collect::<Vec<_>>();
        assert_eq!(labels, vec!["Q1", "Q2", "Q3"]);
        assert_eq!(quarters[0].leaves[0].doses, 30);
        assert!(quarters[1].leaves.is_empty());
        assert_eq!(quarters[2].leaves[0].doses, 40);
    }

    #[test]
    fn identical_input_builds_identical_tree() {
        let records = vec![
            record("V", (2021, 1, 5), 100),
            record("W", (2021, 3, 6), 10),
            record("V", (2021, 6, 5), 300),
        ];
        let deltas = compute_deltas(&records);
        let first = build_hierarchy("X", &deltas, domain(&records)).unwrap();
        let second = build_hierarchy("X", &deltas, domain(&records)).unwrap();
        assert_eq!(first, second);
    }
}
