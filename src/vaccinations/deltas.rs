use std::collections::HashMap;

use tracing::debug;

use super::record::{DeltaRecord, Record};

/// Per-observation deltas for a single, date-ordered cumulative series.
///
/// The first observation counts in full (nothing was administered before
/// it). A drop in the cumulative total is clamped to zero, and the next
/// delta is still measured against the raw prior total, not a corrected
/// baseline.
pub fn series_deltas(totals: &[u64]) -> Vec<u64> {
    let mut previous = None;
    totals
        .iter()
        .map(|&total| {
            let delta = match previous {
                None => total,
                Some(prior) => total.saturating_sub(prior),
            };
            previous = Some(total);
            delta
        })
        .collect()
}

/// Splits the records into (location, vaccine) series, orders each by date
/// and attaches its delta. Series come out in order of first appearance.
pub fn compute_deltas(records: &[Record]) -> Vec<DeltaRecord> {
    let mut series_order: Vec<(&str, &str)> = Vec::new();
    let mut series: HashMap<(&str, &str), Vec<&Record>> = HashMap::new();

    for record in records {
        let key = (record.location.as_str(), record.vaccine.as_str());
        series
            .entry(key)
            .or_insert_with(|| {
                series_order.push(key);
                Vec::new()
            })
            .push(record);
    }

    let mut deltas = Vec::with_capacity(records.len());
    let mut clamped = 0usize;
    for key in series_order {
        let Some(mut group) = series.remove(&key) else {
            continue;
        };
        group.sort_by_key(|record| record.date);

        let totals = group
            .iter()
            .map(|record| record.total_vaccinations)
            .collect::<Vec<_>>();
        for (index, (record, current_value)) in
            group.into_iter().zip(series_deltas(&totals)).enumerate()
        {
            if index > 0 && totals[index] < totals[index - 1] {
                clamped += 1;
            }
            deltas.push(DeltaRecord {
                record: record.clone(),
                current_value,
            });
        }
    }

    debug!(records = deltas.len(), clamped, "computed dose deltas");
    deltas
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::rstest;

    use super::*;

    fn record(location: &str, vaccine: &str, ymd: (i32, u32, u32), total: u64) -> Record {
        Record {
            location: location.to_owned(),
            date: NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2).unwrap(),
            vaccine: vaccine.to_owned(),
            total_vaccinations: total,
        }
    }

    #[rstest]
    #[case::empty(&[], &[])]
    #[case::single(&[42], &[42])]
    #[case::monotonic(&[100, 150, 175], &[100, 50, 25])]
    #[case::revision_clamped(&[100, 150, 120], &[100, 50, 0])]
    #[case::raw_baseline_after_clamp(&[100, 150, 120, 160], &[100, 50, 0, 40])]
    #[case::flat(&[7, 7, 7], &[7, 0, 0])]
    fn series_deltas_cases(#[case] totals: &[u64], #[case] expected: &[u64]) {
        assert_eq!(series_deltas(totals), expected);
    }

    #[test]
    fn groups_by_vaccine_and_sorts_by_date() {
        let records = vec![
            record("X", "V", (2021, 2, 1), 120),
            record("X", "W", (2021, 1, 10), 30),
            record("X", "V", (2021, 1, 5), 100),
            record("X", "V", (2021, 1, 20), 150),
            record("X", "W", (2021, 1, 12), 45),
        ];

        let deltas = compute_deltas(&records);
        let summary = deltas
            .iter()
            .map(|delta| (delta.vaccine(), delta.current_value))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            vec![("V", 100), ("V", 50), ("V", 0), ("W", 30), ("W", 15)]
        );
    }

    #[test]
    fn locations_are_independent_series() {
        let records = vec![
            record("A", "V", (2021, 1, 1), 100),
            record("B", "V", (2021, 1, 2), 10),
            record("A", "V", (2021, 1, 3), 130),
        ];

        let deltas = compute_deltas(&records);
        let values = deltas
            .iter()
            .map(|delta| (delta.record.location.as_str(), delta.current_value))
            .collect::<Vec<_>>();
        assert_eq!(values, vec![("A", 100), ("A", 30), ("B", 10)]);
    }
}
