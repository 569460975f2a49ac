mod bins;
mod deltas;
mod hierarchy;
mod load;
mod record;

pub use bins::{Bin, BinBounds, QuarterBins, quarter_boundaries};
pub use deltas::{compute_deltas, series_deltas};
pub use hierarchy::{HierarchyRoot, QuarterNode, VaccineLeaf, YearNode, build_hierarchy};
pub use load::{RawRecord, load_table, parse_records, read_raw_records};
pub use record::{DateDomain, DeltaRecord, Record, VaccinationTable};

use crate::error::PipelineError;

/// Deltas, bins and hierarchy for one location of an already loaded table.
pub fn location_hierarchy(
    table: &VaccinationTable,
    location: &str,
) -> Result<HierarchyRoot, PipelineError> {
    let records = table.records_for(location);
    let deltas = compute_deltas(&records);
    build_hierarchy(location, &deltas, table.domain)
}
