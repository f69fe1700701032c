//! # Reference Region Dataset
//!
//! Loads the city table that seeds the region registry. Each data row
//! carries (among other codes) the city, province, and country names in
//! columns 3, 4, and 5; a row becomes the path
//! `"{country}-{province}-{city}"`.
//!
//! ```text
//! City Code,Province Code,Country Code,City Name,Province Name,Country Name
//! KLKRI,TN,IN,Keelakarai,Tamil Nadu,India
//! ```
//!
//! The header row and rows with fewer than six columns are skipped without
//! error. Rows whose names are not valid UTF-8 or contain the path separator
//! are skipped with a warning, since they cannot be addressed unambiguously.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use regauth_core::{RegionPath, RegionRegistry};

const CITY_COLUMN: usize = 3;
const PROVINCE_COLUMN: usize = 4;
const COUNTRY_COLUMN: usize = 5;
const MIN_COLUMNS: usize = 6;

/// Row counts from a dataset load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatasetStats {
    /// Data rows read, excluding the header.
    pub rows: usize,
    /// Rows registered as region paths.
    pub registered: usize,
    /// Rows skipped as short or unaddressable.
    pub skipped: usize,
}

/// Register every city row of a CSV stream into `registry`.
///
/// # Errors
///
/// Fails only if the stream cannot be read. Bad rows are skipped.
pub fn load_regions<R: Read>(reader: R, registry: &mut RegionRegistry) -> Result<DatasetStats> {
    let mut table = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut stats = DatasetStats::default();
    for (line, record) in table.byte_records().enumerate() {
        let record = record.with_context(|| format!("malformed CSV at row {line}"))?;
        if line == 0 {
            continue;
        }
        stats.rows += 1;

        if record.len() < MIN_COLUMNS {
            stats.skipped += 1;
            continue;
        }

        let decoded = [COUNTRY_COLUMN, PROVINCE_COLUMN, CITY_COLUMN]
            .map(|column| std::str::from_utf8(&record[column]));
        let segments = match decoded {
            [Ok(country), Ok(province), Ok(city)] => [country, province, city],
            _ => {
                tracing::warn!(row = line, "skipping dataset row: name is not valid UTF-8");
                stats.skipped += 1;
                continue;
            }
        };
        match RegionPath::from_segments(&segments) {
            Ok(path) => {
                registry.add_region(path.as_str());
                stats.registered += 1;
            }
            Err(e) => {
                tracing::warn!(row = line, "skipping dataset row: {e}");
                stats.skipped += 1;
            }
        }
    }

    tracing::info!(
        rows = stats.rows,
        registered = stats.registered,
        skipped = stats.skipped,
        regions = registry.len(),
        "loaded region dataset"
    );
    Ok(stats)
}

/// Open `path` and register its city rows into `registry`.
///
/// # Errors
///
/// Fails if the file cannot be opened or parsed.
pub fn load_regions_file(path: &Path, registry: &mut RegionRegistry) -> Result<DatasetStats> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open region dataset: {}", path.display()))?;
    load_regions(file, registry)
        .with_context(|| format!("failed to read region dataset: {}", path.display()))
}
