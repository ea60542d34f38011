//! Bar loading for the runner.
//!
//! Two sources:
//! 1. A local CSV file with a `date,open,high,low,close,volume` header
//!    (header names are matched case-insensitively; extra columns are ignored)
//! 2. A deterministic synthetic random walk seeded from the symbol name
//!
//! Synthetic data is for demos and tests. Results produced on synthetic data
//! carry `synthetic = true` through to the run result.

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use edgelab_core::domain::{Bar, BarError, OhlcvSeries};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid bar series: {0}")]
    InvalidSeries(#[from] BarError),

    #[error("no bars found for '{symbol}'")]
    Empty { symbol: String },
}

/// A loaded series with its provenance.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub symbol: String,
    pub series: OhlcvSeries,
    /// BLAKE3 over every bar, for request fingerprints.
    pub dataset_hash: String,
    pub synthetic: bool,
}

/// One CSV row. Header names are lower-cased before deserialization.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "timestamp")]
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl From<CsvRow> for Bar {
    fn from(row: CsvRow) -> Self {
        Bar {
            timestamp: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        }
    }
}

/// Load and validate a CSV file of daily bars for `symbol`.
pub fn load_csv(path: &Path, symbol: &str) -> Result<LoadedData, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let data = read_csv(file, symbol)?;
    debug!(symbol, path = %path.display(), bars = data.series.len(), "loaded CSV");
    Ok(data)
}

/// Parse CSV bars from any reader.
pub fn read_csv<R: std::io::Read>(reader: R, symbol: &str) -> Result<LoadedData, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers: csv::StringRecord = rdr
        .headers()?
        .iter()
        .map(|h| h.to_ascii_lowercase())
        .collect();
    rdr.set_headers(headers);

    let bars = rdr
        .deserialize::<CsvRow>()
        .map(|row| row.map(Bar::from))
        .collect::<Result<Vec<_>, _>>()?;

    if bars.is_empty() {
        warn!(symbol, "CSV contains no bars");
        return Err(LoadError::Empty {
            symbol: symbol.to_string(),
        });
    }

    let void = bars.iter().filter(|b| !b.is_sane()).count();
    if void > 0 {
        warn!(symbol, void, "bars with inconsistent OHLC values");
    }

    let series = OhlcvSeries::new(bars)?;
    Ok(LoadedData {
        symbol: symbol.to_string(),
        dataset_hash: dataset_hash(&series),
        series,
        synthetic: false,
    })
}

/// Generate `n` weekday bars of a random walk starting at 100.0.
///
/// The RNG is seeded from BLAKE3(symbol), so the same symbol always yields
/// the same series.
pub fn synthetic_bars(symbol: &str, n: usize) -> Result<LoadedData, LoadError> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    if n == 0 {
        return Err(LoadError::Empty {
            symbol: symbol.to_string(),
        });
    }

    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::with_capacity(n);
    let mut price = 100.0_f64;
    let mut current = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap_or_default();

    while bars.len() < n {
        let weekday = current.weekday();
        if weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun {
            current += chrono::Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64) as f64;

        bars.push(Bar {
            timestamp: current,
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
        current += chrono::Duration::days(1);
    }

    let series = OhlcvSeries::new(bars)?;
    debug!(symbol, bars = n, "generated synthetic bars");
    Ok(LoadedData {
        symbol: symbol.to_string(),
        dataset_hash: dataset_hash(&series),
        series,
        synthetic: true,
    })
}

/// Deterministic BLAKE3 hash over dates and OHLCV values.
pub fn dataset_hash(series: &OhlcvSeries) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in series.bars() {
        hasher.update(bar.timestamp.to_string().as_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
