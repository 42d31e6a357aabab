//! Loading onboarding exports into memory
//!
//! Files are read once per path and shared as `Arc<Dataset>`. The cache has no
//! invalidation: an entry lives as long as the cache does, which for
//! [`DatasetCache::global`] is the lifetime of the process.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Instant;

use arrow::compute::concat_batches;
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use log::{info, warn};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::dataset::Dataset;
use crate::error::Result;
use crate::error::util::{rewind_file, safe_open_file};
use crate::schema::adapters::{DateFormatConfig, normalize_batch};

/// Default number of rows per decoded batch
pub const DEFAULT_BATCH_SIZE: usize = 8192;

/// Options controlling how a file is decoded
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Rows per record batch while decoding CSV
    pub batch_size: usize,
    /// Formats tried when parsing the `date` column
    pub date_format_config: DateFormatConfig,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            date_format_config: DateFormatConfig::default(),
        }
    }
}

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Comma separated values with a header row
    Csv,
    /// Apache Parquet
    Parquet,
}

impl SourceFormat {
    /// Pick the format from the file extension, defaulting to CSV
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("parquet") => Self::Parquet,
            _ => Self::Csv,
        }
    }
}

/// Read and normalize an export without caching
pub fn read_onboarding_file(path: &Path, options: &LoadOptions) -> Result<Dataset> {
    let start = Instant::now();

    let raw = match SourceFormat::from_path(path) {
        SourceFormat::Csv => read_csv(path, options.batch_size)?,
        SourceFormat::Parquet => read_parquet(path)?,
    };
    let batch = normalize_batch(&raw, &options.date_format_config)?;

    info!(
        "Loaded {} rows x {} columns from {} in {:?}",
        batch.num_rows(),
        batch.num_columns(),
        path.display(),
        start.elapsed()
    );

    Ok(Dataset::new(batch))
}

/// Read a CSV file with every column as text
///
/// Column types are not inferred: the header decides the column set and the
/// adapters decide the types, so a stray value never changes a column's type.
/// Short rows are padded with nulls.
fn read_csv(path: &Path, batch_size: usize) -> Result<RecordBatch> {
    let mut file = safe_open_file(path, "loading onboarding export")?;

    let format = Format::default()
        .with_header(true)
        .with_truncated_rows(true);
    let (inferred, _) = format.infer_schema(&mut file, Some(0))?;
    rewind_file(&mut file, path)?;

    let schema = Arc::new(Schema::new(
        inferred
            .fields()
            .iter()
            .map(|f| Field::new(f.name(), DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));

    let reader = ReaderBuilder::new(schema.clone())
        .with_format(format)
        .with_batch_size(batch_size)
        .build(file)?;

    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(concat_batches(&schema, &batches)?)
}

/// Read a Parquet file into a single batch
fn read_parquet(path: &Path) -> Result<RecordBatch> {
    let file = safe_open_file(path, "loading onboarding export")?;

    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let reader = builder.build()?;

    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(concat_batches(&schema, &batches)?)
}

/// Memoized loader keyed by file path
///
/// Paths are compared exactly as given; `data.csv` and `./data.csv` are
/// distinct entries.
#[derive(Debug, Default)]
pub struct DatasetCache {
    options: LoadOptions,
    entries: Mutex<HashMap<PathBuf, Arc<Dataset>>>,
    disk_reads: AtomicUsize,
}

static GLOBAL_CACHE: OnceLock<DatasetCache> = OnceLock::new();

impl DatasetCache {
    /// Create an empty cache
    #[must_use]
    pub fn new(options: LoadOptions) -> Self {
        Self {
            options,
            entries: Mutex::new(HashMap::new()),
            disk_reads: AtomicUsize::new(0),
        }
    }

    /// The process-wide cache, created with default options on first use
    pub fn global() -> &'static Self {
        GLOBAL_CACHE.get_or_init(Self::default)
    }

    /// Install the process-wide cache with specific options
    ///
    /// Has no effect, apart from a warning, if the global cache already exists.
    pub fn install_global(options: LoadOptions) -> &'static Self {
        if GLOBAL_CACHE.set(Self::new(options)).is_err() {
            warn!("Global dataset cache already initialized; keeping existing options");
        }
        Self::global()
    }

    /// Load a file, reading it from disk only on the first call for `path`
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Arc<Dataset>> {
        let path = path.as_ref();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(dataset) = entries.get(path) {
            return Ok(Arc::clone(dataset));
        }

        self.disk_reads.fetch_add(1, Ordering::Relaxed);
        let dataset = Arc::new(read_onboarding_file(path, &self.options)?);
        entries.insert(path.to_path_buf(), Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Number of file reads performed so far
    #[must_use]
    pub fn disk_reads(&self) -> usize {
        self.disk_reads.load(Ordering::Relaxed)
    }

    /// Number of cached paths
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been loaded yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Load through the process-wide cache
pub fn load_data(path: impl AsRef<Path>) -> Result<Arc<Dataset>> {
    DatasetCache::global().load(path)
}
