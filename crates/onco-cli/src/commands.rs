use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use tracing::{info, info_span};

use onco_ingest::{CsvRowSource, RowSource};
use onco_mapping::{
    MappingCache, MappingConfig, MappingResult, MappingService, PassthroughTranslator,
};
use onco_model::{ReconciliationRecord, normalize};
use onco_reconcile::{BuildStats, IndexRefresher, SharedIndex};

/// Environment variable naming the default extract file.
pub const ROWS_ENV: &str = "ONCO_ROWS_FILE";

/// Extract path from the command line, falling back to [`ROWS_ENV`].
pub fn resolve_rows_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    std::env::var_os(ROWS_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("no extract file given; pass --rows or set {ROWS_ENV}"))
}

/// Config from `path`, or defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<MappingConfig> {
    match path {
        Some(path) => MappingConfig::load(path).context("load config"),
        None => Ok(MappingConfig::default()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedId {
    pub raw: String,
    pub canonical: Option<String>,
}

pub fn run_normalize(ids: &[String]) -> Vec<NormalizedId> {
    ids.iter()
        .map(|raw| NormalizedId {
            raw: raw.clone(),
            canonical: normalize(raw)
                .canonical()
                .map(|id| id.as_str().to_string()),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct LookupOutcome {
    pub query: String,
    pub record: Option<ReconciliationRecord>,
    pub stats: BuildStats,
}

fn load_index(rows: &Path) -> Result<(SharedIndex, BuildStats)> {
    let shared = SharedIndex::default();
    let stats = shared
        .refresh(&CsvRowSource::new(rows))
        .with_context(|| format!("load extract {}", rows.display()))?;
    Ok((shared, stats))
}

pub fn run_lookup(rows: &Path, id: &str) -> Result<LookupOutcome> {
    let (shared, stats) = load_index(rows)?;
    Ok(LookupOutcome {
        query: id.to_string(),
        record: shared.lookup(id),
        stats,
    })
}

#[derive(Debug, Clone, Default)]
pub struct MapOptions {
    pub rows: PathBuf,
    pub input: PathBuf,
    pub ignore_unmappable: bool,
    pub config: MappingConfig,
}

#[derive(Debug, Clone)]
pub struct MapOutcome {
    pub result: MappingResult,
    pub payload: Vec<u8>,
    pub stats: BuildStats,
}

pub fn run_map(options: &MapOptions) -> Result<MapOutcome> {
    let span = info_span!("map", input = %options.input.display());
    let _guard = span.enter();

    let shared = Arc::new(SharedIndex::default());
    let source: Arc<dyn RowSource> = Arc::new(CsvRowSource::new(&options.rows));
    let stats = shared
        .refresh(source.as_ref())
        .with_context(|| format!("load extract {}", options.rows.display()))?;
    let refresher = options
        .config
        .refresh_interval()
        .map(|interval| {
            IndexRefresher::spawn(Arc::clone(&shared), Arc::clone(&source), Some(interval))
        })
        .transpose()
        .context("start index refresher")?;

    let translator = PassthroughTranslator::new()
        .ignore_unmappable(options.ignore_unmappable || options.config.ignore_unmappable);
    let cache = MappingCache::new(options.config.retention.policy());
    let service = MappingService::with_cache(shared, translator, cache);

    let input = std::fs::read(&options.input)
        .with_context(|| format!("read {}", options.input.display()))?;
    let result = service
        .map_and_cache(&input)
        .with_context(|| format!("map {}", options.input.display()))?;
    let payload = service
        .retrieve(&result.key)
        .ok_or_else(|| anyhow!("mapped output {} is no longer cached", result.key))?
        .payload()
        .to_vec();

    if let Some(refresher) = refresher {
        refresher.shutdown();
    }
    info!(bytes = payload.len(), "mapped output retrieved");
    Ok(MapOutcome {
        result,
        payload,
        stats,
    })
}
