// 🚚 Feed Loader - GTFS directory → relational tables
//
// One run:
// 1. drop + create every catalogue table
// 2. per entity kind, in catalogue order: locate file, decode, transform,
//    write through the store's row sink
// 3. build indexes
//
// A file that fails is logged and recorded; the run moves on to the next.

use crate::config::LoadConfig;
use crate::db::Store;
use crate::decoder::FeedFile;
use crate::entities::EntityKind;
use crate::optimizer::TripOptimizer;
use crate::registry::IdRegistry;
use crate::report::{LoadReport, TableOutcome, TableStatus};
use crate::schema;
use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

pub const DEFAULT_BATCH_SIZE: usize = 10_000;

#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Source file names (`shapes.txt`) to leave out
    pub exclude: HashSet<String>,
    /// Rows per INSERT flush, also the progress log interval
    pub batch_size: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            exclude: HashSet::new(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

pub struct FeedLoader<'a> {
    gtfs_dir: PathBuf,
    store: &'a mut dyn Store,
    options: LoadOptions,
    ids: IdRegistry,
}

impl<'a> FeedLoader<'a> {
    pub fn new(gtfs_dir: &Path, store: &'a mut dyn Store, mut options: LoadOptions) -> Result<Self> {
        if !gtfs_dir.is_dir() {
            bail!("GTFS source is not a directory: {}", gtfs_dir.display());
        }
        options.batch_size = options.batch_size.max(1);

        Ok(FeedLoader {
            gtfs_dir: gtfs_dir.to_path_buf(),
            store,
            options,
            ids: IdRegistry::new(),
        })
    }

    pub fn registry(&self) -> &IdRegistry {
        &self.ids
    }

    /// Load every catalogue file. Errors returned here are fatal (DDL);
    /// per-file problems end up in the report instead.
    pub fn load(&mut self) -> Result<LoadReport> {
        let mut report = LoadReport::start(&self.gtfs_dir, self.store.backend(), self.store.write_path());
        info!(
            dir = %self.gtfs_dir.display(),
            backend = self.store.backend(),
            write_path = ?self.store.write_path(),
            "Loading GTFS feed"
        );

        self.create_tables()?;

        for kind in EntityKind::ALL {
            let outcome = self.load_kind(kind);
            report.tables.push(outcome);
        }

        self.create_indexes()?;
        report.identifiers = self.ids.counts();

        Ok(report)
    }

    // ========================================================================
    // TABLE LIFECYCLE
    // ========================================================================

    fn create_tables(&mut self) -> Result<()> {
        let script = schema::recreate_all(self.store.dialect());
        run_in_transaction(self.store, &script).context("Failed to create tables")?;
        debug!(tables = EntityKind::ALL.len(), "Tables created");
        Ok(())
    }

    fn create_indexes(&mut self) -> Result<()> {
        let script: Vec<String> = EntityKind::ALL
            .iter()
            .flat_map(|kind| schema::index_sqls(kind.table()))
            .collect();

        run_in_transaction(self.store, &script).context("Failed to create indexes")?;
        info!(indexes = script.len(), "Indexes created");
        Ok(())
    }

    // ========================================================================
    // PER FILE
    // ========================================================================

    /// `<table>.txt`, falling back to `<table>.csv`
    fn locate(&self, kind: EntityKind) -> Option<PathBuf> {
        [kind.file_name(), kind.alt_file_name()]
            .into_iter()
            .map(|name| self.gtfs_dir.join(name))
            .find(|path| path.is_file())
    }

    fn load_kind(&mut self, kind: EntityKind) -> TableOutcome {
        let table = kind.table_name();

        if self.options.exclude.contains(&kind.file_name()) {
            info!(table, "Excluded, table left empty");
            return TableOutcome::new(kind, TableStatus::SkippedExcluded);
        }

        let Some(path) = self.locate(kind) else {
            debug!(table, "No source file, skipping");
            return TableOutcome::new(kind, TableStatus::SkippedMissing);
        };

        let mut outcome = TableOutcome::new(kind, TableStatus::Loaded);
        outcome.source = Some(path.clone());

        match self.load_file(kind, &path, &mut outcome) {
            Ok(written) => {
                outcome.rows_written = written;
                info!(
                    table,
                    rows = written,
                    rejected = outcome.rows_rejected,
                    "Table loaded"
                );
            }
            Err(e) => {
                let reason = format!("{:#}", e);
                error!(table, file = %path.display(), error = %reason, "Load failed, continuing");
                outcome.status = TableStatus::Failed(reason);
            }
        }

        outcome
    }

    fn load_file(&mut self, kind: EntityKind, path: &Path, outcome: &mut TableOutcome) -> Result<u64> {
        let table = kind.table();
        let batch_size = self.options.batch_size;

        let file = FeedFile::open(path)?;
        outcome.encoding = Some(file.encoding_name());
        outcome.sha256 = Some(file.sha256().to_string());
        info!(table = table.name, file = %path.display(), encoding = file.encoding_name(), "Loading");

        let ids = &mut self.ids;
        let mut sink = self.store.open_sink(table, batch_size)?;
        let mut read: u64 = 0;

        for row in file.rows() {
            let row = row.with_context(|| format!("Bad record in {}", path.display()))?;
            read += 1;

            match kind.transform(&row, ids) {
                Ok(tuple) => sink.write_row(tuple)?,
                Err(e) => {
                    outcome.rows_rejected += 1;
                    warn!(table = table.name, line = row.line(), error = %e, "Row skipped");
                }
            }

            if read % batch_size as u64 == 0 {
                info!(table = table.name, rows = read, "Progress");
            }
        }

        sink.finish()
    }
}

fn run_in_transaction(store: &mut dyn Store, statements: &[String]) -> Result<()> {
    store.begin()?;
    for sql in statements {
        if let Err(e) = store.execute(sql) {
            let _ = store.rollback();
            return Err(e);
        }
    }
    store.commit()
}

// ============================================================================
// RUN
// ============================================================================

/// Connect, load, optionally optimize, report
pub fn run(config: &LoadConfig) -> Result<LoadReport> {
    let mut store = config.connect()?;

    let mut report = {
        let mut loader = FeedLoader::new(&config.gtfs_dir, store.as_mut(), config.load_options())?;
        loader.load()?
    };

    if config.optimize {
        let stats = TripOptimizer::new(store.as_mut()).run()?;
        report.optimized = true;
        report.optimizer = Some(stats);
    }

    report.finish();
    report.log_summary();

    if let Some(path) = &config.report {
        report.write_json(path)?;
    }

    Ok(report)
}

// ============================================================================
// TESTS
// ============================================================================
