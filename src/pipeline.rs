use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use rayon::prelude::*;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};

use crate::batch::Batcher;
use crate::cache::{NameCache, RunCaches};
use crate::config::Config;
use crate::constants::{BASIC_TITLE_INFO_COLLECTION, PRINCIPAL_CAST_COLLECTION};
use crate::decode::{decode_basic, decode_principal};
use crate::error::{IndexerError, Result};
use crate::sink::BulkSink;
use crate::source::GzipLines;

/// Outcome of indexing one dataset end to end.
#[derive(Debug, Clone, Serialize)]
pub struct StageSummary {
    pub dataset: String,
    pub collection: String,
    pub records_processed: usize,
    pub records_skipped: usize,
    pub batches_submitted: usize,
    pub batches_failed: usize,
}

/// Outcome of a complete pipeline run.
#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub stages: Vec<StageSummary>,
}

impl RunSummary {
    pub fn records_processed(&self) -> usize {
        self.stages.iter().map(|s| s.records_processed).sum()
    }

    pub fn records_skipped(&self) -> usize {
        self.stages.iter().map(|s| s.records_skipped).sum()
    }

    pub fn batches_failed(&self) -> usize {
        self.stages.iter().map(|s| s.batches_failed).sum()
    }
}

/// Strictly sequential pipeline driver.
///
/// Stages: build the name cache, stream-index title-basics (populating the
/// title cache as a side effect), stream-index principal-cast against the
/// now-complete title cache, release the destination connection. A failure
/// building the name cache or opening a dataset resource is terminal; a
/// failed bulk submission is recorded and the run continues.
pub struct Pipeline {
    config: Config,
    sink: Arc<dyn BulkSink>,
}

impl Pipeline {
    pub fn new(config: Config, sink: Arc<dyn BulkSink>) -> Self {
        Self { config, sink }
    }

    /// Run the complete pipeline: name cache, then both datasets in order.
    pub async fn run(&self) -> Result<RunSummary> {
        let names = self.build_name_cache().await?;
        let caches = Arc::new(RunCaches::new(names));

        let mut summary = RunSummary::default();
        summary
            .stages
            .push(self.index_title_basics(caches.clone()).await?);
        summary
            .stages
            .push(self.index_title_principals(caches).await?);

        self.sink.close().await?;
        Ok(summary)
    }

    /// Index only the title-basics dataset.
    pub async fn run_titles_only(&self) -> Result<RunSummary> {
        let caches = Arc::new(RunCaches::new(NameCache::default()));
        let mut summary = RunSummary::default();
        summary.stages.push(self.index_title_basics(caches).await?);
        self.sink.close().await?;
        Ok(summary)
    }

    /// Index only the principal-cast dataset. Without a basics stage in the
    /// same run the title cache stays empty, so every movie title resolves
    /// to absent; person names still resolve through the name cache.
    pub async fn run_principals_only(&self) -> Result<RunSummary> {
        let names = self.build_name_cache().await?;
        let caches = Arc::new(RunCaches::new(names));
        let mut summary = RunSummary::default();
        summary
            .stages
            .push(self.index_title_principals(caches).await?);
        self.sink.close().await?;
        Ok(summary)
    }

    /// Build the person-id → display-name mapping from the full people
    /// dataset. Must complete before any dependent decoding starts; the
    /// mapping is read-only afterwards.
    async fn build_name_cache(&self) -> Result<NameCache> {
        info!("Preparing name cache...");
        println!("📇 Preparing name cache...");
        let path = self.config.ingest.name_basics_path();
        let started = Instant::now();

        let cache = tokio::task::spawn_blocking(move || -> Result<NameCache> {
            let lines = GzipLines::open(&path)?;
            NameCache::from_lines(lines)
        })
        .await
        .map_err(|e| IndexerError::Worker(e.to_string()))??;

        histogram!("imdb_name_cache_build_seconds").record(started.elapsed().as_secs_f64());
        info!("Name cache ready ({} people)", cache.len());
        println!("✅ Name cache ready ({} people)", cache.len());
        Ok(cache)
    }

    async fn index_title_basics(&self, caches: Arc<RunCaches>) -> Result<StageSummary> {
        info!("Indexing titles basic info...");
        println!("🎬 Indexing titles basic info...");
        let schema = self.config.ingest.title_span;
        let decode = move |line: &str| -> Result<String> {
            let record = decode_basic(line, &caches, schema)?;
            Ok(serde_json::to_string(&record)?)
        };

        let summary = self
            .index_dataset(
                self.config.ingest.title_basics_path(),
                BASIC_TITLE_INFO_COLLECTION,
                decode,
            )
            .await?;
        println!(
            "✅ Titles basic info indexed, collection: {}",
            BASIC_TITLE_INFO_COLLECTION
        );
        Ok(summary)
    }

    async fn index_title_principals(&self, caches: Arc<RunCaches>) -> Result<StageSummary> {
        info!("Indexing principal cast...");
        println!("🎭 Indexing principal cast...");
        let decode = move |line: &str| -> Result<String> {
            let record = decode_principal(line, &caches)?;
            Ok(serde_json::to_string(&record)?)
        };

        let summary = self
            .index_dataset(
                self.config.ingest.title_principals_path(),
                PRINCIPAL_CAST_COLLECTION,
                decode,
            )
            .await?;
        println!(
            "✅ Principal cast indexed, collection: {}",
            PRINCIPAL_CAST_COLLECTION
        );
        Ok(summary)
    }

    /// Stream one dataset end to end: skip the header line, decode and
    /// serialize records chunk by chunk on the worker pool (order within a
    /// chunk is preserved by the ordered collect), group into batches, and
    /// hand full batches to a single submit lane. The capacity-one channel
    /// buffers at most one complete batch, so a blocked bulk call never
    /// stalls decoding of later lines by more than that.
    #[instrument(skip(self, decode, path))]
    async fn index_dataset<F>(
        &self,
        path: PathBuf,
        collection: &'static str,
        decode: F,
    ) -> Result<StageSummary>
    where
        F: Fn(&str) -> Result<String> + Send + Sync + 'static,
    {
        let batch_size = self.config.ingest.batch_size;
        let dataset = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let started = Instant::now();

        let (tx, mut rx) = mpsc::channel::<Vec<String>>(1);

        let producer_dataset = dataset.clone();
        let producer = tokio::task::spawn_blocking(move || -> Result<(usize, usize)> {
            let mut lines = GzipLines::open(&path)?;
            // Header line is not a record.
            if let Some(header) = lines.next() {
                header?;
            }

            let mut processed = 0usize;
            let mut skipped = 0usize;
            let mut batcher = Batcher::new(batch_size);
            let mut chunk: Vec<String> = Vec::with_capacity(batch_size);
            let mut exhausted = false;

            'stream: while !exhausted {
                chunk.clear();
                while chunk.len() < batch_size {
                    match lines.next() {
                        Some(line) => chunk.push(line?),
                        None => {
                            exhausted = true;
                            break;
                        }
                    }
                }

                let decoded: Vec<Result<String>> =
                    chunk.par_iter().map(|line| decode(line.as_str())).collect();
                for result in decoded {
                    match result {
                        Ok(document) => {
                            processed += 1;
                            if let Some(batch) = batcher.push(document) {
                                if tx.blocking_send(batch).is_err() {
                                    // Submit lane is gone; stop issuing batches.
                                    break 'stream;
                                }
                            }
                        }
                        Err(e) => {
                            skipped += 1;
                            warn!("Skipping record in {}: {}", producer_dataset, e);
                        }
                    }
                }
            }

            if let Some(batch) = batcher.finish() {
                let _ = tx.blocking_send(batch);
            }
            Ok((processed, skipped))
        });

        let mut batches_submitted = 0usize;
        let mut batches_failed = 0usize;
        let mut next_record = 1usize;
        while let Some(batch) = rx.recv().await {
            let first = next_record;
            let last = first + batch.len() - 1;
            next_record = last + 1;
            match self.sink.submit(collection, &batch).await {
                Ok(()) => {
                    batches_submitted += 1;
                    counter!("imdb_batches_submitted_total", "collection" => collection)
                        .increment(1);
                    info!(
                        "Submitted {} documents (records {}-{}) to {}",
                        batch.len(),
                        first,
                        last,
                        collection
                    );
                }
                Err(e) => {
                    batches_failed += 1;
                    counter!("imdb_batches_failed_total", "collection" => collection).increment(1);
                    error!(
                        "Bulk submission of records {}-{} to {} failed: {}",
                        first, last, collection, e
                    );
                    println!(
                        "⚠️  Bulk submission of records {first}-{last} to {collection} failed: {e}"
                    );
                }
            }
        }

        let (records_processed, records_skipped) = producer
            .await
            .map_err(|e| IndexerError::Worker(e.to_string()))??;

        counter!("imdb_records_processed_total", "collection" => collection)
            .increment(records_processed as u64);
        counter!("imdb_records_skipped_total", "collection" => collection)
            .increment(records_skipped as u64);
        histogram!("imdb_stage_duration_seconds", "collection" => collection)
            .record(started.elapsed().as_secs_f64());

        info!(
            "Indexed {} ({} records, {} skipped, {} batches submitted, {} failed)",
            dataset, records_processed, records_skipped, batches_submitted, batches_failed
        );

        Ok(StageSummary {
            dataset,
            collection: collection.to_string(),
            records_processed,
            records_skipped,
            batches_submitted,
            batches_failed,
        })
    }
}
