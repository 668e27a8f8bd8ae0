//! The reconciliation pipeline.

use crate::{CancelHandle, ReconcilerConfig};
use async_trait::async_trait;
use std::collections::HashMap;
use tessera_core::{
    BatchResult, CompletionRequest, CompletionResponse, Confidence, Contradiction,
    ResolutionResult, Storyline, TimelineEvent,
};
use tessera_error::{
    ProviderError, ProviderErrorKind, ReconcileError, ReconcileErrorKind, TesseraResult,
};
use tessera_ingest::{BatchMeta, IngestOutcome, ingest_batch};
use tessera_interface::{Arbiter, ArbiterDriver};
use tessera_merge::{
    Dedupable, Deduper, DedupOutcome, DuplicateRecord, apply_event_resolution,
    detect_event_contradictions, event_similarity, resolve, resolve_heuristic,
};
use tessera_provenance::{AuditReport, AuditTrail};
use tessera_timeline::{
    CausalGraph, Coverage, OrderingDiscrepancy, analyze_with, detect_gaps,
    ordering_discrepancies, stitch_events,
};
use tracing::{debug, info, warn};

/// Placeholder driver for heuristic-only reconciliation.
///
/// Every call fails fast, so any code path that would arbitrate degrades to
/// its heuristic branch instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDriver;

#[async_trait]
impl ArbiterDriver for NoDriver {
    async fn complete(&self, _req: &CompletionRequest) -> TesseraResult<CompletionResponse> {
        Err(ProviderError::new(ProviderErrorKind::Failed(
            "no arbitration driver configured".to_string(),
        )))?
    }

    fn provider_name(&self) -> &'static str {
        "none"
    }

    fn model_name(&self) -> &str {
        "none"
    }
}

/// Orchestrates ingestion, merging, and analysis across extraction batches.
///
/// Batches arrive in any order, raw or already typed. Ingestion is pure and
/// may run concurrently; the merge pass is serialized and single-writer.
/// Reconciliation is re-runnable: each [`reconcile`](Self::reconcile) rebuilds
/// the storyline from every batch accepted so far.
///
/// # Examples
///
/// ```rust,ignore
/// let mut reconciler = Reconciler::new(ReconcilerConfig::default());
/// reconciler.add_raw(response_text, 0, 1, 20)?;
/// reconciler.reconcile().await?;
/// let storyline = reconciler.storyline();
/// ```
#[derive(Debug)]
pub struct Reconciler<D: ArbiterDriver = NoDriver> {
    config: ReconcilerConfig,
    arbiter: Option<Arbiter<D>>,
    cancel: CancelHandle,
    batches: Vec<BatchResult>,
    trail: AuditTrail,
    storyline: Storyline,
    coverage: Coverage,
    causal: CausalGraph,
    resolutions: Vec<ResolutionResult>,
    discrepancies: Vec<OrderingDiscrepancy>,
}

impl Reconciler<NoDriver> {
    /// Create a heuristic-only reconciler.
    pub fn new(config: ReconcilerConfig) -> Self {
        Self {
            config,
            arbiter: None,
            cancel: CancelHandle::new(),
            batches: Vec::new(),
            trail: AuditTrail::new(),
            storyline: Storyline::default(),
            coverage: Coverage::default(),
            causal: CausalGraph::default(),
            resolutions: Vec::new(),
            discrepancies: Vec::new(),
        }
    }
}

impl<D: ArbiterDriver> Reconciler<D> {
    /// Attach an arbiter; the middle dedup band and undecided contradictions
    /// will be escalated to it.
    pub fn with_arbiter<E: ArbiterDriver>(self, arbiter: Arbiter<E>) -> Reconciler<E> {
        Reconciler {
            config: self.config,
            arbiter: Some(arbiter),
            cancel: self.cancel,
            batches: self.batches,
            trail: self.trail,
            storyline: self.storyline,
            coverage: self.coverage,
            causal: self.causal,
            resolutions: self.resolutions,
            discrepancies: self.discrepancies,
        }
    }

    /// Use an external cancellation handle.
    pub fn with_cancel_handle(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    /// A handle that cancels this reconciler's next stage boundary.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// The active configuration.
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Batches accepted so far.
    pub fn batches(&self) -> &[BatchResult] {
        &self.batches
    }

    /// The merged storyline from the last [`reconcile`](Self::reconcile).
    pub fn storyline(&self) -> &Storyline {
        &self.storyline
    }

    /// Batch coverage from the last reconcile.
    pub fn coverage(&self) -> &Coverage {
        &self.coverage
    }

    /// Causal graph from the last reconcile.
    pub fn causal(&self) -> &CausalGraph {
        &self.causal
    }

    /// Contradiction resolutions from the last reconcile.
    pub fn resolutions(&self) -> &[ResolutionResult] {
        &self.resolutions
    }

    /// Reading/chronological ordering disagreements from the last reconcile.
    pub fn discrepancies(&self) -> &[OrderingDiscrepancy] {
        &self.discrepancies
    }

    /// The audit trail.
    pub fn trail(&self) -> &AuditTrail {
        &self.trail
    }

    /// Every projection view over the current storyline.
    pub fn views(&self) -> crate::views::StoryViews {
        crate::views::StoryViews::build(&self.storyline, &self.causal)
    }

    /// Accept an already-typed batch.
    ///
    /// # Errors
    ///
    /// Fails on an inverted page range or a finalized trail.
    pub fn add_batch(&mut self, batch: BatchResult) -> TesseraResult<()> {
        if batch.start_page > batch.end_page {
            Err(ReconcileError::new(ReconcileErrorKind::InvalidRange {
                batch_index: batch.batch_index,
                start_page: batch.start_page,
                end_page: batch.end_page,
            }))?;
        }
        self.trail.record_extraction(
            format!(
                "batch {} covering pages {}..={}",
                batch.batch_index, batch.start_page, batch.end_page
            ),
            entity_ids(&batch),
        )?;
        debug!(
            batch = batch.batch_index,
            entities = batch.entity_count(),
            "Batch accepted"
        );
        self.batches.push(batch);
        Ok(())
    }

    /// Ingest raw model text as a batch.
    ///
    /// Validation failures degrade the batch (lowered confidence, validation
    /// provenance entry) rather than rejecting it.
    ///
    /// # Errors
    ///
    /// Fails when no payload can be recovered from the text at all, or on a
    /// missing migration path.
    pub fn add_raw(
        &mut self,
        raw: &str,
        batch_index: u32,
        start_page: u32,
        end_page: u32,
    ) -> TesseraResult<()> {
        let meta = BatchMeta {
            batch_index,
            start_page,
            end_page,
        };
        match ingest_batch(raw, &meta) {
            Ok(outcome) => self.accept(outcome),
            Err(e) => {
                self.trail.record_validation(
                    format!("batch {batch_index} unrecoverable: {e}"),
                    Vec::new(),
                )?;
                Err(e)
            }
        }
    }

    /// Ingest several raw batches concurrently.
    ///
    /// Ingestion is pure, so batches are parsed on blocking worker threads in
    /// parallel; acceptance back into the reconciler stays serialized. A batch
    /// that fails to ingest is recorded and skipped, never aborting the rest.
    ///
    /// # Errors
    ///
    /// Fails only when the audit trail is finalized.
    #[tracing::instrument(skip_all, fields(batches = inputs.len()))]
    pub async fn ingest_concurrent(
        &mut self,
        inputs: Vec<(String, BatchMeta)>,
    ) -> TesseraResult<()> {
        let tasks: Vec<_> = inputs
            .into_iter()
            .map(|(raw, meta)| tokio::task::spawn_blocking(move || ingest_batch(&raw, &meta)))
            .collect();

        for joined in futures::future::join_all(tasks).await {
            match joined {
                Ok(Ok(outcome)) => self.accept(outcome)?,
                Ok(Err(e)) => {
                    warn!(error = %e, "Batch failed ingestion, skipping");
                    self.trail
                        .record_validation(format!("batch skipped: {e}"), Vec::new())?;
                }
                Err(e) => {
                    warn!(error = %e, "Ingestion task failed, skipping");
                    self.trail
                        .record_validation(format!("ingestion task failed: {e}"), Vec::new())?;
                }
            }
        }
        Ok(())
    }

    fn accept(&mut self, outcome: IngestOutcome) -> TesseraResult<()> {
        let degraded = outcome.is_degraded();
        let mut batch = outcome.batch;
        if degraded {
            // Excluded entities make the whole batch less trustworthy.
            batch.confidence = Confidence::new(batch.confidence.value() * 0.5);
            self.trail.record_validation(
                format!(
                    "batch {} degraded: {} entities excluded",
                    batch.batch_index,
                    outcome.errors.len()
                ),
                entity_ids(&batch),
            )?;
        }
        self.add_batch(batch)
    }

    /// Run the serialized merge pass over every accepted batch.
    ///
    /// Stages: coverage analysis, overlap stitching, contradiction
    /// resolution, deduplication, causal graph construction, ordering
    /// analysis. Cancellation is checked at each stage boundary; stopping
    /// leaves the previous storyline intact and the trail open.
    ///
    /// # Errors
    ///
    /// Fails when no batches were supplied or when cancelled.
    #[tracing::instrument(skip_all, fields(batches = self.batches.len()))]
    pub async fn reconcile(&mut self) -> TesseraResult<()> {
        if self.batches.is_empty() {
            Err(ReconcileError::new(ReconcileErrorKind::NoBatches))?;
        }
        self.resolutions.clear();

        self.checkpoint("coverage")?;
        self.coverage = analyze_with(&self.batches, &self.config.coverage);

        self.checkpoint("stitch")?;
        let mut ordered = self.batches.clone();
        ordered.sort_by_key(|b| (b.start_page, b.end_page));

        let mut confidences: HashMap<String, Confidence> = HashMap::new();
        let mut events: Vec<TimelineEvent> = Vec::new();
        let mut characters = Vec::new();
        let mut themes = Vec::new();
        let mut relationships = Vec::new();
        for batch in ordered {
            for event in &batch.events {
                confidences.insert(event.id.clone(), batch.confidence);
            }
            events = stitch_events(events, batch.events, &self.config.coverage);
            characters.extend(batch.characters);
            themes.extend(batch.themes);
            relationships.extend(batch.relationships);
        }

        self.checkpoint("contradictions")?;
        events = self.resolve_event_conflicts(events, &confidences).await?;

        self.checkpoint("dedup")?;
        let deduper = Deduper::new(self.config.dedup);
        let characters = self.dedupe_stage(&deduper, "characters", characters).await?;
        let events = self.dedupe_stage(&deduper, "events", events).await?;
        let themes = self.dedupe_stage(&deduper, "themes", themes).await?;
        let relationships = self
            .dedupe_stage(&deduper, "relationships", relationships)
            .await?;

        self.checkpoint("causal")?;
        self.causal = CausalGraph::build(&events, &self.config.causal);

        self.checkpoint("ordering")?;
        self.discrepancies = ordering_discrepancies(&events, self.config.ordering_tolerance);

        let mut gaps = self.coverage.gaps.clone();
        for gap in detect_gaps(&events, self.config.coverage.min_gap_size) {
            let covered = gaps
                .iter()
                .any(|g| g.start_page <= gap.end_page && gap.start_page <= g.end_page);
            if !covered {
                gaps.push(gap);
            }
        }

        let mut storyline = Storyline {
            characters,
            timeline: events,
            themes,
            relationships,
            gaps,
        };
        storyline.characters.sort_by_key(|c| c.first_appearance);
        storyline.timeline.sort_by_key(|e| e.page_number);
        storyline.themes.sort_by(|a, b| a.name.cmp(&b.name));
        storyline.relationships.sort_by_key(|r| r.first_page);
        info!(
            entities = storyline.entity_count(),
            resolutions = self.resolutions.len(),
            "Reconciliation complete"
        );
        self.storyline = storyline;
        Ok(())
    }

    /// Close the run: record the export, finalize the trail, and summarize.
    ///
    /// # Errors
    ///
    /// Fails when the trail was already finalized.
    pub fn finish(&mut self) -> TesseraResult<AuditReport> {
        let mut ids: Vec<String> = self.storyline.characters.iter().map(|c| c.id.clone()).collect();
        ids.extend(self.storyline.timeline.iter().map(|e| e.id.clone()));
        ids.extend(self.storyline.themes.iter().map(|t| t.id.clone()));
        ids.extend(self.storyline.relationships.iter().map(|r| r.id.clone()));

        self.trail.record_export(
            format!("storyline with {} entities", self.storyline.entity_count()),
            ids,
        )?;
        self.trail.finalize()?;
        Ok(self.trail.export_report())
    }

    fn checkpoint(&self, stage: &str) -> TesseraResult<()> {
        if self.cancel.is_cancelled() {
            Err(ReconcileError::new(ReconcileErrorKind::Cancelled {
                stage: stage.to_string(),
            }))?;
        }
        Ok(())
    }

    /// Find matched event pairs with conflicting facts and resolve them.
    ///
    /// Runs to a fixpoint: each resolution replaces the pair with one event,
    /// which may itself conflict with another record.
    async fn resolve_event_conflicts(
        &mut self,
        mut events: Vec<TimelineEvent>,
        confidences: &HashMap<String, Confidence>,
    ) -> TesseraResult<Vec<TimelineEvent>> {
        loop {
            let Some((i, j, contradiction)) = self.next_conflict(&events) else {
                break;
            };
            // j > i, so remove j first
            let b = events.swap_remove(j);
            let a = events.swap_remove(i);
            let confidence_a = confidences.get(&a.id).copied().unwrap_or_default();
            let confidence_b = confidences.get(&b.id).copied().unwrap_or_default();

            let result = match &self.arbiter {
                Some(arbiter) => {
                    resolve(
                        &contradiction,
                        &event_summary(&a),
                        &event_summary(&b),
                        confidence_a,
                        confidence_b,
                        arbiter,
                        &self.config.contradiction,
                    )
                    .await
                }
                None => resolve_heuristic(
                    &contradiction,
                    confidence_a,
                    confidence_b,
                    &self.config.contradiction,
                ),
            };

            self.trail.record_merge(
                format!(
                    "resolved {} contradiction as {}: {}",
                    contradiction.kind, result.resolution, result.reasoning
                ),
                vec![a.id.clone(), b.id.clone()],
            )?;
            let kept = apply_event_resolution(&result, a, b);
            self.resolutions.push(result);
            events.push(kept);
        }
        Ok(events)
    }

    /// First matched pair with a detectable contradiction, most severe first.
    fn next_conflict(&self, events: &[TimelineEvent]) -> Option<(usize, usize, Contradiction)> {
        for i in 0..events.len() {
            for j in (i + 1)..events.len() {
                let score = event_similarity(&events[i], &events[j], &self.config.dedup);
                if score < self.config.dedup.merge_threshold {
                    continue;
                }
                let mut found =
                    detect_event_contradictions(&events[i], &events[j], &self.config.contradiction);
                if found.is_empty() {
                    continue;
                }
                found.sort_by_key(|c| std::cmp::Reverse(c.severity));
                return Some((i, j, found.swap_remove(0)));
            }
        }
        None
    }

    async fn dedupe_stage<T: Dedupable>(
        &mut self,
        deduper: &Deduper,
        label: &str,
        items: Vec<T>,
    ) -> TesseraResult<Vec<T>> {
        let outcome: DedupOutcome<T> = match &self.arbiter {
            Some(arbiter) => deduper.dedupe_with_arbiter(items, arbiter).await,
            None => deduper.dedupe(items),
        };
        self.note_merges(label, &outcome.duplicates)?;
        Ok(outcome.unique)
    }

    fn note_merges(&mut self, label: &str, duplicates: &[DuplicateRecord]) -> TesseraResult<()> {
        for record in duplicates {
            self.trail.record_merge(
                format!(
                    "{label}: {} absorbed {} ({})",
                    record.kept, record.removed, record.reason
                ),
                vec![record.kept.clone(), record.removed.clone()],
            )?;
        }
        Ok(())
    }
}

fn entity_ids(batch: &BatchResult) -> Vec<String> {
    let mut ids: Vec<String> = batch.characters.iter().map(|c| c.id.clone()).collect();
    ids.extend(batch.events.iter().map(|e| e.id.clone()));
    ids.extend(batch.themes.iter().map(|t| t.id.clone()));
    ids.extend(batch.relationships.iter().map(|r| r.id.clone()));
    ids
}

fn event_summary(event: &TimelineEvent) -> String {
    format!(
        "page {}, {} significance: {}: {}",
        event.page_number, event.significance, event.title, event.description
    )
}
