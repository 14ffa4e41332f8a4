use std::{
    sync::atomic::AtomicBool,
    time::Instant,
};

use chrono::{
    DateTime,
    Utc,
};
use rayon::iter::{
    IntoParallelRefIterator,
    ParallelIterator,
};

use crate::{
    assembly::{
        Card,
        CardAssembler,
        FieldSchema,
    },
    core::{
        models::Tier,
        Record,
    },
    grammar::GrammarPatternEngine,
    media::{
        CacheStats,
        EnrichedRecord,
        MediaEnricher,
    },
};

#[derive(Debug, Clone)]
pub struct RecordFailure {
    pub term: String,
    pub reason: String,
}

/// One pattern of an otherwise healthy record that could not be synthesized.
#[derive(Debug, Clone)]
pub struct PatternIssue {
    pub term: String,
    pub pattern: String,
    pub reason: String,
}

/// The partitioned outcome of one batch: complete cards, cards degraded by a
/// missing media slot, and records that failed outright, with reasons. A
/// batch never collapses into an all-or-nothing result.
#[derive(Debug)]
pub struct BatchReport {
    pub complete: Vec<Card>,
    pub degraded: Vec<Card>,
    pub failures: Vec<RecordFailure>,
    pub pattern_issues: Vec<PatternIssue>,
    pub cancelled: bool,
    pub cache: CacheStats,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    pub fn total_cards(&self) -> usize {
        self.complete.len() + self.degraded.len()
    }
}

/// Run the full batch: validate, enrich, synthesize, assemble, partition.
///
/// Per-record failures never abort the batch. Cancellation is honored
/// between records: whatever media was already committed to the cache stays
/// valid, so a retry resumes with cache hits instead of provider calls.
pub async fn process_batch(
    records: &[Record],
    enricher: &MediaEnricher,
    engine: &GrammarPatternEngine,
    schema: &FieldSchema,
    tier: Tier,
    cancel: Option<&AtomicBool>,
) -> BatchReport {
    let start = Instant::now();

    let mut failures = Vec::new();
    let mut valid: Vec<&Record> = Vec::new();
    for record in records {
        match record.validate() {
            Ok(()) => valid.push(record),
            Err(e) => failures.push(RecordFailure {
                term: record.term().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    let enrich_start = Instant::now();
    let (enriched, cancelled) = enricher.enrich_batch(&valid, cancel).await;
    println!(
        "Enriched {}/{} records ({:.1}s)",
        enriched.len(),
        valid.len(),
        enrich_start.elapsed().as_secs_f32()
    );

    // Everything from here is pure compute; fan out across records. Rayon
    // keeps collect order aligned with input order, so card order stays
    // deterministic.
    let outcomes: Vec<RecordOutcome> = enriched
        .par_iter()
        .map(|enriched| synthesize_record(enriched, engine, schema, tier))
        .collect();

    let mut complete = Vec::new();
    let mut degraded = Vec::new();
    let mut pattern_issues = Vec::new();
    for outcome in outcomes {
        match outcome.failure {
            Some(failure) => failures.push(failure),
            None => {
                if outcome.degraded {
                    degraded.extend(outcome.cards);
                } else {
                    complete.extend(outcome.cards);
                }
            }
        }
        pattern_issues.extend(outcome.issues);
    }

    let report = BatchReport {
        complete,
        degraded,
        failures,
        pattern_issues,
        cancelled,
        cache: enricher.cache().stats(),
        finished_at: Utc::now(),
    };

    println!(
        "Batch finished: {} cards ({} complete, {} degraded), {} failed records, {} pattern issues ({:.1}s)",
        report.total_cards(),
        report.complete.len(),
        report.degraded.len(),
        report.failures.len(),
        report.pattern_issues.len(),
        start.elapsed().as_secs_f32()
    );
    println!("Media cache: {} hits, {} misses", report.cache.hits, report.cache.misses);
    for failure in &report.failures {
        eprintln!("  failed '{}': {}", failure.term, failure.reason);
    }
    if report.cancelled {
        println!("Batch was cancelled; stored media stays valid for a retry.");
    }

    report
}

struct RecordOutcome {
    cards: Vec<Card>,
    degraded: bool,
    issues: Vec<PatternIssue>,
    failure: Option<RecordFailure>,
}

fn synthesize_record(
    enriched: &EnrichedRecord<'_>,
    engine: &GrammarPatternEngine,
    schema: &FieldSchema,
    tier: Tier,
) -> RecordOutcome {
    let term = enriched.record.term().to_string();
    let source = enriched.record.model();
    let synthesis = engine.synthesize(source.as_ref(), tier);

    let issues = synthesis
        .failures
        .iter()
        .map(|f| PatternIssue {
            term: term.clone(),
            pattern: f.label.clone(),
            reason: f.error.to_string(),
        })
        .collect();

    let mut cards = Vec::with_capacity(synthesis.specs.len());
    for spec in &synthesis.specs {
        match CardAssembler::assemble(spec, enriched, schema) {
            Ok(card) => cards.push(card),
            // A schema the assembler cannot satisfy is a contract violation;
            // the whole record fails rather than shipping half its cards.
            Err(e) => {
                return RecordOutcome {
                    cards: Vec::new(),
                    degraded: false,
                    issues,
                    failure: Some(RecordFailure { term, reason: e.to_string() }),
                };
            }
        }
    }

    RecordOutcome { cards, degraded: enriched.is_degraded(), issues, failure: None }
}
