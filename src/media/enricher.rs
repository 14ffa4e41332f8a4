use std::{
    collections::{
        BTreeMap,
        HashMap,
    },
    sync::{
        atomic::{
            AtomicBool,
            Ordering,
        },
        Arc,
        Mutex,
    },
};

use futures::{
    stream,
    StreamExt,
};
use tokio::sync::Mutex as AsyncMutex;

use super::{
    cache::MediaCache,
    providers::{
        ImageSearchProvider,
        QueryTranslationProvider,
        TextToSpeechProvider,
    },
    EnrichedRecord,
    EnrichmentWarning,
    MediaAsset,
    MediaKind,
    MediaSlot,
};
use crate::{
    core::{
        Record,
        WortkartenError,
    },
    domain::CardSource,
};

const DEFAULT_CONCURRENCY: usize = 4;

/// One async mutex per cache key, handed out on demand. Serializes first-time
/// generation so concurrent requests for identical content produce exactly
/// one provider call; everyone after the winner sees a cache hit.
#[derive(Default)]
struct KeyLocks {
    inner: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl KeyLocks {
    fn for_key(&self, key: &str) -> Arc<AsyncMutex<()>> {
        let mut map = self.inner.lock().expect("key lock map poisoned");
        map.entry(key.to_string()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
    }
}

/// Resolves each record's media slots through the cache, calling the injected
/// providers only on a miss. Provider references are passed in at
/// construction; there is no ambient lookup.
pub struct MediaEnricher {
    cache: Arc<MediaCache>,
    tts: Arc<dyn TextToSpeechProvider>,
    images: Arc<dyn ImageSearchProvider>,
    translator: Option<Arc<dyn QueryTranslationProvider>>,
    locks: KeyLocks,
    concurrency: usize,
}

impl MediaEnricher {
    pub fn new(
        cache: Arc<MediaCache>,
        tts: Arc<dyn TextToSpeechProvider>,
        images: Arc<dyn ImageSearchProvider>,
    ) -> Self {
        Self {
            cache,
            tts,
            images,
            translator: None,
            locks: KeyLocks::default(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_translator(mut self, translator: Arc<dyn QueryTranslationProvider>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn cache(&self) -> &MediaCache {
        &self.cache
    }

    /// Fill the media slots for one record. A provider failure leaves its
    /// slot absent and records a warning; it never fails the record.
    pub async fn enrich<'a>(&self, record: &'a Record) -> EnrichedRecord<'a> {
        let source = record.model();
        let mut media = BTreeMap::new();
        let mut warnings = Vec::new();

        if let Some(text) = source.audio_text() {
            match self.resolve_audio(&text).await {
                Ok(asset) => {
                    media.insert(MediaSlot::TermAudio, asset);
                }
                Err(e) => warn(&mut warnings, record, MediaSlot::TermAudio, e),
            }
        }

        if let Some(text) = source.example_audio_text() {
            match self.resolve_audio(&text).await {
                Ok(asset) => {
                    media.insert(MediaSlot::ExampleAudio, asset);
                }
                Err(e) => warn(&mut warnings, record, MediaSlot::ExampleAudio, e),
            }
        }

        match self.image_query(source.as_ref()).await {
            Ok(Some(query)) => match self.resolve_image(&query).await {
                Ok(asset) => {
                    media.insert(MediaSlot::Illustration, asset);
                }
                Err(e) => warn(&mut warnings, record, MediaSlot::Illustration, e),
            },
            Ok(None) => {}
            Err(e) => warn(&mut warnings, record, MediaSlot::Illustration, e),
        }

        EnrichedRecord { record, media, warnings }
    }

    /// Enrich a batch with bounded provider concurrency. Records finish in
    /// any order; results come back in input order. When the cancel flag
    /// trips, in-flight enrichment is dropped with the stream and whatever
    /// was already committed to the cache stays valid for a retry.
    pub async fn enrich_batch<'a>(
        &self,
        records: &[&'a Record],
        cancel: Option<&AtomicBool>,
    ) -> (Vec<EnrichedRecord<'a>>, bool) {
        let is_cancelled = || cancel.map(|c| c.load(Ordering::Relaxed)).unwrap_or(false);
        if is_cancelled() {
            return (Vec::new(), true);
        }

        let mut indexed: Vec<(usize, EnrichedRecord<'a>)> = Vec::with_capacity(records.len());
        let mut cancelled = false;

        {
            let mut stream = stream::iter(
                records
                    .iter()
                    .copied()
                    .enumerate()
                    .map(|(i, record)| async move { (i, self.enrich(record).await) }),
            )
            .buffer_unordered(self.concurrency);

            while let Some(item) = stream.next().await {
                indexed.push(item);
                if is_cancelled() {
                    cancelled = true;
                    break;
                }
            }
        }

        indexed.sort_by_key(|(i, _)| *i);
        (indexed.into_iter().map(|(_, enriched)| enriched).collect(), cancelled)
    }

    async fn resolve_audio(&self, text: &str) -> Result<MediaAsset, WortkartenError> {
        let key = MediaCache::audio_key(text);
        let lock = self.locks.for_key(&key);
        let _guard = lock.lock().await;

        if let Some(asset) = self.cache.lookup(MediaKind::Audio, &key) {
            return Ok(asset);
        }

        let bytes = self.tts.synthesize(text).await?;
        self.cache.store(MediaKind::Audio, &key, &bytes)
    }

    async fn resolve_image(&self, query: &str) -> Result<MediaAsset, WortkartenError> {
        let key = MediaCache::image_key(query);
        let lock = self.locks.for_key(&key);
        let _guard = lock.lock().await;

        if let Some(asset) = self.cache.lookup(MediaKind::Image, &key) {
            return Ok(asset);
        }

        let bytes = self.images.search(query).await?;
        self.cache.store(MediaKind::Image, &key, &bytes)
    }

    async fn image_query(
        &self,
        source: &dyn CardSource,
    ) -> Result<Option<String>, WortkartenError> {
        if let Some(terms) = source.image_search_terms() {
            return Ok(Some(terms));
        }

        let (Some(translator), Some(hint)) = (self.translator.as_ref(), source.context_hint())
        else {
            return Ok(None);
        };

        translator.derive_search_terms(hint).await.map(Some)
    }
}

fn warn(
    warnings: &mut Vec<EnrichmentWarning>,
    record: &Record,
    slot: MediaSlot,
    error: WortkartenError,
) {
    eprintln!("'{}': {} unresolved: {}", record.term(), slot.label(), error);
    warnings.push(EnrichmentWarning { slot, reason: error.to_string() });
}
