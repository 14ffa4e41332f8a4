#[cfg(test)]
mod tests {
    use std::{
        collections::BTreeMap,
        sync::{
            atomic::{
                AtomicBool,
                AtomicUsize,
                Ordering,
            },
            Arc,
        },
    };

    use async_trait::async_trait;

    use crate::{
        assembly::FieldSchema,
        core::{
            models::{
                Case,
                Classification,
                ClozeExample,
                Gender,
                NounRecord,
                Paradigm,
                Person,
                Record,
                Tense,
                Tier,
                VerbRecord,
            },
            pipeline::process_batch,
            WortkartenError,
        },
        grammar::GrammarPatternEngine,
        media::{
            providers::{
                ImageSearchProvider,
                TextToSpeechProvider,
            },
            MediaCache,
            MediaEnricher,
        },
    };

    struct CountingTts {
        calls: AtomicUsize,
    }

    impl CountingTts {
        fn new() -> Arc<Self> {
            Arc::new(Self { calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl TextToSpeechProvider for CountingTts {
        async fn synthesize(&self, text: &str) -> Result<Vec<u8>, WortkartenError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("AUDIO:{}", text).into_bytes())
        }
    }

    struct CountingImages {
        calls: AtomicUsize,
    }

    impl CountingImages {
        fn new() -> Arc<Self> {
            Arc::new(Self { calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl ImageSearchProvider for CountingImages {
        async fn search(&self, query: &str) -> Result<Vec<u8>, WortkartenError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("IMAGE:{}", query).into_bytes())
        }
    }

    struct FailingImages;

    #[async_trait]
    impl ImageSearchProvider for FailingImages {
        async fn search(&self, _query: &str) -> Result<Vec<u8>, WortkartenError> {
            Err(WortkartenError::provider("image-search", "offline"))
        }
    }

    fn example(sentence: &str, target: &str) -> ClozeExample {
        ClozeExample { sentence: sentence.to_string(), target: target.to_string() }
    }

    fn mann() -> Record {
        let mut case_examples = BTreeMap::new();
        case_examples.insert(Case::Nominative, example("Der Mann arbeitet hier", "der"));
        case_examples.insert(Case::Accusative, example("Ich sehe den Mann", "den"));
        Record::Noun(NounRecord {
            word: "Mann".to_string(),
            gender: Gender::Masculine,
            plural: Some("Männer".to_string()),
            meaning: "man".to_string(),
            case_examples,
            gender_example: None,
            image_terms: None,
            context_hint: None,
        })
    }

    fn sprechen() -> Record {
        let present = Paradigm {
            forms: BTreeMap::from([
                (Person::Ich, "spreche".to_string()),
                (Person::Du, "sprichst".to_string()),
                (Person::Er, "spricht".to_string()),
                (Person::Wir, "sprechen".to_string()),
                (Person::Ihr, "sprecht".to_string()),
                (Person::Sie, "sprechen".to_string()),
            ]),
        };
        Record::Verb(VerbRecord {
            infinitive: "sprechen".to_string(),
            meaning: "to speak".to_string(),
            classification: Classification::Irregular,
            stem_forms: None,
            paradigms: BTreeMap::from([(Tense::Present, present)]),
            example_sentence: None,
            image_terms: None,
            context_hint: None,
        })
    }

    fn broken() -> Record {
        Record::Noun(NounRecord {
            word: "Haus".to_string(),
            gender: Gender::Neuter,
            plural: None,
            meaning: "  ".to_string(),
            case_examples: BTreeMap::new(),
            gender_example: None,
            image_terms: None,
            context_hint: None,
        })
    }

    #[tokio::test]
    async fn batch_partitions_into_complete_degraded_and_failed() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(MediaCache::open(dir.path()).unwrap());
        let tts = CountingTts::new();
        let enricher = MediaEnricher::new(cache, tts.clone(), Arc::new(FailingImages));
        let engine = GrammarPatternEngine::with_defaults();
        let schema = FieldSchema::standard();

        let records = vec![mann(), sprechen(), broken()];
        let report =
            process_batch(&records, &enricher, &engine, &schema, Tier::A1, None).await;

        // The noun lost only its image; its cards land in the degraded
        // bucket. The verb never asked for an image and stays complete.
        assert!(!report.cancelled);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].term, "Haus");
        // Noun at A1: meaning + nominative + accusative cloze.
        assert_eq!(report.degraded.len(), 3);
        // Verb at A1: meaning + present drill.
        assert_eq!(report.complete.len(), 2);
        assert!(report.pattern_issues.is_empty());
    }

    #[tokio::test]
    async fn rerun_resolves_everything_from_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![mann(), sprechen()];
        let engine = GrammarPatternEngine::with_defaults();
        let schema = FieldSchema::standard();

        let first_audio;
        {
            let cache = Arc::new(MediaCache::open(dir.path()).unwrap());
            let tts = CountingTts::new();
            let images = CountingImages::new();
            let enricher = MediaEnricher::new(cache, tts.clone(), images.clone());

            let report =
                process_batch(&records, &enricher, &engine, &schema, Tier::A1, None).await;
            assert_eq!(report.failures.len(), 0);
            assert!(tts.calls.load(Ordering::SeqCst) > 0);
            first_audio = report.complete[0].field("Audio").unwrap().to_string();
        }

        // Fresh cache handle and fresh providers, same directory: everything
        // must come back from disk with zero provider calls.
        let cache = Arc::new(MediaCache::open(dir.path()).unwrap());
        let tts = CountingTts::new();
        let images = CountingImages::new();
        let enricher = MediaEnricher::new(cache, tts.clone(), images.clone());

        let report = process_batch(&records, &enricher, &engine, &schema, Tier::A1, None).await;

        assert_eq!(tts.calls.load(Ordering::SeqCst), 0);
        assert_eq!(images.calls.load(Ordering::SeqCst), 0);
        assert_eq!(report.complete[0].field("Audio").unwrap(), first_audio);
        assert_eq!(report.cache.misses, 0);
    }

    #[tokio::test]
    async fn pattern_issue_degrades_one_card_not_the_record() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(MediaCache::open(dir.path()).unwrap());
        let enricher =
            MediaEnricher::new(cache, CountingTts::new(), CountingImages::new());
        let engine = GrammarPatternEngine::with_defaults();
        let schema = FieldSchema::standard();

        let mut case_examples = BTreeMap::new();
        case_examples.insert(Case::Nominative, example("Der Mann arbeitet hier", "der"));
        // Accusative sentence lacks its target token.
        case_examples.insert(Case::Accusative, example("Die Frau arbeitet hier", "den"));
        let records = vec![Record::Noun(NounRecord {
            word: "Mann".to_string(),
            gender: Gender::Masculine,
            plural: None,
            meaning: "man".to_string(),
            case_examples,
            gender_example: None,
            image_terms: None,
            context_hint: None,
        })];

        let report = process_batch(&records, &enricher, &engine, &schema, Tier::A1, None).await;

        assert_eq!(report.failures.len(), 0);
        assert_eq!(report.pattern_issues.len(), 1);
        assert_eq!(report.pattern_issues[0].term, "Mann");
        // Meaning card and the healthy nominative cloze still shipped.
        assert_eq!(report.total_cards(), 2);
    }

    #[tokio::test]
    async fn cancelled_batch_reports_without_cards() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(MediaCache::open(dir.path()).unwrap());
        let tts = CountingTts::new();
        let enricher = MediaEnricher::new(cache, tts.clone(), CountingImages::new());
        let engine = GrammarPatternEngine::with_defaults();
        let schema = FieldSchema::standard();

        let records = vec![mann(), sprechen()];
        let cancel = AtomicBool::new(true);

        let report =
            process_batch(&records, &enricher, &engine, &schema, Tier::A1, Some(&cancel)).await;

        assert!(report.cancelled);
        assert_eq!(report.total_cards(), 0);
        assert_eq!(tts.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn required_field_mismatch_fails_the_record() {
        use crate::assembly::{
            FieldBinding,
            FieldSpec,
        };

        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(MediaCache::open(dir.path()).unwrap());
        let enricher =
            MediaEnricher::new(cache, CountingTts::new(), Arc::new(FailingImages));
        let engine = GrammarPatternEngine::with_defaults();

        // A schema that demands an image for every card, against a provider
        // that cannot deliver one.
        let schema = FieldSchema {
            fields: vec![
                FieldSpec { name: "Front".to_string(), binding: FieldBinding::Text, required: true },
                FieldSpec {
                    name: "Image".to_string(),
                    binding: FieldBinding::Illustration,
                    required: true,
                },
            ],
        };

        let records = vec![mann()];
        let report = process_batch(&records, &enricher, &engine, &schema, Tier::A1, None).await;

        assert_eq!(report.total_cards(), 0);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].reason.contains("Image"));
    }
}
