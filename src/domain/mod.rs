use std::collections::BTreeMap;

use crate::core::models::{
    AdjectiveRecord,
    ArticlePatternRecord,
    Case,
    Classification,
    Degree,
    Gender,
    NounRecord,
    Paradigm,
    Record,
    StemForms,
    Tense,
    VerbRecord,
};

/// The grammatical dimension a cloze card drills, also the key into the
/// explanation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Case { gender: Gender, case: Case },
    Gender(Gender),
    Degree(Degree),
}

impl Feature {
    pub fn key(&self) -> (&'static str, &'static str) {
        match self {
            Feature::Case { gender, case } => (gender.label(), case.label()),
            Feature::Gender(gender) => (gender.label(), "article"),
            Feature::Degree(degree) => ("comparison", degree.label()),
        }
    }

    pub fn tag(&self) -> String {
        match self {
            Feature::Case { case, .. } => format!("case:{}", case.label()),
            Feature::Gender(_) => "gender".to_string(),
            Feature::Degree(degree) => format!("degree:{}", degree.label()),
        }
    }
}

/// Which tier dimension gates a pattern in or out of a card set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Always,
    Case(Case),
    Degree(Degree),
}

/// One candidate cloze card: a sentence, the token to mask, and the feature
/// the card teaches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClozePattern {
    pub feature: Feature,
    pub sentence: String,
    pub target: String,
    pub gate: Gate,
}

/// Borrowed view of a record's conjugation data.
#[derive(Debug, Clone, Copy)]
pub struct ConjugationFacet<'a> {
    pub infinitive: &'a str,
    pub classification: Classification,
    pub stem_forms: Option<&'a StemForms>,
    pub paradigms: &'a BTreeMap<Tense, Paradigm>,
}

/// Capability view over a record. The enricher and the pattern engine program
/// against this interface only; they never inspect the record variant.
pub trait CardSource: Send + Sync {
    fn term(&self) -> &str;

    /// Display form of the term, e.g. a noun together with its article.
    fn display_term(&self) -> String {
        self.term().to_string()
    }

    fn meaning(&self) -> &str;

    /// Exact text to synthesize for the term's pronunciation slot.
    fn audio_text(&self) -> Option<String>;

    /// Exact text to synthesize for the example sentence slot.
    fn example_audio_text(&self) -> Option<String>;

    /// Canonical search terms for the illustration slot. When this is absent
    /// the enricher may derive terms from `context_hint` via the translation
    /// provider.
    fn image_search_terms(&self) -> Option<String>;

    fn context_hint(&self) -> Option<&str>;

    /// Candidate cloze patterns in their canonical emission order.
    fn cloze_patterns(&self) -> Vec<ClozePattern>;

    fn conjugation(&self) -> Option<ConjugationFacet<'_>>;

    /// Extra lines surfaced on the meaning card (plural, stem forms, ...).
    fn meaning_details(&self) -> Vec<String>;

    fn tags(&self) -> Vec<String>;
}

impl Record {
    /// Derive the capability view for this entry. Derived on demand and never
    /// persisted; this is the only place that looks at the concrete variant.
    pub fn model(&self) -> Box<dyn CardSource + '_> {
        match self {
            Record::Noun(noun) => Box::new(NounModel(noun)),
            Record::Verb(verb) => Box::new(VerbModel(verb)),
            Record::Adjective(adjective) => Box::new(AdjectiveModel(adjective)),
            Record::ArticlePattern(pattern) => Box::new(ArticlePatternModel(pattern)),
        }
    }
}

struct NounModel<'a>(&'a NounRecord);

impl CardSource for NounModel<'_> {
    fn term(&self) -> &str {
        &self.0.word
    }

    fn display_term(&self) -> String {
        format!("{} {}", self.0.gender.article(), self.0.word)
    }

    fn meaning(&self) -> &str {
        &self.0.meaning
    }

    fn audio_text(&self) -> Option<String> {
        Some(self.display_term())
    }

    fn example_audio_text(&self) -> Option<String> {
        self.0.case_examples.get(&Case::Nominative).map(|e| e.sentence.clone())
    }

    fn image_search_terms(&self) -> Option<String> {
        // Concrete nouns search well under their English gloss.
        self.0.image_terms.clone().or_else(|| Some(self.0.meaning.clone()))
    }

    fn context_hint(&self) -> Option<&str> {
        self.0.context_hint.as_deref()
    }

    fn cloze_patterns(&self) -> Vec<ClozePattern> {
        let mut patterns = Vec::new();
        for case in Case::ALL {
            if let Some(example) = self.0.case_examples.get(&case) {
                patterns.push(ClozePattern {
                    feature: Feature::Case { gender: self.0.gender, case },
                    sentence: example.sentence.clone(),
                    target: example.target.clone(),
                    gate: Gate::Case(case),
                });
            }
        }
        if let Some(example) = &self.0.gender_example {
            patterns.push(ClozePattern {
                feature: Feature::Gender(self.0.gender),
                sentence: example.sentence.clone(),
                target: example.target.clone(),
                gate: Gate::Always,
            });
        }
        patterns
    }

    fn conjugation(&self) -> Option<ConjugationFacet<'_>> {
        None
    }

    fn meaning_details(&self) -> Vec<String> {
        let mut details = Vec::new();
        if let Some(plural) = &self.0.plural {
            details.push(format!("plural: die {}", plural));
        }
        details
    }

    fn tags(&self) -> Vec<String> {
        vec!["noun".to_string(), self.0.gender.label().to_string()]
    }
}

struct VerbModel<'a>(&'a VerbRecord);

impl CardSource for VerbModel<'_> {
    fn term(&self) -> &str {
        &self.0.infinitive
    }

    fn meaning(&self) -> &str {
        &self.0.meaning
    }

    fn audio_text(&self) -> Option<String> {
        Some(self.0.infinitive.clone())
    }

    fn example_audio_text(&self) -> Option<String> {
        self.0.example_sentence.clone()
    }

    fn image_search_terms(&self) -> Option<String> {
        // Actions rarely search well by gloss alone; without explicit terms
        // the enricher falls back to translating the context hint.
        self.0.image_terms.clone()
    }

    fn context_hint(&self) -> Option<&str> {
        self.0.context_hint.as_deref()
    }

    fn cloze_patterns(&self) -> Vec<ClozePattern> {
        Vec::new()
    }

    fn conjugation(&self) -> Option<ConjugationFacet<'_>> {
        Some(ConjugationFacet {
            infinitive: &self.0.infinitive,
            classification: self.0.classification,
            stem_forms: self.0.stem_forms.as_ref(),
            paradigms: &self.0.paradigms,
        })
    }

    fn meaning_details(&self) -> Vec<String> {
        let mut details = Vec::new();
        // Stem changes only matter for strong and mixed verbs.
        match self.0.classification {
            Classification::Regular => {}
            Classification::Irregular | Classification::Mixed => {
                if let Some(stems) = &self.0.stem_forms {
                    details.push(format!("stem forms: {}", stems.summary()));
                }
            }
        }
        details
    }

    fn tags(&self) -> Vec<String> {
        vec!["verb".to_string(), self.0.classification.label().to_string()]
    }
}

struct AdjectiveModel<'a>(&'a AdjectiveRecord);

impl CardSource for AdjectiveModel<'_> {
    fn term(&self) -> &str {
        &self.0.word
    }

    fn meaning(&self) -> &str {
        &self.0.meaning
    }

    fn audio_text(&self) -> Option<String> {
        Some(self.0.word.clone())
    }

    fn example_audio_text(&self) -> Option<String> {
        self.0.degree_examples.get(&Degree::Positive).map(|e| e.sentence.clone())
    }

    fn image_search_terms(&self) -> Option<String> {
        self.0.image_terms.clone()
    }

    fn context_hint(&self) -> Option<&str> {
        self.0.context_hint.as_deref()
    }

    fn cloze_patterns(&self) -> Vec<ClozePattern> {
        let mut patterns = Vec::new();
        for degree in Degree::ALL {
            if let Some(example) = self.0.degree_examples.get(&degree) {
                patterns.push(ClozePattern {
                    feature: Feature::Degree(degree),
                    sentence: example.sentence.clone(),
                    target: example.target.clone(),
                    gate: Gate::Degree(degree),
                });
            }
        }
        patterns
    }

    fn conjugation(&self) -> Option<ConjugationFacet<'_>> {
        None
    }

    fn meaning_details(&self) -> Vec<String> {
        let mut details = Vec::new();
        if let Some(comparative) = &self.0.comparative {
            details.push(format!("comparative: {}", comparative));
        }
        if let Some(superlative) = &self.0.superlative {
            details.push(format!("superlative: {}", superlative));
        }
        details
    }

    fn tags(&self) -> Vec<String> {
        vec!["adjective".to_string()]
    }
}

struct ArticlePatternModel<'a>(&'a ArticlePatternRecord);

impl CardSource for ArticlePatternModel<'_> {
    fn term(&self) -> &str {
        &self.0.name
    }

    fn meaning(&self) -> &str {
        &self.0.name
    }

    fn audio_text(&self) -> Option<String> {
        // Speak the declension row itself: "der, den, dem, des".
        let forms: Vec<&str> = Case::ALL
            .iter()
            .filter_map(|case| self.0.forms.get(case).map(|f| f.as_str()))
            .collect();
        if forms.is_empty() {
            None
        } else {
            Some(forms.join(", "))
        }
    }

    fn example_audio_text(&self) -> Option<String> {
        None
    }

    fn image_search_terms(&self) -> Option<String> {
        None
    }

    fn context_hint(&self) -> Option<&str> {
        self.0.context_hint.as_deref()
    }

    fn cloze_patterns(&self) -> Vec<ClozePattern> {
        let mut patterns = Vec::new();
        for case in Case::ALL {
            if let Some(example) = self.0.case_examples.get(&case) {
                patterns.push(ClozePattern {
                    feature: Feature::Case { gender: self.0.gender, case },
                    sentence: example.sentence.clone(),
                    target: example.target.clone(),
                    gate: Gate::Case(case),
                });
            }
        }
        patterns
    }

    fn conjugation(&self) -> Option<ConjugationFacet<'_>> {
        None
    }

    fn meaning_details(&self) -> Vec<String> {
        Case::ALL
            .iter()
            .filter_map(|case| {
                self.0.forms.get(case).map(|form| format!("{}: {}", case.label(), form))
            })
            .collect()
    }

    fn tags(&self) -> Vec<String> {
        vec!["article".to_string(), self.0.gender.label().to_string()]
    }
}
