pub mod cloze;
pub mod explanations;
pub mod tiers;

use serde::Serialize;

pub use explanations::ExplanationTable;
pub use tiers::TierTable;

use crate::{
    core::{
        models::{
            Tense,
            Tier,
        },
        WortkartenError,
    },
    domain::{
        CardSource,
        Gate,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    Meaning,
    Cloze,
    Conjugation,
}

/// A fixed person/form table for one tense, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParadigmTable {
    pub tense: Tense,
    pub rows: Vec<(String, String)>,
}

/// Template-bound description of one card. Everything here is deterministic:
/// the same record, classification and tier always reproduce the same specs
/// in the same order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardSpec {
    pub kind: CardKind,
    pub text: String,
    pub cloze_index: Option<u32>,
    pub explanation: Option<String>,
    pub paradigm: Option<ParadigmTable>,
    pub tags: Vec<String>,
}

/// A pattern that could not be synthesized. Fatal to that one pattern;
/// sibling patterns of the same record are unaffected.
#[derive(Debug)]
pub struct PatternFailure {
    pub label: String,
    pub error: WortkartenError,
}

#[derive(Debug, Default)]
pub struct Synthesis {
    pub specs: Vec<CardSpec>,
    pub failures: Vec<PatternFailure>,
}

/// Expands one record into its card specifications. Every card kind is
/// emitted from exactly one builder here, so a (record, kind, feature)
/// combination can never be generated twice.
pub struct GrammarPatternEngine {
    tiers: TierTable,
    explanations: ExplanationTable,
}

impl GrammarPatternEngine {
    pub fn new(
        tiers: TierTable,
        explanations: ExplanationTable,
    ) -> Result<Self, WortkartenError> {
        tiers.validate()?;
        Ok(Self { tiers, explanations })
    }

    pub fn with_defaults() -> Self {
        Self { tiers: TierTable::default(), explanations: ExplanationTable::default() }
    }

    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }

    /// Expand a record into its ordered card specs for a tier: the meaning
    /// card first, then cloze cards in their canonical pattern order, then
    /// conjugation drills in canonical tense order.
    pub fn synthesize(&self, source: &dyn CardSource, tier: Tier) -> Synthesis {
        let mut synthesis = Synthesis::default();

        synthesis.specs.push(self.meaning_card(source));
        self.cloze_cards(source, tier, &mut synthesis);
        self.conjugation_cards(source, tier, &mut synthesis);

        synthesis
    }

    fn meaning_card(&self, source: &dyn CardSource) -> CardSpec {
        let details = source.meaning_details();
        let explanation = if details.is_empty() {
            source.meaning().to_string()
        } else {
            format!("{} ({})", source.meaning(), details.join("; "))
        };

        let mut tags = source.tags();
        tags.push("meaning".to_string());

        CardSpec {
            kind: CardKind::Meaning,
            text: source.display_term(),
            cloze_index: None,
            explanation: Some(explanation),
            paradigm: None,
            tags,
        }
    }

    fn cloze_cards(&self, source: &dyn CardSource, tier: Tier, synthesis: &mut Synthesis) {
        let cases = self.tiers.cases(tier);
        let degrees = self.tiers.degrees(tier);

        for pattern in source.cloze_patterns() {
            let included = match pattern.gate {
                Gate::Always => true,
                Gate::Case(case) => cases.contains(&case),
                Gate::Degree(degree) => degrees.contains(&degree),
            };
            if !included {
                continue;
            }

            match cloze::cloze_sentence(&pattern.sentence, &pattern.target, 1) {
                Ok(text) => {
                    let (feature, sub_feature) = pattern.feature.key();
                    let explanation = self
                        .explanations
                        .for_feature(&pattern.feature)
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("{} — {}", feature, sub_feature));

                    let mut tags = source.tags();
                    tags.push("cloze".to_string());
                    tags.push(pattern.feature.tag());

                    synthesis.specs.push(CardSpec {
                        kind: CardKind::Cloze,
                        text,
                        cloze_index: Some(1),
                        explanation: Some(explanation),
                        paradigm: None,
                        tags,
                    });
                }
                Err(error) => {
                    let (feature, sub_feature) = pattern.feature.key();
                    synthesis.failures.push(PatternFailure {
                        label: format!("{} {} cloze", feature, sub_feature),
                        error,
                    });
                }
            }
        }
    }

    fn conjugation_cards(&self, source: &dyn CardSource, tier: Tier, synthesis: &mut Synthesis) {
        let Some(conjugation) = source.conjugation() else {
            return;
        };

        for tense in self.tiers.tenses(tier) {
            let Some(paradigm) = conjugation.paradigms.get(&tense) else {
                // The record does not cover this tense; the tier table only
                // sets the upper bound.
                continue;
            };

            // A drill with blank cells must never be assembled.
            if let Err(error) = paradigm.validate(tense, conjugation.infinitive) {
                synthesis
                    .failures
                    .push(PatternFailure { label: format!("{} drill", tense.label()), error });
                continue;
            }

            let rows = paradigm
                .rows(tense)
                .into_iter()
                .map(|(person, form)| (person.to_string(), form))
                .collect();

            let mut tags = source.tags();
            tags.push("conjugation".to_string());
            tags.push(format!("tense:{}", tense.key()));

            synthesis.specs.push(CardSpec {
                kind: CardKind::Conjugation,
                text: format!("{} — {}", conjugation.infinitive, tense.label()),
                cloze_index: None,
                explanation: self.explanations.for_tense(tense).map(str::to_string),
                paradigm: Some(ParadigmTable { tense, rows }),
                tags,
            });
        }
    }
}
