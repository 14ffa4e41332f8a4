use std::{
    collections::HashMap,
    path::Path,
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    core::{
        models::{
            Case,
            Degree,
            Gender,
            Tense,
        },
        WortkartenError,
    },
    domain::Feature,
};

const CASE_QUESTIONS: [(Case, &str); 4] = [
    (Case::Nominative, "who/what — subject"),
    (Case::Accusative, "whom — direct object"),
    (Case::Dative, "to whom — indirect object"),
    (Case::Genitive, "whose — possession"),
];

const DEGREE_HINTS: [(Degree, &str); 3] = [
    (Degree::Positive, "base form"),
    (Degree::Comparative, "comparing two things"),
    (Degree::Superlative, "the highest degree"),
];

const TENSE_HINTS: [(Tense, &str); 6] = [
    (Tense::Present, "happening now"),
    (Tense::Preterite, "written past"),
    (Tense::Perfect, "spoken past"),
    (Tense::Future1, "will happen"),
    (Tense::Imperative, "command form"),
    (Tense::Subjunctive2, "polite or unreal"),
];

/// Fixed explanation strings keyed by `feature.sub_feature`. Cards never
/// carry freely generated text; every explanation is a lookup into this
/// table, so regenerating a deck reproduces it verbatim. Entries loaded from
/// a data file override the compiled-in defaults key by key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExplanationTable {
    entries: HashMap<String, String>,
}

impl Default for ExplanationTable {
    fn default() -> Self {
        let mut entries = HashMap::new();

        for gender in [Gender::Masculine, Gender::Feminine, Gender::Neuter] {
            for (case, question) in CASE_QUESTIONS {
                entries.insert(
                    format!("{}.{}", gender.label(), case.label()),
                    format!("{} — {} ({})", gender.label(), case.label(), question),
                );
            }
            entries.insert(
                format!("{}.article", gender.label()),
                format!("{} — takes \"{}\"", gender.label(), gender.article()),
            );
        }

        for (degree, hint) in DEGREE_HINTS {
            entries.insert(
                format!("comparison.{}", degree.label()),
                format!("{} — {}", degree.label(), hint),
            );
        }

        for (tense, hint) in TENSE_HINTS {
            entries
                .insert(format!("tense.{}", tense.key()), format!("{} — {}", tense.label(), hint));
        }

        ExplanationTable { entries }
    }
}

impl ExplanationTable {
    pub fn load(path: &Path) -> Result<Self, WortkartenError> {
        let overrides: HashMap<String, String> = crate::persistence::load_hjson(path)?;
        let mut table = ExplanationTable::default();
        table.entries.extend(overrides);
        Ok(table)
    }

    pub fn get(&self, feature: &str, sub_feature: &str) -> Option<&str> {
        self.entries.get(&format!("{}.{}", feature, sub_feature)).map(String::as_str)
    }

    pub fn for_feature(&self, feature: &Feature) -> Option<&str> {
        let (main, sub) = feature.key();
        self.get(main, sub)
    }

    pub fn for_tense(&self, tense: Tense) -> Option<&str> {
        self.get("tense", tense.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_case_explanations_match_the_course_wording() {
        let table = ExplanationTable::default();
        assert_eq!(
            table.for_feature(&Feature::Case { gender: Gender::Masculine, case: Case::Nominative }),
            Some("masculine — nominative (who/what — subject)")
        );
        assert_eq!(
            table.for_feature(&Feature::Case { gender: Gender::Feminine, case: Case::Dative }),
            Some("feminine — dative (to whom — indirect object)")
        );
    }

    #[test]
    fn gender_and_tense_entries_exist() {
        let table = ExplanationTable::default();
        assert_eq!(
            table.for_feature(&Feature::Gender(Gender::Neuter)),
            Some("neuter — takes \"das\"")
        );
        assert_eq!(table.for_tense(Tense::Subjunctive2), Some("subjunctive II — polite or unreal"));
    }
}
