use std::{
    collections::BTreeMap,
    path::Path,
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::core::{
    models::{
        Case,
        Degree,
        Tense,
        Tier,
    },
    WortkartenError,
};

/// The grammatical dimensions one proficiency tier covers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TierSpec {
    #[serde(default)]
    pub cases: Vec<Case>,
    #[serde(default)]
    pub degrees: Vec<Degree>,
    #[serde(default)]
    pub tenses: Vec<Tense>,
}

/// Which cases, degrees and tenses each tier generates cards for. This is
/// course policy, so it ships as data: the compiled-in table below can be
/// replaced by an HJSON file without touching code. Loaded tables are checked
/// for the superset rule before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierTable {
    pub levels: BTreeMap<Tier, TierSpec>,
}

impl Default for TierTable {
    fn default() -> Self {
        let mut levels = BTreeMap::new();
        levels.insert(
            Tier::A1,
            TierSpec {
                cases: vec![Case::Nominative, Case::Accusative],
                degrees: vec![Degree::Positive],
                tenses: vec![Tense::Present],
            },
        );
        levels.insert(
            Tier::A2,
            TierSpec {
                cases: vec![Case::Nominative, Case::Accusative, Case::Dative],
                degrees: vec![Degree::Positive, Degree::Comparative],
                tenses: vec![Tense::Present, Tense::Preterite, Tense::Perfect],
            },
        );
        levels.insert(
            Tier::B1,
            TierSpec {
                cases: vec![Case::Nominative, Case::Accusative, Case::Dative, Case::Genitive],
                degrees: vec![Degree::Positive, Degree::Comparative, Degree::Superlative],
                tenses: vec![
                    Tense::Present,
                    Tense::Preterite,
                    Tense::Perfect,
                    Tense::Imperative,
                    Tense::Subjunctive2,
                ],
            },
        );
        TierTable { levels }
    }
}

impl TierTable {
    pub fn load(path: &Path) -> Result<Self, WortkartenError> {
        let table: TierTable = crate::persistence::load_hjson(path)?;
        table.validate()?;
        Ok(table)
    }

    /// Higher tiers must strictly add, never remove: every dimension of a
    /// tier has to be a superset of the tier below it.
    pub fn validate(&self) -> Result<(), WortkartenError> {
        for pair in Tier::ALL.windows(2) {
            let (lower, higher) = (pair[0], pair[1]);
            let lo = self.spec(lower);
            let hi = self.spec(higher);

            let superset = lo.cases.iter().all(|c| hi.cases.contains(c))
                && lo.degrees.iter().all(|d| hi.degrees.contains(d))
                && lo.tenses.iter().all(|t| hi.tenses.contains(t));

            if !superset {
                return Err(WortkartenError::Custom(format!(
                    "tier table is not monotonic: {} is missing entries present at {}",
                    higher.label(),
                    lower.label()
                )));
            }
        }
        Ok(())
    }

    fn spec(&self, tier: Tier) -> &TierSpec {
        static EMPTY: TierSpec = TierSpec { cases: Vec::new(), degrees: Vec::new(), tenses: Vec::new() };
        self.levels.get(&tier).unwrap_or(&EMPTY)
    }

    /// Cases for a tier, in canonical order regardless of file order.
    pub fn cases(&self, tier: Tier) -> Vec<Case> {
        let spec = self.spec(tier);
        Case::ALL.iter().copied().filter(|c| spec.cases.contains(c)).collect()
    }

    pub fn degrees(&self, tier: Tier) -> Vec<Degree> {
        let spec = self.spec(tier);
        Degree::ALL.iter().copied().filter(|d| spec.degrees.contains(d)).collect()
    }

    pub fn tenses(&self, tier: Tier) -> Vec<Tense> {
        let spec = self.spec(tier);
        Tense::ALL.iter().copied().filter(|t| spec.tenses.contains(t)).collect()
    }
}
