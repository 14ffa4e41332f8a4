use std::collections::BTreeMap;

use serde::{
    Deserialize,
    Serialize,
};

use super::WortkartenError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Masculine,
    Feminine,
    Neuter,
}

impl Gender {
    pub fn article(&self) -> &'static str {
        match self {
            Gender::Masculine => "der",
            Gender::Feminine => "die",
            Gender::Neuter => "das",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Gender::Masculine => "masculine",
            Gender::Feminine => "feminine",
            Gender::Neuter => "neuter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Case {
    Nominative,
    Accusative,
    Dative,
    Genitive,
}

impl Case {
    /// Canonical ordering used everywhere cards are emitted.
    pub const ALL: [Case; 4] = [Case::Nominative, Case::Accusative, Case::Dative, Case::Genitive];

    pub fn label(&self) -> &'static str {
        match self {
            Case::Nominative => "nominative",
            Case::Accusative => "accusative",
            Case::Dative => "dative",
            Case::Genitive => "genitive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Degree {
    Positive,
    Comparative,
    Superlative,
}

impl Degree {
    pub const ALL: [Degree; 3] = [Degree::Positive, Degree::Comparative, Degree::Superlative];

    pub fn label(&self) -> &'static str {
        match self {
            Degree::Positive => "positive",
            Degree::Comparative => "comparative",
            Degree::Superlative => "superlative",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Person {
    Ich,
    Du,
    Er,
    Wir,
    Ihr,
    Sie,
}

impl Person {
    pub fn label(&self) -> &'static str {
        match self {
            Person::Ich => "ich",
            Person::Du => "du",
            Person::Er => "er/sie/es",
            Person::Wir => "wir",
            Person::Ihr => "ihr",
            Person::Sie => "sie/Sie",
        }
    }
}

const INDICATIVE_PERSONS: [Person; 6] =
    [Person::Ich, Person::Du, Person::Er, Person::Wir, Person::Ihr, Person::Sie];

// The imperative only addresses du/ihr/Sie.
const IMPERATIVE_PERSONS: [Person; 3] = [Person::Du, Person::Ihr, Person::Sie];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tense {
    Present,
    Preterite,
    Perfect,
    Future1,
    Imperative,
    Subjunctive2,
}

impl Tense {
    /// Canonical ordering used everywhere drills are emitted.
    pub const ALL: [Tense; 6] = [
        Tense::Present,
        Tense::Preterite,
        Tense::Perfect,
        Tense::Future1,
        Tense::Imperative,
        Tense::Subjunctive2,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Tense::Present => "present",
            Tense::Preterite => "preterite",
            Tense::Perfect => "perfect",
            Tense::Future1 => "future I",
            Tense::Imperative => "imperative",
            Tense::Subjunctive2 => "subjunctive II",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Tense::Present => "present",
            Tense::Preterite => "preterite",
            Tense::Perfect => "perfect",
            Tense::Future1 => "future1",
            Tense::Imperative => "imperative",
            Tense::Subjunctive2 => "subjunctive2",
        }
    }

    pub fn persons(&self) -> &'static [Person] {
        match self {
            Tense::Imperative => &IMPERATIVE_PERSONS,
            _ => &INDICATIVE_PERSONS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Regular,
    Irregular,
    Mixed,
}

impl Classification {
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Regular => "regular",
            Classification::Irregular => "irregular",
            Classification::Mixed => "mixed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    A1,
    A2,
    B1,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::A1, Tier::A2, Tier::B1];

    pub fn label(&self) -> &'static str {
        match self {
            Tier::A1 => "A1",
            Tier::A2 => "A2",
            Tier::B1 => "B1",
        }
    }
}

/// An example sentence together with the canonical surface form of the token
/// the learner has to recall from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClozeExample {
    pub sentence: String,
    pub target: String,
}

/// Principal parts of a strong or mixed verb ("spricht, sprach, hat gesprochen").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemForms {
    pub present_third: String, // er/sie/es form in the present
    pub preterite: String,     // er/sie/es form in the preterite
    pub perfect: String,       // auxiliary + past participle
}

impl StemForms {
    pub fn summary(&self) -> String {
        format!("{}, {}, {}", self.present_third, self.preterite, self.perfect)
    }
}

/// One conjugated form per grammatical person, for a single tense.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paradigm {
    pub forms: BTreeMap<Person, String>,
}

impl Paradigm {
    /// A paradigm is complete when every person of the tense has a non-empty
    /// form. Incomplete paradigms are rejected up front rather than surfacing
    /// as drills with blank cells.
    pub fn validate(&self, tense: Tense, term: &str) -> Result<(), WortkartenError> {
        for person in tense.persons() {
            match self.forms.get(person) {
                Some(form) if !form.trim().is_empty() => {}
                _ => {
                    return Err(WortkartenError::validation(
                        term,
                        format!("{} paradigm is missing the '{}' form", tense.label(), person.label()),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Rows in the fixed person order of the tense. Only valid after
    /// `validate` has passed.
    pub fn rows(&self, tense: Tense) -> Vec<(&'static str, String)> {
        tense
            .persons()
            .iter()
            .map(|p| (p.label(), self.forms.get(p).cloned().unwrap_or_default()))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NounRecord {
    pub word: String,           // "Mann"
    pub gender: Gender,
    #[serde(default)]
    pub plural: Option<String>, // "Männer"
    pub meaning: String,        // English gloss
    #[serde(default)]
    pub case_examples: BTreeMap<Case, ClozeExample>,
    #[serde(default)]
    pub gender_example: Option<ClozeExample>,
    #[serde(default)]
    pub image_terms: Option<String>,
    #[serde(default)]
    pub context_hint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerbRecord {
    pub infinitive: String, // "sprechen"
    pub meaning: String,
    pub classification: Classification,
    #[serde(default)]
    pub stem_forms: Option<StemForms>,
    #[serde(default)]
    pub paradigms: BTreeMap<Tense, Paradigm>,
    #[serde(default)]
    pub example_sentence: Option<String>,
    #[serde(default)]
    pub image_terms: Option<String>,
    #[serde(default)]
    pub context_hint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjectiveRecord {
    pub word: String, // "schnell"
    pub meaning: String,
    #[serde(default)]
    pub comparative: Option<String>,
    #[serde(default)]
    pub superlative: Option<String>,
    #[serde(default)]
    pub degree_examples: BTreeMap<Degree, ClozeExample>,
    #[serde(default)]
    pub image_terms: Option<String>,
    #[serde(default)]
    pub context_hint: Option<String>,
}

/// A declension pattern taught as its own entry, e.g. the definite article
/// through the four cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticlePatternRecord {
    pub name: String, // "definite article (masculine)"
    pub gender: Gender,
    #[serde(default)]
    pub forms: BTreeMap<Case, String>, // der/den/dem/des
    #[serde(default)]
    pub case_examples: BTreeMap<Case, ClozeExample>,
    #[serde(default)]
    pub context_hint: Option<String>,
}

/// One validated vocabulary entry, one variant per lexical category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum Record {
    Noun(NounRecord),
    Verb(VerbRecord),
    Adjective(AdjectiveRecord),
    #[serde(rename = "article")]
    ArticlePattern(ArticlePatternRecord),
}

impl Record {
    pub fn term(&self) -> &str {
        match self {
            Record::Noun(n) => &n.word,
            Record::Verb(v) => &v.infinitive,
            Record::Adjective(a) => &a.word,
            Record::ArticlePattern(p) => &p.name,
        }
    }

    /// Structural checks the synthesis stages rely on. A failure here is
    /// fatal to this record only; the batch keeps going.
    pub fn validate(&self) -> Result<(), WortkartenError> {
        let term = self.term().to_string();
        if term.trim().is_empty() {
            return Err(WortkartenError::validation("<unnamed>", "empty term"));
        }

        match self {
            Record::Noun(noun) => {
                if noun.meaning.trim().is_empty() {
                    return Err(WortkartenError::validation(&term, "empty meaning"));
                }
                for (case, example) in &noun.case_examples {
                    validate_example(&term, case.label(), example)?;
                }
                if let Some(example) = &noun.gender_example {
                    validate_example(&term, "gender", example)?;
                }
            }
            Record::Verb(verb) => {
                if verb.meaning.trim().is_empty() {
                    return Err(WortkartenError::validation(&term, "empty meaning"));
                }
                for (tense, paradigm) in &verb.paradigms {
                    paradigm.validate(*tense, &term)?;
                }
            }
            Record::Adjective(adjective) => {
                if adjective.meaning.trim().is_empty() {
                    return Err(WortkartenError::validation(&term, "empty meaning"));
                }
                for (degree, example) in &adjective.degree_examples {
                    validate_example(&term, degree.label(), example)?;
                }
            }
            Record::ArticlePattern(pattern) => {
                for (case, example) in &pattern.case_examples {
                    validate_example(&term, case.label(), example)?;
                    if !pattern.forms.contains_key(case) {
                        return Err(WortkartenError::validation(
                            &term,
                            format!("{} example has no matching form", case.label()),
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}

fn validate_example(
    term: &str,
    dimension: &str,
    example: &ClozeExample,
) -> Result<(), WortkartenError> {
    if example.sentence.trim().is_empty() {
        return Err(WortkartenError::validation(
            term,
            format!("{} example has an empty sentence", dimension),
        ));
    }
    if example.target.trim().is_empty() {
        return Err(WortkartenError::validation(
            term,
            format!("{} example has an empty target", dimension),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noun() -> NounRecord {
        NounRecord {
            word: "Mann".to_string(),
            gender: Gender::Masculine,
            plural: Some("Männer".to_string()),
            meaning: "man".to_string(),
            case_examples: BTreeMap::new(),
            gender_example: None,
            image_terms: None,
            context_hint: None,
        }
    }

    #[test]
    fn valid_noun_passes() {
        assert!(Record::Noun(noun()).validate().is_ok());
    }

    #[test]
    fn empty_meaning_is_rejected() {
        let mut record = noun();
        record.meaning = "  ".to_string();
        let err = Record::Noun(record).validate().unwrap_err();
        assert!(matches!(err, WortkartenError::Validation { .. }));
    }

    #[test]
    fn example_without_target_is_rejected() {
        let mut record = noun();
        record.case_examples.insert(
            Case::Nominative,
            ClozeExample { sentence: "Der Mann arbeitet hier".to_string(), target: "".to_string() },
        );
        assert!(Record::Noun(record).validate().is_err());
    }

    #[test]
    fn incomplete_paradigm_is_rejected() {
        let mut forms = BTreeMap::new();
        forms.insert(Person::Ich, "spreche".to_string());
        forms.insert(Person::Du, "sprichst".to_string());
        let record = Record::Verb(VerbRecord {
            infinitive: "sprechen".to_string(),
            meaning: "to speak".to_string(),
            classification: Classification::Irregular,
            stem_forms: None,
            paradigms: BTreeMap::from([(Tense::Present, Paradigm { forms })]),
            example_sentence: None,
            image_terms: None,
            context_hint: None,
        });
        assert!(record.validate().is_err());
    }

    #[test]
    fn imperative_paradigm_needs_three_forms() {
        let forms = BTreeMap::from([
            (Person::Du, "sprich".to_string()),
            (Person::Ihr, "sprecht".to_string()),
            (Person::Sie, "sprechen Sie".to_string()),
        ]);
        let paradigm = Paradigm { forms };
        assert!(paradigm.validate(Tense::Imperative, "sprechen").is_ok());
        assert_eq!(paradigm.rows(Tense::Imperative).len(), 3);
    }
}
