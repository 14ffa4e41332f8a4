use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    core::WortkartenError,
    grammar::{
        CardSpec,
        ParadigmTable,
    },
    media::{
        EnrichedRecord,
        MediaAsset,
        MediaSlot,
    },
};

/// Where a field's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldBinding {
    Text,
    Explanation,
    Paradigm,
    #[serde(rename = "term_audio")]
    TermAudio,
    #[serde(rename = "example_audio")]
    ExampleAudio,
    Illustration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub binding: FieldBinding,
    #[serde(default)]
    pub required: bool,
}

/// The ordered field layout the export target expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSchema {
    pub fields: Vec<FieldSpec>,
}

impl FieldSchema {
    /// The layout of the standard note type: front/back required, paradigm
    /// and media best-effort.
    pub fn standard() -> Self {
        let field = |name: &str, binding, required| FieldSpec {
            name: name.to_string(),
            binding,
            required,
        };
        FieldSchema {
            fields: vec![
                field("Front", FieldBinding::Text, true),
                field("Back", FieldBinding::Explanation, true),
                field("Paradigm", FieldBinding::Paradigm, false),
                field("Audio", FieldBinding::TermAudio, false),
                field("ExampleAudio", FieldBinding::ExampleAudio, false),
                field("Image", FieldBinding::Illustration, false),
            ],
        }
    }
}

/// A finished, export-ready card. Terminal and immutable: fields are bound
/// once and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    fields: Vec<(String, String)>,
    tags: Vec<String>,
}

impl Card {
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// Binds card specs and resolved media into Cards. Pure transformation: no
/// I/O, no provider calls.
pub struct CardAssembler;

impl CardAssembler {
    /// Bind one spec against a field schema. A required field with no value
    /// is a contract violation and fails the whole card; optional fields
    /// degrade to empty.
    pub fn assemble(
        spec: &CardSpec,
        enriched: &EnrichedRecord<'_>,
        schema: &FieldSchema,
    ) -> Result<Card, WortkartenError> {
        let mut fields = Vec::with_capacity(schema.fields.len());

        for field in &schema.fields {
            let value = match field.binding {
                FieldBinding::Text => Some(spec.text.clone()),
                FieldBinding::Explanation => spec.explanation.clone(),
                FieldBinding::Paradigm => spec.paradigm.as_ref().map(render_paradigm),
                FieldBinding::TermAudio => {
                    enriched.asset(MediaSlot::TermAudio).map(sound_reference)
                }
                FieldBinding::ExampleAudio => {
                    enriched.asset(MediaSlot::ExampleAudio).map(sound_reference)
                }
                FieldBinding::Illustration => {
                    enriched.asset(MediaSlot::Illustration).map(image_reference)
                }
            };

            match value.filter(|v| !v.is_empty()) {
                Some(value) => fields.push((field.name.clone(), value)),
                None if field.required => {
                    return Err(WortkartenError::FieldBinding { field: field.name.clone() });
                }
                None => fields.push((field.name.clone(), String::new())),
            }
        }

        Ok(Card { fields, tags: spec.tags.clone() })
    }
}

fn sound_reference(asset: &MediaAsset) -> String {
    format!("[sound:{}]", asset.file_name())
}

fn image_reference(asset: &MediaAsset) -> String {
    format!("<img src=\"{}\">", asset.file_name())
}

fn render_paradigm(table: &ParadigmTable) -> String {
    table
        .rows
        .iter()
        .map(|(person, form)| format!("{} {}", person, form))
        .collect::<Vec<_>>()
        .join("<br>")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::{
        core::models::{
            Gender,
            NounRecord,
            Record,
            Tense,
        },
        grammar::CardKind,
        media::MediaKind,
    };

    fn record() -> Record {
        Record::Noun(NounRecord {
            word: "Mann".to_string(),
            gender: Gender::Masculine,
            plural: None,
            meaning: "man".to_string(),
            case_examples: BTreeMap::new(),
            gender_example: None,
            image_terms: None,
            context_hint: None,
        })
    }

    fn enriched(record: &Record) -> EnrichedRecord<'_> {
        let mut media = BTreeMap::new();
        media.insert(
            MediaSlot::TermAudio,
            MediaAsset {
                kind: MediaKind::Audio,
                cache_key: "abc".to_string(),
                storage_path: "/tmp/media/audio/abc.mp3".into(),
            },
        );
        EnrichedRecord { record, media, warnings: Vec::new() }
    }

    fn spec() -> CardSpec {
        CardSpec {
            kind: CardKind::Meaning,
            text: "der Mann".to_string(),
            cloze_index: None,
            explanation: Some("man".to_string()),
            paradigm: None,
            tags: vec!["noun".to_string()],
        }
    }

    #[test]
    fn binds_fields_in_schema_order() {
        let record = record();
        let card = CardAssembler::assemble(&spec(), &enriched(&record), &FieldSchema::standard())
            .unwrap();

        assert_eq!(card.field("Front"), Some("der Mann"));
        assert_eq!(card.field("Back"), Some("man"));
        assert_eq!(card.field("Audio"), Some("[sound:abc.mp3]"));
        // Unresolved optional slots degrade to empty, not to a failure.
        assert_eq!(card.field("Image"), Some(""));
        assert_eq!(card.tags(), ["noun".to_string()]);
    }

    #[test]
    fn missing_required_field_fails_fast() {
        let record = record();
        let mut bad = spec();
        bad.explanation = None;

        let err = CardAssembler::assemble(&bad, &enriched(&record), &FieldSchema::standard())
            .unwrap_err();
        assert!(matches!(err, WortkartenError::FieldBinding { ref field } if field == "Back"));
    }

    #[test]
    fn required_media_field_fails_when_slot_is_absent() {
        let record = record();
        let schema = FieldSchema {
            fields: vec![FieldSpec {
                name: "Image".to_string(),
                binding: FieldBinding::Illustration,
                required: true,
            }],
        };

        let err =
            CardAssembler::assemble(&spec(), &enriched(&record), &schema).unwrap_err();
        assert!(matches!(err, WortkartenError::FieldBinding { ref field } if field == "Image"));
    }

    #[test]
    fn paradigm_renders_person_rows() {
        let record = record();
        let mut with_paradigm = spec();
        with_paradigm.paradigm = Some(ParadigmTable {
            tense: Tense::Present,
            rows: vec![
                ("ich".to_string(), "spreche".to_string()),
                ("du".to_string(), "sprichst".to_string()),
            ],
        });

        let card =
            CardAssembler::assemble(&with_paradigm, &enriched(&record), &FieldSchema::standard())
                .unwrap();
        assert_eq!(card.field("Paradigm"), Some("ich spreche<br>du sprichst"));
    }
}
