pub mod assembly;
pub mod core;
pub mod domain;
pub mod grammar;
pub mod media;
pub mod persistence;

pub use crate::{
    assembly::{
        Card,
        CardAssembler,
        FieldSchema,
    },
    core::{
        pipeline::process_batch,
        BatchReport,
        Record,
        Tier,
        WortkartenError,
    },
    grammar::GrammarPatternEngine,
    media::{
        MediaCache,
        MediaEnricher,
    },
};
