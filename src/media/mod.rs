pub mod cache;
pub mod enricher;
pub mod providers;

use std::{
    collections::BTreeMap,
    path::PathBuf,
};

use serde::{
    Deserialize,
    Serialize,
};

pub use cache::{
    CacheStats,
    MediaCache,
};
pub use enricher::MediaEnricher;

use crate::core::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Image,
}

impl MediaKind {
    pub fn subdir(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Image => "images",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            MediaKind::Audio => "mp3",
            MediaKind::Image => "jpg",
        }
    }
}

/// The media positions a card can reference. At most one asset per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MediaSlot {
    TermAudio,
    ExampleAudio,
    Illustration,
}

impl MediaSlot {
    pub fn kind(&self) -> MediaKind {
        match self {
            MediaSlot::TermAudio | MediaSlot::ExampleAudio => MediaKind::Audio,
            MediaSlot::Illustration => MediaKind::Image,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MediaSlot::TermAudio => "term audio",
            MediaSlot::ExampleAudio => "example audio",
            MediaSlot::Illustration => "illustration",
        }
    }
}

/// A stored media blob. Identity is the cache key; the same key always refers
/// to the same stored bytes, so assets are shared by reference between any
/// number of enriched records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAsset {
    pub kind: MediaKind,
    pub cache_key: String,
    pub storage_path: PathBuf,
}

impl MediaAsset {
    pub fn file_name(&self) -> String {
        self.storage_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// A slot the enricher could not fill, and why. Degrades the card, never the
/// batch.
#[derive(Debug, Clone)]
pub struct EnrichmentWarning {
    pub slot: MediaSlot,
    pub reason: String,
}

/// One record together with whatever media resolved for it. Scoped to a
/// single synthesis pass.
#[derive(Debug)]
pub struct EnrichedRecord<'a> {
    pub record: &'a Record,
    pub media: BTreeMap<MediaSlot, MediaAsset>,
    pub warnings: Vec<EnrichmentWarning>,
}

impl<'a> EnrichedRecord<'a> {
    pub fn asset(&self, slot: MediaSlot) -> Option<&MediaAsset> {
        self.media.get(&slot)
    }

    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}
