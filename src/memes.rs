//! Content supply for the caption phase.
//!
//! Each round every active player is dealt one meme with caption-slot layout
//! metadata. The lookup sits behind a trait so the built-in catalog can be
//! swapped for an external service.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Result type for content lookups
pub type ContentResult<T> = Result<T, MemeError>;

/// Errors that can occur while fetching memes
#[derive(Debug, thiserror::Error)]
pub enum MemeError {
    #[error("catalog exhausted: requested {requested} memes, only {available} available")]
    Exhausted { requested: usize, available: usize },

    #[error("content lookup failed: {0}")]
    LookupFailed(String),
}

/// Layout metadata for one caption slot on a meme.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaptionSlot {
    /// Horizontal anchor, fraction of image width
    pub x: f32,
    /// Vertical anchor, fraction of image height
    pub y: f32,
    /// Slot width, fraction of image width
    pub width: f32,
    /// Rotation in degrees
    pub rotation: f32,
    pub max_lines: u32,
}

/// One playable content item: the image plus where its captions go.
///
/// The slot count determines how many caption strings a submission must carry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MemeContent {
    pub id: u32,
    pub name: String,
    pub url: String,
    pub captions: Vec<CaptionSlot>,
}

/// Trait that all content providers must implement
#[async_trait]
pub trait MemeProvider: Send + Sync {
    /// Fetch `n` distinct memes, one per active player in a round.
    async fn get_random_memes(&self, n: usize) -> ContentResult<Vec<MemeContent>>;

    /// Get the name of this provider
    fn name(&self) -> &str;
}

/// Built-in meme catalog sampled uniformly without repeats.
pub struct CatalogProvider {
    catalog: Vec<MemeContent>,
}

fn slot(x: f32, y: f32, width: f32) -> CaptionSlot {
    CaptionSlot {
        x,
        y,
        width,
        rotation: 0.0,
        max_lines: 2,
    }
}

fn meme(id: u32, name: &str, url: &str, slots: Vec<CaptionSlot>) -> MemeContent {
    MemeContent {
        id,
        name: name.to_string(),
        url: url.to_string(),
        captions: slots,
    }
}

impl CatalogProvider {
    pub fn new() -> Self {
        let catalog = vec![
            meme(
                1,
                "Distracted Boyfriend",
                "/memes/distracted-boyfriend.jpg",
                vec![slot(0.2, 0.8, 0.25), slot(0.5, 0.8, 0.25), slot(0.8, 0.8, 0.25)],
            ),
            meme(
                2,
                "Drake Hotline Bling",
                "/memes/drake.jpg",
                vec![slot(0.75, 0.25, 0.45), slot(0.75, 0.75, 0.45)],
            ),
            meme(
                3,
                "Two Buttons",
                "/memes/two-buttons.jpg",
                vec![slot(0.3, 0.1, 0.25), slot(0.6, 0.08, 0.25)],
            ),
            meme(
                4,
                "Change My Mind",
                "/memes/change-my-mind.jpg",
                vec![slot(0.55, 0.65, 0.4)],
            ),
            meme(
                5,
                "Woman Yelling at a Cat",
                "/memes/woman-yelling-at-cat.jpg",
                vec![slot(0.25, 0.1, 0.45), slot(0.75, 0.1, 0.45)],
            ),
            meme(
                6,
                "Expanding Brain",
                "/memes/expanding-brain.jpg",
                vec![
                    slot(0.25, 0.12, 0.45),
                    slot(0.25, 0.38, 0.45),
                    slot(0.25, 0.62, 0.45),
                    slot(0.25, 0.88, 0.45),
                ],
            ),
            meme(
                7,
                "Surprised Pikachu",
                "/memes/surprised-pikachu.jpg",
                vec![slot(0.5, 0.1, 0.9)],
            ),
            meme(
                8,
                "This Is Fine",
                "/memes/this-is-fine.jpg",
                vec![slot(0.5, 0.9, 0.8)],
            ),
            meme(
                9,
                "Left Exit 12 Off Ramp",
                "/memes/left-exit-12.jpg",
                vec![slot(0.3, 0.2, 0.25), slot(0.65, 0.2, 0.25)],
            ),
            meme(
                10,
                "Is This a Pigeon?",
                "/memes/is-this-a-pigeon.jpg",
                vec![slot(0.3, 0.15, 0.35), slot(0.75, 0.3, 0.3), slot(0.5, 0.9, 0.8)],
            ),
            meme(
                11,
                "Gru's Plan",
                "/memes/grus-plan.jpg",
                vec![
                    slot(0.3, 0.3, 0.35),
                    slot(0.8, 0.3, 0.35),
                    slot(0.3, 0.8, 0.35),
                    slot(0.8, 0.8, 0.35),
                ],
            ),
            meme(
                12,
                "One Does Not Simply",
                "/memes/one-does-not-simply.jpg",
                vec![slot(0.5, 0.1, 0.9), slot(0.5, 0.9, 0.9)],
            ),
        ];
        Self { catalog }
    }
}

impl Default for CatalogProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemeProvider for CatalogProvider {
    async fn get_random_memes(&self, n: usize) -> ContentResult<Vec<MemeContent>> {
        if n > self.catalog.len() {
            return Err(MemeError::Exhausted {
                requested: n,
                available: self.catalog.len(),
            });
        }

        let mut indices: Vec<usize> = (0..self.catalog.len()).collect();
        indices.shuffle(&mut rand::rng());
        indices.truncate(n);

        Ok(indices.into_iter().map(|i| self.catalog[i].clone()).collect())
    }

    fn name(&self) -> &str {
        "catalog"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_memes_are_distinct() {
        let provider = CatalogProvider::new();
        let memes = provider.get_random_memes(6).await.unwrap();

        assert_eq!(memes.len(), 6);
        let ids: HashSet<u32> = memes.iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), 6, "no repeats within a batch");
    }

    #[tokio::test]
    async fn test_exhausted_catalog_fails() {
        let provider = CatalogProvider::new();
        let result = provider.get_random_memes(1000).await;

        assert!(matches!(result, Err(MemeError::Exhausted { .. })));
    }

    #[tokio::test]
    async fn test_every_meme_has_caption_slots() {
        let provider = CatalogProvider::new();
        let memes = provider.get_random_memes(12).await.unwrap();

        for m in &memes {
            assert!(!m.captions.is_empty(), "{} has no caption slots", m.name);
        }
    }
}
