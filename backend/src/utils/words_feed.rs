use dashmap::DashMap;
use std::collections::HashSet;
use thiserror::Error;

use crate::models::words_models::{demo_entries, LikeStatus, WordsCard, WordsEntry};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WordsError {
    #[error("Words entry {0} not found")]
    EntryNotFound(u64),
}

/// The "Words for the World" feed. Entries are fixed; likes are per member
/// and toggle.
pub struct WordsFeed {
    entries: Vec<WordsEntry>,
    likes: DashMap<u64, HashSet<String>>,
}

impl WordsFeed {
    pub fn new(entries: Vec<WordsEntry>) -> Self {
        Self {
            entries,
            likes: DashMap::new(),
        }
    }

    pub fn with_demo_entries() -> Self {
        Self::new(demo_entries())
    }

    /// All cards in feed order. `viewer` decides the `liked` flag.
    pub fn cards(&self, viewer: Option<&str>) -> Vec<WordsCard> {
        self.entries
            .iter()
            .map(|entry| self.card_for(entry, viewer))
            .collect()
    }

    pub fn card(&self, id: u64, viewer: Option<&str>) -> Result<WordsCard, WordsError> {
        let entry = self.entry(id)?;
        Ok(self.card_for(entry, viewer))
    }

    /// Likes the entry for the member, or takes the like back if it was
    /// already there.
    pub fn toggle_like(&self, id: u64, member_id: &str) -> Result<LikeStatus, WordsError> {
        self.entry(id)?;
        let mut likers = self.likes.entry(id).or_default();
        let liked = if likers.remove(member_id) {
            false
        } else {
            likers.insert(member_id.to_string());
            true
        };
        Ok(LikeStatus {
            id,
            likes: likers.len(),
            liked,
        })
    }

    fn entry(&self, id: u64) -> Result<&WordsEntry, WordsError> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .ok_or(WordsError::EntryNotFound(id))
    }

    fn card_for(&self, entry: &WordsEntry, viewer: Option<&str>) -> WordsCard {
        let (likes, liked) = match self.likes.get(&entry.id) {
            Some(likers) => (
                likers.len(),
                viewer.is_some_and(|member| likers.contains(member)),
            ),
            None => (0, false),
        };
        WordsCard {
            id: entry.id,
            name: entry.name.clone(),
            location: entry.location.clone(),
            location_label: entry.location.label(),
            map_link: entry.location.map_path(),
            excerpt: entry.excerpt(),
            comment: entry.full_comment(),
            likes,
            liked,
        }
    }
}
