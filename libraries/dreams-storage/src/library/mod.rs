//! Story library
//!
//! In-memory catalogue of stories with the listings the home and library
//! screens show: by category, continue-listening, recently played and search.

use crate::progress;
use dreams_core::{Category, KeyValueStore, Story, StoryId};

/// Catalogue of known stories, in insertion order
#[derive(Debug, Clone, Default)]
pub struct StoryLibrary {
    stories: Vec<Story>,
}

impl StoryLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a library from existing stories
    pub fn with_stories(stories: impl IntoIterator<Item = Story>) -> Self {
        let mut library = Self::new();
        for story in stories {
            library.upsert(story);
        }
        library
    }

    /// Insert a story, replacing any story with the same ID
    pub fn upsert(&mut self, story: Story) {
        match self.stories.iter_mut().find(|s| s.id == story.id) {
            Some(existing) => *existing = story,
            None => self.stories.push(story),
        }
    }

    /// Remove a story
    pub fn remove(&mut self, id: &StoryId) -> Option<Story> {
        let index = self.stories.iter().position(|s| &s.id == id)?;
        Some(self.stories.remove(index))
    }

    /// Look up a story
    pub fn get(&self, id: &StoryId) -> Option<&Story> {
        self.stories.iter().find(|s| &s.id == id)
    }

    /// Look up a story for mutation
    pub fn get_mut(&mut self, id: &StoryId) -> Option<&mut Story> {
        self.stories.iter_mut().find(|s| &s.id == id)
    }

    /// All stories, in insertion order
    pub fn all(&self) -> &[Story] {
        &self.stories
    }

    /// Number of stories
    pub fn len(&self) -> usize {
        self.stories.len()
    }

    /// Whether the library is empty
    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    /// Stories of one era
    pub fn by_category(&self, category: Category) -> Vec<&Story> {
        self.stories
            .iter()
            .filter(|s| s.category == category)
            .collect()
    }

    /// Started-but-unfinished stories, most recently played first
    pub fn continue_listening(&self) -> Vec<&Story> {
        let mut stories: Vec<&Story> = self
            .stories
            .iter()
            .filter(|s| s.is_partially_played())
            .collect();
        stories.sort_by(|a, b| b.last_played.cmp(&a.last_played));
        stories
    }

    /// Up to `limit` played stories, most recent first
    pub fn recently_played(&self, limit: usize) -> Vec<&Story> {
        let mut stories: Vec<&Story> = self
            .stories
            .iter()
            .filter(|s| s.last_played.is_some())
            .collect();
        stories.sort_by(|a, b| b.last_played.cmp(&a.last_played));
        stories.truncate(limit);
        stories
    }

    /// Case-insensitive match on title, narrator, region or time period
    ///
    /// An empty (or all-whitespace) query matches everything.
    pub fn search(&self, query: &str) -> Vec<&Story> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.stories.iter().collect();
        }

        self.stories
            .iter()
            .filter(|s| {
                [&s.title, &s.narrator, &s.region, &s.time_period]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Refresh every story's progress from the progress store
    ///
    /// Stories with no saved progress keep `None`.
    pub fn apply_saved_progress(&mut self, store: &dyn KeyValueStore) {
        for story in &mut self.stories {
            let key = progress::key_for(&story.id);
            if matches!(store.get(&key), Ok(Some(_))) {
                story.progress = Some(progress::load(store, &story.id));
            }
        }
    }
}
