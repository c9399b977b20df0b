//! Up-next queue
//!
//! FIFO of stories to load when the current one completes with autoplay on.

use dreams_core::{Story, StoryId};
use std::collections::VecDeque;

/// Stories waiting to be played
#[derive(Debug, Clone, Default)]
pub struct UpNext {
    stories: VecDeque<Story>,
}

impl UpNext {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a story at the end
    pub fn push(&mut self, story: Story) {
        self.stories.push_back(story);
    }

    /// Take the next story
    pub fn pop(&mut self) -> Option<Story> {
        self.stories.pop_front()
    }

    /// Look at the next story without taking it
    pub fn peek(&self) -> Option<&Story> {
        self.stories.front()
    }

    /// Remove a story by ID
    pub fn remove(&mut self, id: &StoryId) -> Option<Story> {
        let index = self.stories.iter().position(|s| &s.id == id)?;
        self.stories.remove(index)
    }

    /// Drop every queued story
    pub fn clear(&mut self) {
        self.stories.clear();
    }

    /// Number of queued stories
    pub fn len(&self) -> usize {
        self.stories.len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    /// Queued stories in play order
    pub fn iter(&self) -> impl Iterator<Item = &Story> {
        self.stories.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dreams_core::Category;

    #[test]
    fn fifo_order() {
        let mut queue = UpNext::new();
        queue.push(Story::new("First", Category::Mythology));
        queue.push(Story::new("Second", Category::Mythology));

        assert_eq!(queue.peek().map(|s| s.title.as_str()), Some("First"));
        assert_eq!(queue.pop().map(|s| s.title), Some("First".to_string()));
        assert_eq!(queue.pop().map(|s| s.title), Some("Second".to_string()));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn remove_by_id() {
        let mut queue = UpNext::new();
        let keep = Story::new("Keep", Category::Renaissance);
        let drop = Story::new("Drop", Category::Renaissance);
        queue.push(keep.clone());
        queue.push(drop.clone());

        assert!(queue.remove(&drop.id).is_some());
        assert!(queue.remove(&drop.id).is_none());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.iter().next().map(|s| &s.id), Some(&keep.id));
    }

    #[test]
    fn clear_empties() {
        let mut queue = UpNext::new();
        queue.push(Story::new("Only", Category::ModernHistory));
        queue.clear();
        assert!(queue.is_empty());
    }
}
