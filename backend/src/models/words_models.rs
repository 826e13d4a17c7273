use serde::Serialize;

use crate::models::profile_models::Location;

/// Characters shown on a collapsed card.
pub const EXCERPT_MAX_CHARS: usize = 300;
/// Words shown on an expanded card.
pub const COMMENT_MAX_WORDS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordsEntry {
    pub id: u64,
    pub name: String,
    pub location: Location,
    pub comment: String,
}

impl WordsEntry {
    pub fn new(id: u64, name: &str, location: Location, comment: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            location,
            comment: comment.to_string(),
        }
    }

    pub fn excerpt(&self) -> String {
        if self.comment.chars().count() > EXCERPT_MAX_CHARS {
            let head: String = self.comment.chars().take(EXCERPT_MAX_CHARS).collect();
            format!("{}...", head)
        } else {
            self.comment.clone()
        }
    }

    pub fn full_comment(&self) -> String {
        let words: Vec<&str> = self.comment.split(' ').collect();
        if words.len() > COMMENT_MAX_WORDS {
            format!("{}...", words[..COMMENT_MAX_WORDS].join(" "))
        } else {
            self.comment.clone()
        }
    }
}

/// One card of the feed as the client renders it.
#[derive(Debug, Clone, Serialize)]
pub struct WordsCard {
    pub id: u64,
    pub name: String,
    pub location: Location,
    pub location_label: String,
    pub map_link: String,
    pub excerpt: String,
    pub comment: String,
    pub likes: usize,
    pub liked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeStatus {
    pub id: u64,
    pub likes: usize,
    pub liked: bool,
}

const PLATFORM_PRAISE: &str = "I absolutely love this platform! The user interface is intuitive, and the features are robust. I’ve been using it for weeks, and it has significantly improved my workflow. Highly recommend to anyone looking for a seamless experience. The community support is also fantastic, always ready to help with any questions. Can’t wait to see what new features are added in the future!";

pub fn demo_entries() -> Vec<WordsEntry> {
    vec![
        WordsEntry::new(
            1,
            "Trevor Lukanen",
            Location::new("Seattle", "WA", "USA"),
            PLATFORM_PRAISE,
        ),
        WordsEntry::new(
            2,
            "Yeng Lukanen",
            Location::new("Portland", "OR", "USA"),
            PLATFORM_PRAISE,
        ),
        WordsEntry::new(
            3,
            "Alice Johnson",
            Location::new("Toronto", "ON", "Canada"),
            PLATFORM_PRAISE,
        ),
        WordsEntry::new(
            4,
            "Bob Smith",
            Location::new("Austin", "TX", "USA"),
            "Great tool, but there’s a slight learning curve. Once you get the hang of it, it’s super powerful. I’ve used it for multiple projects, and it handles everything I throw at it. The only thing I’d suggest is more detailed documentation for beginners. Overall, a solid choice for professionals.",
        ),
        WordsEntry::new(
            5,
            "Clara Davis",
            Location::new("Vancouver", "BC", "Canada"),
            "This has been a game-changer for my team. We’ve streamlined our processes and saved so much time. The collaboration features are top-notch, and the performance is reliable. I did encounter a small bug, but the support team resolved it quickly. Definitely worth trying out if you’re looking to boost productivity.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_comment_is_cut_for_the_collapsed_card() {
        let entry = WordsEntry::new(9, "Ada", Location::default(), &"é".repeat(EXCERPT_MAX_CHARS + 5));
        let excerpt = entry.excerpt();
        assert!(excerpt.ends_with("..."));
        assert_eq!(excerpt.chars().count(), EXCERPT_MAX_CHARS + 3);
    }

    #[test]
    fn short_comment_is_shown_whole() {
        let entry = WordsEntry::new(9, "Ada", Location::default(), "Short and sweet");
        assert_eq!(entry.excerpt(), "Short and sweet");
        assert_eq!(entry.full_comment(), "Short and sweet");
    }

    #[test]
    fn full_comment_keeps_at_most_500_words() {
        let comment = vec!["word"; COMMENT_MAX_WORDS + 10].join(" ");
        let entry = WordsEntry::new(9, "Ada", Location::default(), &comment);
        let full = entry.full_comment();
        assert!(full.ends_with("word..."));
        assert_eq!(full.split(' ').count(), COMMENT_MAX_WORDS);
    }

    #[test]
    fn demo_feed_has_five_located_entries() {
        let entries = demo_entries();
        assert_eq!(entries.len(), 5);
        assert!(entries.iter().all(|e| !e.location.is_blank()));
        assert_eq!(entries[2].location.label(), "Toronto, ON, Canada");
    }
}
