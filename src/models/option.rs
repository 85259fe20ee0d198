//! Date option data model
//!
//! A date option is an immutable value describing one outing the user can
//! pick. Options have no id; they are identified by their position in
//! [`catalog`].

use serde::{Deserialize, Serialize};

/// One selectable date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOption {
    /// Short headline shown on the card and the ticket
    pub title: String,
    /// One-line pitch
    pub description: String,
    /// Human-readable time, never parsed
    pub time: String,
    /// Where to meet
    pub location: String,
    /// Personal note, shown quoted
    pub note: String,
    /// URL (or local path) of the picture shown on the card and ticket
    pub image_ref: String,
}

impl DateOption {
    /// Create a new date option
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        time: impl Into<String>,
        location: impl Into<String>,
        note: impl Into<String>,
        image_ref: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            time: time.into(),
            location: location.into(),
            note: note.into(),
            image_ref: image_ref.into(),
        }
    }

    /// Set the image reference
    pub fn with_image_ref(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = image_ref.into();
        self
    }
}

/// The three dates on offer, in display order
pub fn catalog() -> Vec<DateOption> {
    vec![
        DateOption::new(
            "Café Hopping at Jubilee Hills",
            "Let's explore the trendy cafés of Jubilee Hills",
            "Saturday, 2:00 PM",
            "Roastery Coffee House, Road No. 45",
            "They have the best coffee and ambiance in Hyderabad",
            "https://images.unsplash.com/photo-1554118811-1e0d58224f24?auto=format&fit=crop&w=800",
        ),
        DateOption::new(
            "Evening at Tank Bund",
            "A romantic walk along the Hussain Sagar Lake",
            "Friday, 6:30 PM",
            "Tank Bund, Hussain Sagar",
            "Perfect for watching the sunset over the Buddha statue",
            "https://images.unsplash.com/photo-1580674684081-7617fbf3d745?auto=format&fit=crop&w=800",
        ),
        DateOption::new(
            "Dinner with a View",
            "Fine dining with a panoramic view of the city",
            "Saturday, 7:00 PM",
            "Altitude Lounge, Hyderabad Marriott",
            "The city lights look magical from here",
            "https://images.unsplash.com/photo-1517248135467-4c7edcad34c4?auto=format&fit=crop&w=800",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order() {
        let options = catalog();
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].title, "Café Hopping at Jubilee Hills");
        assert_eq!(options[1].title, "Evening at Tank Bund");
        assert_eq!(options[2].title, "Dinner with a View");
    }

    #[test]
    fn test_catalog_entries_are_complete() {
        for option in catalog() {
            assert!(!option.title.is_empty());
            assert!(!option.time.is_empty());
            assert!(!option.location.is_empty());
            assert!(!option.note.is_empty());
            assert!(option.image_ref.starts_with("https://"));
        }
    }

    #[test]
    fn test_with_image_ref() {
        let option = catalog().remove(0).with_image_ref("/tmp/cafe.png");
        assert_eq!(option.image_ref, "/tmp/cafe.png");
        assert_eq!(option.time, "Saturday, 2:00 PM");
    }

    #[test]
    fn test_toml_serialization() {
        let option = catalog().remove(1);
        let text = toml::to_string(&option).expect("Failed to serialize to TOML");
        let back: DateOption = toml::from_str(&text).expect("Failed to deserialize from TOML");
        assert_eq!(option, back);
    }
}
