//! External quick links shown next to the calendar.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickLink {
    pub icon: String,
    pub name: String,
    pub url: String,
}

impl QuickLink {
    fn new(icon: &str, name: &str, url: &str) -> Self {
        QuickLink {
            icon: icon.to_string(),
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

/// Meal menu, classroom and chat.
pub fn default_links() -> Vec<QuickLink> {
    vec![
        QuickLink::new(
            "🍱",
            "급식표",
            "https://school.koreacharts.com/school/meals/B000023143/contents.html",
        ),
        QuickLink::new("🏫", "클래스룸", "http://classroom.google.com/?pli=1"),
        QuickLink::new("💬", "구글 챗", "https://mail.google.com/chat/u/0/#chat/home"),
    ]
}
