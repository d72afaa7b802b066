//! Lesson records and the derived catalog views.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SimError;

/// Identifiers with a dedicated generation program
pub const KNOWN_PATTERNS: &[&str] = &[
    "hammer",
    "shooting_star",
    "hanging_man",
    "inverted_hammer",
    "doji_std",
    "doji_long",
    "doji_dragonfly",
    "doji_gravestone",
    "marubozu_bull",
    "marubozu_bear",
    "engulfing_bull",
    "engulfing_bear",
    "harami_bull",
    "harami_bear",
    "piercing",
    "dark_cloud",
    "morning_star",
    "evening_star",
    "three_white_soldiers",
    "three_black_crows",
    "rsi_oversold",
    "rsi_overbought",
    "w_bottom",
    "m_top",
    "head_shoulders",
    "head_shoulders_inv",
    "flag_bull",
    "flag_bear",
    "triangle_asc",
    "ma_cross_bull",
    "boll_squeeze",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Basics,
    Kline,
    Pattern,
    Indicator,
    Risk,
    Mindset,
    Cases,
    Tools,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Basics,
        Category::Kline,
        Category::Pattern,
        Category::Indicator,
        Category::Risk,
        Category::Mindset,
        Category::Cases,
        Category::Tools,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Basics => "basics",
            Category::Kline => "kline",
            Category::Pattern => "pattern",
            Category::Indicator => "indicator",
            Category::Risk => "risk",
            Category::Mindset => "mindset",
            Category::Cases => "cases",
            Category::Tools => "tools",
        }
    }
}

impl FromStr for Category {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or(SimError::InvalidValue("unknown lesson category"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    HighRisk,
    Practical,
}

/// One lesson as the core consumes it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub category: Category,
    /// Pattern identifier driving scenario generation
    pub pattern: String,
    pub difficulty: Difficulty,
    pub summary: String,
}

impl Lesson {
    pub fn new(id: impl Into<String>, title: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            category: Category::Basics,
            pattern: pattern.into(),
            difficulty: Difficulty::default(),
            summary: String::new(),
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Whether the pattern has its own program rather than the fallback
    pub fn has_known_pattern(&self) -> bool {
        KNOWN_PATTERNS.contains(&self.pattern.as_str())
    }
}

/// Lessons per category; every category is present, possibly with zero.
pub fn category_counts(lessons: &[Lesson]) -> BTreeMap<Category, usize> {
    let mut counts: BTreeMap<Category, usize> = Category::ALL.into_iter().map(|c| (c, 0)).collect();
    for lesson in lessons {
        *counts.entry(lesson.category).or_default() += 1;
    }
    counts
}

/// Lessons in `category` whose title or summary contains `query`.
///
/// An empty query matches every lesson in the category.
pub fn filter_lessons<'a>(lessons: &'a [Lesson], category: Category, query: &str) -> Vec<&'a Lesson> {
    lessons
        .iter()
        .filter(|l| l.category == category)
        .filter(|l| l.title.contains(query) || l.summary.contains(query))
        .collect()
}
