//! Profile domain: onboarding questionnaire and per-user profile records.
//!
//! The profile is what onboarding produces: who the user is, who they are
//! trying to meet, what holds them back, and which flirting style landed
//! best in the calibration round.

pub mod onboarding;
pub mod store;

pub use onboarding::{Onboarding, OnboardingAnswers, OnboardingError, OnboardingStep};
pub use store::{ProfileStore, StoreError};

use serde::{Deserialize, Serialize};

/// A flirting style, used to tag calibration lines and score votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RizzStyle {
    Smooth,
    Funny,
    Bold,
    Witty,
}

impl RizzStyle {
    /// Score order; later styles win ties.
    pub const ALL: [RizzStyle; 4] = [
        RizzStyle::Smooth,
        RizzStyle::Funny,
        RizzStyle::Bold,
        RizzStyle::Witty,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RizzStyle::Smooth => "smooth",
            RizzStyle::Funny => "funny",
            RizzStyle::Bold => "bold",
            RizzStyle::Witty => "witty",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

/// Calibration votes per style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RizzScore {
    #[serde(default)]
    pub smooth: u32,
    #[serde(default)]
    pub funny: u32,
    #[serde(default)]
    pub bold: u32,
    #[serde(default)]
    pub witty: u32,
}

impl RizzScore {
    pub fn get(&self, style: RizzStyle) -> u32 {
        match style {
            RizzStyle::Smooth => self.smooth,
            RizzStyle::Funny => self.funny,
            RizzStyle::Bold => self.bold,
            RizzStyle::Witty => self.witty,
        }
    }

    pub fn vote(&mut self, style: RizzStyle) {
        let slot = match style {
            RizzStyle::Smooth => &mut self.smooth,
            RizzStyle::Funny => &mut self.funny,
            RizzStyle::Bold => &mut self.bold,
            RizzStyle::Witty => &mut self.witty,
        };
        *slot += 1;
    }

    /// Highest-scoring style. A style only stays ahead of a later one
    /// while strictly greater, so ties go to the later style and an
    /// all-zero score yields `Witty`.
    pub fn dominant(&self) -> RizzStyle {
        RizzStyle::ALL
            .into_iter()
            .reduce(|best, next| if self.get(best) > self.get(next) { best } else { next })
            .unwrap_or(RizzStyle::Witty)
    }
}

/// A completed onboarding profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub user_gender: String,
    pub target_gender: String,
    pub struggle: String,
    pub platform: String,
    pub blocker: String,
    #[serde(default)]
    pub preferred_rizz: Option<RizzStyle>,
    #[serde(default)]
    pub rizz_score: RizzScore,
}
