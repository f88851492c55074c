//! Onboarding wizard.
//!
//! Linear questionnaire: name, two gender questions, three multiple-choice
//! questions, a style pick, then a yes/no vote on each calibration line.
//! Finishing turns the votes into `preferredRizz`.

use serde::{Deserialize, Serialize};

use super::{Profile, RizzScore, RizzStyle};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum OnboardingError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("'{value}' is not an option for {step:?}")]
    InvalidOption { step: OnboardingStep, value: String },
    #[error("expected {expected:?}, wizard is at {actual:?}")]
    OutOfOrder {
        expected: OnboardingStep,
        actual: OnboardingStep,
    },
    #[error("expected {expected} calibration votes, got {actual}")]
    VoteCount { expected: usize, actual: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OnboardingStep {
    Name,
    UserGender,
    TargetGender,
    Struggle,
    Platform,
    Blocker,
    PreferredRizz,
    Calibration,
    Done,
}

impl OnboardingStep {
    fn next(self) -> Self {
        match self {
            OnboardingStep::Name => OnboardingStep::UserGender,
            OnboardingStep::UserGender => OnboardingStep::TargetGender,
            OnboardingStep::TargetGender => OnboardingStep::Struggle,
            OnboardingStep::Struggle => OnboardingStep::Platform,
            OnboardingStep::Platform => OnboardingStep::Blocker,
            OnboardingStep::Blocker => OnboardingStep::PreferredRizz,
            OnboardingStep::PreferredRizz => OnboardingStep::Calibration,
            OnboardingStep::Calibration | OnboardingStep::Done => OnboardingStep::Done,
        }
    }
}

const GENDER_OPTIONS: &[&str] = &["Male", "Female"];
const STRUGGLE_OPTIONS: &[&str] = &[
    "Starting conversations",
    "Keeping chats interesting",
    "Confidence",
    "Getting replies",
];
const PLATFORM_OPTIONS: &[&str] = &["Instagram / DMs", "In Person", "Tinder / Bumble / Hinge"];
const BLOCKER_OPTIONS: &[&str] = &[
    "Overthinking",
    "Fear of rejection",
    "Bad past experiences",
    "Not knowing what to say",
];
const STYLE_OPTIONS: &[&str] = &["Smooth", "Funny", "Bold", "Witty"];

/// One question as shown to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub step: OnboardingStep,
    pub title: &'static str,
    /// Empty for free-text steps.
    pub options: &'static [&'static str],
}

/// A pick-up line voted on during calibration.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CalibrationLine {
    pub text: &'static str,
    pub style: RizzStyle,
}

pub const CALIBRATION_LINES: [CalibrationLine; 8] = [
    CalibrationLine {
        text: "Are you tired? You've been running through my mind all day.",
        style: RizzStyle::Smooth,
    },
    CalibrationLine {
        text: "Do you play football? Because you're a keeper.",
        style: RizzStyle::Smooth,
    },
    CalibrationLine {
        text: "Are you a charger? Because I'm dying without you.",
        style: RizzStyle::Funny,
    },
    CalibrationLine {
        text: "Are you a loan? You've got my interest.",
        style: RizzStyle::Funny,
    },
    CalibrationLine {
        text: "I never believed in love at first sight, then I saw you.",
        style: RizzStyle::Bold,
    },
    CalibrationLine {
        text: "My mom told me not to talk to strangers online, but I'll make an exception for you.",
        style: RizzStyle::Bold,
    },
    CalibrationLine {
        text: "Do you have Instagram? My parents told me to follow my dreams.",
        style: RizzStyle::Witty,
    },
    CalibrationLine {
        text: "Angels should be in heaven. How'd you escape?",
        style: RizzStyle::Witty,
    },
];

/// The questionnaire in step order (calibration excluded).
pub fn questions() -> Vec<Question> {
    vec![
        Question {
            step: OnboardingStep::Name,
            title: "What's your name?",
            options: &[],
        },
        Question {
            step: OnboardingStep::UserGender,
            title: "Your gender?",
            options: GENDER_OPTIONS,
        },
        Question {
            step: OnboardingStep::TargetGender,
            title: "Who are you trying to pull?",
            options: GENDER_OPTIONS,
        },
        Question {
            step: OnboardingStep::Struggle,
            title: "What's your dating struggle?",
            options: STRUGGLE_OPTIONS,
        },
        Question {
            step: OnboardingStep::Platform,
            title: "Where will you use Rizzonator?",
            options: PLATFORM_OPTIONS,
        },
        Question {
            step: OnboardingStep::Blocker,
            title: "What's stopping you?",
            options: BLOCKER_OPTIONS,
        },
        Question {
            step: OnboardingStep::PreferredRizz,
            title: "What rizz style do you like?",
            options: STYLE_OPTIONS,
        },
    ]
}

/// Answers submitted in one go by a client that ran the wizard locally.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingAnswers {
    pub name: String,
    pub user_gender: String,
    pub target_gender: String,
    pub struggle: String,
    pub platform: String,
    pub blocker: String,
    #[serde(default)]
    pub preferred_rizz: Option<String>,
    /// One vote per calibration line, in order.
    #[serde(default)]
    pub votes: Vec<bool>,
}

impl OnboardingAnswers {
    /// Replay the answers through a fresh wizard.
    pub fn into_profile(self) -> Result<Profile, OnboardingError> {
        if self.votes.len() != CALIBRATION_LINES.len() {
            return Err(OnboardingError::VoteCount {
                expected: CALIBRATION_LINES.len(),
                actual: self.votes.len(),
            });
        }

        let mut wizard = Onboarding::new();
        wizard.answer(&self.name)?;
        wizard.answer(&self.user_gender)?;
        wizard.answer(&self.target_gender)?;
        wizard.answer(&self.struggle)?;
        wizard.answer(&self.platform)?;
        wizard.answer(&self.blocker)?;
        match self.preferred_rizz.as_deref() {
            Some(style) => wizard.answer(style)?,
            None => wizard.skip_style()?,
        }
        for yes in self.votes {
            wizard.vote(yes)?;
        }
        wizard.finish()
    }
}

/// Step-by-step onboarding state.
#[derive(Debug, Clone)]
pub struct Onboarding {
    step: OnboardingStep,
    calibration_index: usize,
    profile: Profile,
}

impl Default for Onboarding {
    fn default() -> Self {
        Self::new()
    }
}

impl Onboarding {
    pub fn new() -> Self {
        Self {
            step: OnboardingStep::Name,
            calibration_index: 0,
            profile: Profile::default(),
        }
    }

    pub fn step(&self) -> OnboardingStep {
        self.step
    }

    /// Calibration line awaiting a vote, if the wizard is calibrating.
    pub fn current_line(&self) -> Option<&'static CalibrationLine> {
        match self.step {
            OnboardingStep::Calibration => CALIBRATION_LINES.get(self.calibration_index),
            _ => None,
        }
    }

    /// Answer the current question and advance.
    ///
    /// Option answers must match one of the offered options (case-insensitive);
    /// the stored value uses the canonical spelling. Style answers are stored
    /// lowercase.
    pub fn answer(&mut self, value: &str) -> Result<(), OnboardingError> {
        let step = self.step;
        match step {
            OnboardingStep::Name => {
                let name = value.trim();
                if name.is_empty() {
                    return Err(OnboardingError::EmptyName);
                }
                self.profile.name = name.to_string();
            }
            OnboardingStep::UserGender => {
                self.profile.user_gender = pick(step, GENDER_OPTIONS, value)?;
            }
            OnboardingStep::TargetGender => {
                self.profile.target_gender = pick(step, GENDER_OPTIONS, value)?;
            }
            OnboardingStep::Struggle => {
                self.profile.struggle = pick(step, STRUGGLE_OPTIONS, value)?;
            }
            OnboardingStep::Platform => {
                self.profile.platform = pick(step, PLATFORM_OPTIONS, value)?;
            }
            OnboardingStep::Blocker => {
                self.profile.blocker = pick(step, BLOCKER_OPTIONS, value)?;
            }
            OnboardingStep::PreferredRizz => {
                let style = RizzStyle::parse(value).ok_or_else(|| OnboardingError::InvalidOption {
                    step,
                    value: value.to_string(),
                })?;
                self.profile.preferred_rizz = Some(style);
            }
            OnboardingStep::Calibration | OnboardingStep::Done => {
                return Err(OnboardingError::OutOfOrder {
                    expected: OnboardingStep::PreferredRizz,
                    actual: step,
                });
            }
        }
        self.step = step.next();
        Ok(())
    }

    /// Move past the style question without picking one; calibration decides.
    pub fn skip_style(&mut self) -> Result<(), OnboardingError> {
        self.require_step(OnboardingStep::PreferredRizz)?;
        self.step = self.step.next();
        Ok(())
    }

    /// Vote on the current calibration line.
    pub fn vote(&mut self, yes: bool) -> Result<(), OnboardingError> {
        self.require_step(OnboardingStep::Calibration)?;
        if let Some(line) = CALIBRATION_LINES.get(self.calibration_index) {
            if yes {
                self.profile.rizz_score.vote(line.style);
            }
            self.calibration_index += 1;
        }
        if self.calibration_index >= CALIBRATION_LINES.len() {
            self.step = OnboardingStep::Done;
        }
        Ok(())
    }

    pub fn score(&self) -> RizzScore {
        self.profile.rizz_score
    }

    /// Complete onboarding. The dominant calibration style replaces any
    /// style picked earlier.
    pub fn finish(mut self) -> Result<Profile, OnboardingError> {
        self.require_step(OnboardingStep::Done)?;
        self.profile.preferred_rizz = Some(self.profile.rizz_score.dominant());
        log::info!(
            "[PROFILE] Onboarding finished: style={:?} score={:?}",
            self.profile.preferred_rizz,
            self.profile.rizz_score
        );
        Ok(self.profile)
    }

    fn require_step(&self, expected: OnboardingStep) -> Result<(), OnboardingError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(OnboardingError::OutOfOrder {
                expected,
                actual: self.step,
            })
        }
    }
}

fn pick(
    step: OnboardingStep,
    options: &[&str],
    value: &str,
) -> Result<String, OnboardingError> {
    let value = value.trim();
    options
        .iter()
        .find(|o| o.eq_ignore_ascii_case(value))
        .map(|o| o.to_string())
        .ok_or_else(|| OnboardingError::InvalidOption {
            step,
            value: value.to_string(),
        })
}
