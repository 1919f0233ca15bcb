use serde::{Deserialize, Serialize};

/// Pipeline stage names as they appear in history entries and
/// `status_dates` keys.
pub const STAGE_CV_UPLOAD: &str = "CV Upload";
pub const STAGE_CV_SCREENING: &str = "CV Screening";
pub const STAGE_AI_INTERVIEW: &str = "AI Interview";
pub const STAGE_PENDING_AI_INTERVIEW: &str = "Pending AI Interview";

/// Applicant-facing status labels.
pub const STATUS_FOR_CV_UPLOAD: &str = "For CV Upload";
pub const STATUS_FOR_CV_SCREENING: &str = "For CV Screening";
pub const STATUS_FOR_AI_INTERVIEW: &str = "For AI Interview";

/// Coarse lifecycle labels stored in `application_status`.
pub const APPLICATION_ONGOING: &str = "Ongoing";
pub const APPLICATION_DROPPED: &str = "Dropped";
pub const APPLICATION_CANCELLED: &str = "Cancelled";

/// Actor recorded on automatic transitions.
pub const SYSTEM_ACTOR: &str = "system";

/// The classifier's categorical fit judgment. Closed set: any other string
/// coming back from the model is rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "No Fit")]
    NoFit,
    #[serde(rename = "Bad Fit")]
    BadFit,
    #[serde(rename = "Good Fit")]
    GoodFit,
    #[serde(rename = "Strong Fit")]
    StrongFit,
    #[serde(rename = "Ineligible CV")]
    IneligibleCv,
    #[serde(rename = "Insufficient Data")]
    InsufficientData,
}

impl Verdict {
    pub const ALL: [Verdict; 6] = [
        Verdict::NoFit,
        Verdict::BadFit,
        Verdict::GoodFit,
        Verdict::StrongFit,
        Verdict::IneligibleCv,
        Verdict::InsufficientData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::NoFit => "No Fit",
            Verdict::BadFit => "Bad Fit",
            Verdict::GoodFit => "Good Fit",
            Verdict::StrongFit => "Strong Fit",
            Verdict::IneligibleCv => "Ineligible CV",
            Verdict::InsufficientData => "Insufficient Data",
        }
    }

    pub fn parse(s: &str) -> Option<Verdict> {
        Verdict::ALL.iter().copied().find(|v| v.as_str() == s.trim())
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse grouping of verdicts that drives the stage/status transition.
/// `IneligibleCv` takes the review (no-transition) path: it belongs to
/// neither the drop nor the promotion set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Review,
    Drop,
    Promotion,
}

impl From<Verdict> for Bucket {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::NoFit | Verdict::BadFit => Bucket::Drop,
            Verdict::GoodFit | Verdict::StrongFit => Bucket::Promotion,
            Verdict::InsufficientData | Verdict::IneligibleCv => Bucket::Review,
        }
    }
}

/// UI-facing tri-state summarizing outcome severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateClass {
    Accepted,
    Good,
    Rejected,
}

impl StateClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateClass::Accepted => "accepted",
            StateClass::Good => "good",
            StateClass::Rejected => "rejected",
        }
    }
}

/// Pass/fail outcome of the screening against the job's configured setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingResult {
    Passed,
    Failed,
}

impl SettingResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingResult::Passed => "Passed",
            SettingResult::Failed => "Failed",
        }
    }
}

/// Organization-configured policy narrowing which verdicts count as passing.
/// Unrecognized or absent settings leave the base result untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreeningSetting {
    OnlyStrongFit,
    GoodFitAndAbove,
}

impl ScreeningSetting {
    pub fn parse(raw: &str) -> Option<ScreeningSetting> {
        match raw {
            "Only Strong Fit" => Some(ScreeningSetting::OnlyStrongFit),
            "Good Fit and above" => Some(ScreeningSetting::GoodFitAndAbove),
            _ => None,
        }
    }
}

/// Parsed classifier output: verdict plus reason and the two 0-100 scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvVerdict {
    pub result: Verdict,
    pub reason: String,
    pub confidence: i32,
    #[serde(rename = "jobFitScore")]
    pub job_fit_score: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_round_trips_display_labels() {
        for v in Verdict::ALL {
            assert_eq!(Verdict::parse(v.as_str()), Some(v));
        }
        assert_eq!(Verdict::parse("Maybe Fit"), None);
        assert_eq!(Verdict::parse(""), None);
    }

    #[test]
    fn every_verdict_maps_to_exactly_one_bucket() {
        assert_eq!(Bucket::from(Verdict::NoFit), Bucket::Drop);
        assert_eq!(Bucket::from(Verdict::BadFit), Bucket::Drop);
        assert_eq!(Bucket::from(Verdict::GoodFit), Bucket::Promotion);
        assert_eq!(Bucket::from(Verdict::StrongFit), Bucket::Promotion);
        assert_eq!(Bucket::from(Verdict::InsufficientData), Bucket::Review);
        assert_eq!(Bucket::from(Verdict::IneligibleCv), Bucket::Review);
    }

    #[test]
    fn screening_setting_parses_known_labels_only() {
        assert_eq!(
            ScreeningSetting::parse("Only Strong Fit"),
            Some(ScreeningSetting::OnlyStrongFit)
        );
        assert_eq!(
            ScreeningSetting::parse("Good Fit and above"),
            Some(ScreeningSetting::GoodFitAndAbove)
        );
        assert_eq!(ScreeningSetting::parse("Anything Goes"), None);
        assert_eq!(ScreeningSetting::parse(""), None);
    }
}
