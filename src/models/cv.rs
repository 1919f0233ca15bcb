use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A named CV section with free-text content. Section order is the order
/// the applicant submitted; flattening for the classifier preserves it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvSection {
    pub name: String,
    pub content: String,
}

/// One CV per candidate email. Uploads replace the prior CV wholesale;
/// there is no versioning.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicantCv {
    pub candidate_email: String,
    pub digital_cv: Json<Vec<CvSection>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ApplicantCv {
    /// Concatenate section names and content into the plain-text block fed
    /// to the classifier. Stored order, no deduplication.
    pub fn flatten(&self) -> String {
        let mut out = String::new();
        for section in self.digital_cv.iter() {
            out.push_str(&section.name);
            out.push('\n');
            out.push_str(&section.content);
            out.push_str("\n\n");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_preserves_section_order_and_repeats() {
        let cv = ApplicantCv {
            candidate_email: "a@b.c".into(),
            digital_cv: Json(vec![
                CvSection {
                    name: "Experience".into(),
                    content: "5 years Rust".into(),
                },
                CvSection {
                    name: "Experience".into(),
                    content: "2 years Go".into(),
                },
                CvSection {
                    name: "Education".into(),
                    content: "BSc".into(),
                },
            ]),
            created_at: None,
            updated_at: None,
        };
        let text = cv.flatten();
        let exp_first = text.find("5 years Rust").unwrap();
        let exp_second = text.find("2 years Go").unwrap();
        let edu = text.find("Education").unwrap();
        assert!(exp_first < exp_second && exp_second < edu);
        assert_eq!(text.matches("Experience").count(), 2);
    }
}
