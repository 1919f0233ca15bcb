use crate::models::cv::CvSection;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct UpsertCvRequest {
    #[validate(length(min = 1, message = "at least one CV section is required"))]
    pub sections: Vec<CvSectionPayload>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CvSectionPayload {
    pub name: String,
    pub content: String,
}

impl From<CvSectionPayload> for CvSection {
    fn from(p: CvSectionPayload) -> Self {
        CvSection {
            name: p.name,
            content: p.content,
        }
    }
}
