use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A listing as handed over by the scraper. Any field may be absent when the
/// page did not render it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawListing {
    pub title: Option<String>,
    pub company: Option<String>,
    pub date: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
}

/// One captured job posting. Fields are trimmed at capture time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedListing {
    pub title: String,
    pub company: String,
    pub date: String,
    pub link: String,
    pub description: String,
}

impl TryFrom<RawListing> for ScrapedListing {
    type Error = ValidationError;

    fn try_from(raw: RawListing) -> Result<Self, Self::Error> {
        fn field(value: Option<String>, name: &'static str) -> Result<String, ValidationError> {
            value
                .map(|v| v.trim().to_string())
                .ok_or(ValidationError::MissingField(name))
        }

        Ok(ScrapedListing {
            title: field(raw.title, "title")?,
            company: field(raw.company, "company")?,
            date: field(raw.date, "date")?,
            link: field(raw.link, "link")?,
            description: field(raw.description, "description")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawListing {
        RawListing {
            title: Some("  Data Scientist ".into()),
            company: Some("Acme\n".into()),
            date: Some("2023-03-01".into()),
            link: Some(" https://www.linkedin.com/jobs/view/1 ".into()),
            description: Some("\tBuild models.  ".into()),
        }
    }

    #[test]
    fn trims_every_field() {
        let listing = ScrapedListing::try_from(raw()).unwrap();
        assert_eq!(listing.title, "Data Scientist");
        assert_eq!(listing.company, "Acme");
        assert_eq!(listing.link, "https://www.linkedin.com/jobs/view/1");
        assert_eq!(listing.description, "Build models.");
    }

    #[test]
    fn empty_description_is_kept() {
        let mut r = raw();
        r.description = Some("   ".into());
        let listing = ScrapedListing::try_from(r).unwrap();
        assert_eq!(listing.description, "");
    }

    #[test]
    fn missing_field_is_rejected() {
        let mut r = raw();
        r.company = None;
        assert_eq!(
            ScrapedListing::try_from(r),
            Err(ValidationError::MissingField("company"))
        );
    }
}
