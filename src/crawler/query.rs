use itertools::Itertools;
use url::Url;

const SEARCH_URL: &str = "https://www.linkedin.com/jobs/search";

/// One search, fanned out over its locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub query: String,
    pub options: QueryOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub locations: Vec<String>,
    pub skip_promoted_jobs: bool,
    /// Listings to emit per location.
    pub limit: usize,
    pub filters: QueryFilters,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            locations: Vec::new(),
            skip_promoted_jobs: true,
            limit: 25,
            filters: QueryFilters::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relevance {
    Relevant,
    Recent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFilter {
    Any,
    Day,
    Week,
    Month,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobType {
    FullTime,
    PartTime,
    Temporary,
    Contract,
    Internship,
    Volunteer,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workplace {
    OnSite,
    Remote,
    Hybrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceLevel {
    Internship,
    EntryLevel,
    Associate,
    MidSenior,
    Director,
    Executive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFilters {
    pub relevance: Relevance,
    pub time: TimeFilter,
    pub job_types: Vec<JobType>,
    pub workplaces: Vec<Workplace>,
    pub experience: Vec<ExperienceLevel>,
}

impl Default for QueryFilters {
    fn default() -> Self {
        Self {
            relevance: Relevance::Relevant,
            time: TimeFilter::Month,
            job_types: vec![JobType::FullTime],
            workplaces: vec![Workplace::OnSite, Workplace::Remote, Workplace::Hybrid],
            experience: vec![
                ExperienceLevel::EntryLevel,
                ExperienceLevel::Associate,
                ExperienceLevel::MidSenior,
            ],
        }
    }
}

impl Relevance {
    fn code(self) -> &'static str {
        match self {
            Relevance::Relevant => "R",
            Relevance::Recent => "DD",
        }
    }
}

impl TimeFilter {
    fn code(self) -> Option<&'static str> {
        match self {
            TimeFilter::Any => None,
            TimeFilter::Day => Some("r86400"),
            TimeFilter::Week => Some("r604800"),
            TimeFilter::Month => Some("r2592000"),
        }
    }
}

impl JobType {
    fn code(self) -> &'static str {
        match self {
            JobType::FullTime => "F",
            JobType::PartTime => "P",
            JobType::Temporary => "T",
            JobType::Contract => "C",
            JobType::Internship => "I",
            JobType::Volunteer => "V",
            JobType::Other => "O",
        }
    }
}

impl Workplace {
    fn code(self) -> &'static str {
        match self {
            Workplace::OnSite => "1",
            Workplace::Remote => "2",
            Workplace::Hybrid => "3",
        }
    }
}

impl ExperienceLevel {
    fn code(self) -> &'static str {
        match self {
            ExperienceLevel::Internship => "1",
            ExperienceLevel::EntryLevel => "2",
            ExperienceLevel::Associate => "3",
            ExperienceLevel::MidSenior => "4",
            ExperienceLevel::Director => "5",
            ExperienceLevel::Executive => "6",
        }
    }
}

impl Query {
    pub fn new(query: impl Into<String>, options: QueryOptions) -> Self {
        Self {
            query: query.into(),
            options,
        }
    }

    /// Guest search page for `location`, starting at result offset `start`.
    pub fn search_url(&self, location: &str, start: usize) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(SEARCH_URL)?;
        let filters = &self.options.filters;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("keywords", &self.query)
                .append_pair("location", location)
                .append_pair("sortBy", filters.relevance.code());
            if let Some(tpr) = filters.time.code() {
                pairs.append_pair("f_TPR", tpr);
            }
            if !filters.job_types.is_empty() {
                pairs.append_pair("f_JT", &filters.job_types.iter().map(|t| t.code()).join(","));
            }
            if !filters.workplaces.is_empty() {
                pairs.append_pair("f_WT", &filters.workplaces.iter().map(|w| w.code()).join(","));
            }
            if !filters.experience.is_empty() {
                pairs.append_pair("f_E", &filters.experience.iter().map(|e| e.code()).join(","));
            }
            pairs.append_pair("start", &start.to_string());
        }
        Ok(url)
    }
}
