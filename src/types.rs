//! Content types shared by loading, rendering and CLI output.
//!
//! These mirror the JSON documents in the content directory. Keys are
//! camelCase on disk (`socialLinks`, `demoUrl`) and snake_case in Rust.

use serde::{Deserialize, Serialize};

/// The site owner: `profile.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    /// Short professional headline, used in SEO titles.
    pub title: String,
    /// Bio shown under the hero heading. Markdown.
    pub description: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Avatar image path relative to the site root. A placeholder glyph is
    /// rendered when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialLink {
    pub platform: String,
    pub url: String,
    /// Icon name: `Github`, `Linkedin`, `Twitter` or `Instagram`.
    pub icon: String,
}

/// Employment arrangement of an [`Experience`] entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Freelance,
    Internship,
}

impl EmploymentType {
    pub fn label(self) -> &'static str {
        match self {
            EmploymentType::FullTime => "Full-time",
            EmploymentType::PartTime => "Part-time",
            EmploymentType::Contract => "Contract",
            EmploymentType::Freelance => "Freelance",
            EmploymentType::Internship => "Internship",
        }
    }
}

/// One entry of `experience.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: String,
    pub company: String,
    pub position: String,
    /// Free-form range, conventionally `"2021 - Present"` or `"Jan 2019 - Mar 2021"`.
    pub period: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(rename = "type")]
    pub employment_type: EmploymentType,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub responsibility: Vec<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
}

impl Experience {
    /// Whether this is the owner's current full-time position.
    ///
    /// True when the period ends in "Present"/"Current", or when the last
    /// four-digit year in the end part equals `current_year`.
    pub fn is_current(&self, current_year: i32) -> bool {
        if self.employment_type != EmploymentType::FullTime {
            return false;
        }
        let Some((_, end)) = self.period.split_once(" - ") else {
            return false;
        };
        let end = end.trim();
        if end.eq_ignore_ascii_case("present") || end.eq_ignore_ascii_case("current") {
            return true;
        }
        end.split(|c: char| !c.is_ascii_digit())
            .filter(|token| token.len() == 4)
            .filter_map(|token| token.parse::<i32>().ok())
            .last()
            == Some(current_year)
    }

    /// Whether the card has anything to show in its expandable details.
    pub fn has_details(&self) -> bool {
        !self.responsibility.is_empty() || !self.achievements.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Completed,
    InProgress,
    Planned,
}

impl ProjectStatus {
    /// Badge text, or `None` for statuses that get no badge.
    pub fn badge(self) -> Option<&'static str> {
        match self {
            ProjectStatus::Completed => None,
            ProjectStatus::InProgress => Some("In Progress"),
            ProjectStatus::Planned => Some("Planned"),
        }
    }
}

/// One entry of `projects.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    /// Card body. Markdown.
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
    pub status: ProjectStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}
