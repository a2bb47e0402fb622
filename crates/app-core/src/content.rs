//! Portfolio content model
//!
//! The page is made of five fixed sections, each with a stable element id and
//! a display label. The remaining types describe the content shown inside
//! them and serialize with camelCase field names.

use serde::{Deserialize, Serialize};

/// Page section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// Landing section
    Home,
    /// Biography
    About,
    /// Skills overview
    Skills,
    /// Project showcase
    Projects,
    /// Contact form
    Contact,
}

impl Section {
    /// Sections in page order
    pub const ALL: [Section; 5] = [
        Section::Home,
        Section::About,
        Section::Skills,
        Section::Projects,
        Section::Contact,
    ];

    /// Element id of the section
    pub fn id(&self) -> &'static str {
        match self {
            Section::Home => "home",
            Section::About => "about",
            Section::Skills => "skills",
            Section::Projects => "projects",
            Section::Contact => "contact",
        }
    }

    /// Navigation label
    pub fn label(&self) -> &'static str {
        match self {
            Section::Home => "Inicio",
            Section::About => "Acerca de",
            Section::Skills => "Habilidades",
            Section::Projects => "Proyectos",
            Section::Contact => "Contacto",
        }
    }

    /// Element ids of every section in page order
    pub fn ids() -> [&'static str; 5] {
        Self::ALL.map(|section| section.id())
    }

    /// Section with element id `id`
    pub fn from_id(id: &str) -> Option<Section> {
        Self::ALL.into_iter().find(|section| section.id() == id)
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Skill proficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    /// Beginner
    Beginner,
    /// Intermediate
    Intermediate,
    /// Advanced
    Advanced,
    /// Expert
    Expert,
}

/// Skill grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    /// Frontend technologies
    Frontend,
    /// Backend technologies
    Backend,
    /// Tooling
    Tools,
    /// Soft skills
    Soft,
    /// Spoken languages
    Languages,
}

/// Project grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectCategory {
    /// Web application
    Web,
    /// Mobile application
    Mobile,
    /// Desktop application
    Desktop,
    /// Service API
    Api,
    /// Reusable library
    Library,
}

/// Social network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    /// GitHub
    Github,
    /// LinkedIn
    Linkedin,
    /// Twitter
    Twitter,
    /// Email
    Email,
    /// Personal website
    Website,
}

/// Showcased project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique identifier
    pub id: String,
    /// Title
    pub title: String,
    /// Short description
    pub description: String,
    /// Detailed description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
    /// Technologies used
    pub technologies: Vec<String>,
    /// Cover image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Live demo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_url: Option<String>,
    /// Source repository
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    /// Shown in the featured strip
    pub featured: bool,
    /// Category
    pub category: ProjectCategory,
    /// Start date (ISO 8601)
    pub start_date: String,
    /// End date (ISO 8601), absent while ongoing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// Listed skill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    /// Name
    pub name: String,
    /// Proficiency
    pub level: SkillLevel,
    /// Category
    pub category: SkillCategory,
    /// Icon token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Work experience entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    /// Unique identifier
    pub id: String,
    /// Employer
    pub company: String,
    /// Role
    pub position: String,
    /// Start date (ISO 8601)
    pub start_date: String,
    /// End date (ISO 8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Description
    pub description: String,
    /// Technologies used
    pub technologies: Vec<String>,
    /// Still in this role
    pub current: bool,
}

/// Education entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    /// Unique identifier
    pub id: String,
    /// School
    pub institution: String,
    /// Degree
    pub degree: String,
    /// Field of study
    pub field: String,
    /// Start date (ISO 8601)
    pub start_date: String,
    /// End date (ISO 8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Still enrolled
    pub current: bool,
}

/// Link to a social profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLink {
    /// Network
    pub platform: SocialPlatform,
    /// Profile URL
    pub url: String,
    /// Handle on the network
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Owner contact details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    /// Full name
    pub name: String,
    /// Email address
    pub email: String,
    /// Phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Location
    pub location: String,
    /// Social profiles
    pub social_links: Vec<SocialLink>,
}

/// Contact form submission
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactFormData {
    /// Sender name
    pub name: String,
    /// Sender email
    pub email: String,
    /// Subject line
    pub subject: String,
    /// Message body
    pub message: String,
}

impl ContactFormData {
    /// Create a submission
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            subject: subject.into(),
            message: message.into(),
        }
    }
}
