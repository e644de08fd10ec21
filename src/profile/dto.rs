use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::{Education, Experience, OwnerFields, Profile, SocialLinks};

/// Create-or-update request. Every field is optional; blank strings count
/// as absent, matching the sparse-merge semantics of the patch.
#[derive(Debug, Default, Deserialize)]
pub struct UpsertProfileRequest {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: Option<String>,
    pub githubusername: Option<String>,
    pub skills: Option<String>,
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
}

/// Explicit patch type: `None` means "keep the stored value".
#[derive(Debug, Default, Clone)]
pub struct ProfilePatch {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: Option<String>,
    pub githubusername: Option<String>,
    pub skills: Option<Vec<String>>,
    pub social: SocialLinks,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Comma-separated skills, each segment trimmed of surrounding whitespace.
pub fn split_skills(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_string()).collect()
}

impl UpsertProfileRequest {
    pub fn into_patch(self) -> ProfilePatch {
        ProfilePatch {
            company: non_empty(self.company),
            website: non_empty(self.website),
            location: non_empty(self.location),
            bio: non_empty(self.bio),
            status: non_empty(self.status),
            githubusername: non_empty(self.githubusername),
            skills: non_empty(self.skills).map(|s| split_skills(&s)),
            social: SocialLinks {
                youtube: non_empty(self.youtube),
                twitter: non_empty(self.twitter),
                facebook: non_empty(self.facebook),
                linkedin: non_empty(self.linkedin),
                instagram: non_empty(self.instagram),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExperienceRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub current: Option<bool>,
    pub description: Option<String>,
}

impl ExperienceRequest {
    pub fn into_entry(self) -> Experience {
        Experience {
            id: Uuid::new_v4(),
            title: self.title.unwrap_or_default(),
            company: self.company.unwrap_or_default(),
            location: self.location,
            from: self.from.unwrap_or_default(),
            to: self.to,
            current: self.current.unwrap_or(false),
            description: self.description,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EducationRequest {
    pub school: Option<String>,
    pub degree: Option<String>,
    pub fieldofstudy: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub current: Option<bool>,
    pub description: Option<String>,
}

impl EducationRequest {
    pub fn into_entry(self) -> Education {
        Education {
            id: Uuid::new_v4(),
            school: self.school.unwrap_or_default(),
            degree: self.degree.unwrap_or_default(),
            fieldofstudy: self.fieldofstudy.unwrap_or_default(),
            from: self.from.unwrap_or_default(),
            to: self.to,
            current: self.current.unwrap_or(false),
            description: self.description,
        }
    }
}

/// Owner identity joined into profile reads.
#[derive(Debug, Serialize)]
pub struct OwnerView {
    pub id: Uuid,
    pub name: String,
    pub avatar: String,
}

/// Profile as served on the public read endpoints: the stored document
/// plus the owning user's name and avatar.
#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub id: Uuid,
    pub user: OwnerView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub githubusername: Option<String>,
    pub skills: Vec<String>,
    pub social: SocialLinks,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl ProfileView {
    pub fn new(profile: Profile, owner: OwnerFields) -> Self {
        Self {
            id: profile.id,
            user: OwnerView {
                id: profile.user_id,
                name: owner.name,
                avatar: owner.avatar,
            },
            company: profile.company,
            website: profile.website,
            location: profile.location,
            bio: profile.bio,
            status: profile.status,
            githubusername: profile.githubusername,
            skills: profile.skills,
            social: profile.social.0,
            experience: profile.experience.0,
            education: profile.education.0,
            created_at: profile.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skills_split_on_commas_and_trimmed() {
        assert_eq!(
            split_skills("node, react,  express"),
            vec!["node", "react", "express"]
        );
    }

    #[test]
    fn skills_single_entry() {
        assert_eq!(split_skills("rust"), vec!["rust"]);
    }

    #[test]
    fn blank_fields_are_treated_as_absent() {
        let req = UpsertProfileRequest {
            company: Some("   ".into()),
            bio: Some("".into()),
            status: Some("Developer".into()),
            skills: Some("rust".into()),
            ..Default::default()
        };
        let patch = req.into_patch();
        assert_eq!(patch.company, None);
        assert_eq!(patch.bio, None);
        assert_eq!(patch.status.as_deref(), Some("Developer"));
        assert_eq!(patch.skills, Some(vec!["rust".to_string()]));
    }

    #[test]
    fn social_links_built_from_present_fields_only() {
        let req = UpsertProfileRequest {
            status: Some("Developer".into()),
            skills: Some("rust".into()),
            twitter: Some("https://twitter.com/dev".into()),
            youtube: Some("".into()),
            ..Default::default()
        };
        let patch = req.into_patch();
        assert_eq!(patch.social.twitter.as_deref(), Some("https://twitter.com/dev"));
        assert_eq!(patch.social.youtube, None);
    }

    #[test]
    fn experience_request_gets_a_fresh_id_and_defaults() {
        let entry = ExperienceRequest {
            title: Some("Developer".into()),
            company: Some("Initech".into()),
            location: None,
            from: Some("2020-01-01".into()),
            to: None,
            current: None,
            description: None,
        }
        .into_entry();
        assert!(!entry.id.is_nil());
        assert!(!entry.current);
        assert_eq!(entry.title, "Developer");
    }
}
