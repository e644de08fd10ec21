use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::ProfilePatch;

/// Named social platform links, all optional. The whole block is rebuilt
/// from each profile submission rather than merged field by field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SocialLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
}

/// Work-history entry. Ids are generated server-side and used for removal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default)]
    pub current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Education {
    pub id: Uuid,
    pub school: String,
    pub degree: String,
    pub fieldofstudy: String,
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default)]
    pub current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Profile record in the database. Experience, education and social links
/// live in JSONB columns and are rewritten as whole documents on update.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
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
    pub social: Json<SocialLinks>,
    pub experience: Json<Vec<Experience>>,
    pub education: Json<Vec<Education>>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Profile {
    /// Sparse merge: only fields the patch carries overwrite stored values;
    /// the social block always replaces the stored one.
    pub fn apply_patch(&mut self, patch: ProfilePatch) {
        if let Some(v) = patch.company {
            self.company = Some(v);
        }
        if let Some(v) = patch.website {
            self.website = Some(v);
        }
        if let Some(v) = patch.location {
            self.location = Some(v);
        }
        if let Some(v) = patch.bio {
            self.bio = Some(v);
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(v) = patch.githubusername {
            self.githubusername = Some(v);
        }
        if let Some(v) = patch.skills {
            self.skills = v;
        }
        self.social = Json(patch.social);
    }

    /// New entries go in front: lists are ordered most recent first.
    pub fn add_experience(&mut self, entry: Experience) {
        self.experience.0.insert(0, entry);
    }

    pub fn add_education(&mut self, entry: Education) {
        self.education.0.insert(0, entry);
    }

    /// Removes the matching entry if present. An unknown id is a no-op and
    /// the document is persisted unchanged.
    pub fn remove_experience(&mut self, exp_id: Uuid) -> bool {
        match self.experience.0.iter().position(|e| e.id == exp_id) {
            Some(i) => {
                self.experience.0.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn remove_education(&mut self, edu_id: Uuid) -> bool {
        match self.education.0.iter().position(|e| e.id == edu_id) {
            Some(i) => {
                self.education.0.remove(i);
                true
            }
            None => false,
        }
    }
}

const PROFILE_COLUMNS: &str = "id, user_id, company, website, location, bio, status, \
     githubusername, skills, social, experience, education, created_at";

impl Profile {
    pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }

    /// One profile joined with its owner's name and avatar.
    pub async fn find_with_owner(
        db: &PgPool,
        user_id: Uuid,
    ) -> anyhow::Result<Option<(Profile, OwnerFields)>> {
        let row = sqlx::query_as::<_, ProfileOwnerRow>(
            "SELECT p.*, u.name, u.avatar \
             FROM profiles p JOIN users u ON u.id = p.user_id \
             WHERE p.user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(row.map(ProfileOwnerRow::split))
    }

    pub async fn list_with_owners(db: &PgPool) -> anyhow::Result<Vec<(Profile, OwnerFields)>> {
        let rows = sqlx::query_as::<_, ProfileOwnerRow>(
            "SELECT p.*, u.name, u.avatar \
             FROM profiles p JOIN users u ON u.id = p.user_id \
             ORDER BY p.created_at",
        )
        .fetch_all(db)
        .await?;
        Ok(rows.into_iter().map(ProfileOwnerRow::split).collect())
    }

    pub async fn create(db: &PgPool, user_id: Uuid, patch: ProfilePatch) -> anyhow::Result<Profile> {
        // status and skills are guaranteed present by the route validators
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "INSERT INTO profiles \
                 (user_id, company, website, location, bio, status, githubusername, \
                  skills, social, experience, education) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, '[]', '[]') \
             RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&patch.company)
        .bind(&patch.website)
        .bind(&patch.location)
        .bind(&patch.bio)
        .bind(patch.status.as_deref().unwrap_or_default())
        .bind(&patch.githubusername)
        .bind(patch.skills.as_deref().unwrap_or_default())
        .bind(Json(&patch.social))
        .fetch_one(db)
        .await?;
        Ok(profile)
    }

    /// Whole-document write-back after an in-memory mutation.
    pub async fn replace(db: &PgPool, profile: &Profile) -> anyhow::Result<Profile> {
        let updated = sqlx::query_as::<_, Profile>(&format!(
            "UPDATE profiles SET \
                 company = $2, website = $3, location = $4, bio = $5, status = $6, \
                 githubusername = $7, skills = $8, social = $9, experience = $10, \
                 education = $11 \
             WHERE user_id = $1 \
             RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(profile.user_id)
        .bind(&profile.company)
        .bind(&profile.website)
        .bind(&profile.location)
        .bind(&profile.bio)
        .bind(&profile.status)
        .bind(&profile.githubusername)
        .bind(&profile.skills)
        .bind(&profile.social)
        .bind(&profile.experience)
        .bind(&profile.education)
        .fetch_one(db)
        .await?;
        Ok(updated)
    }

    pub async fn delete_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(())
    }
}

/// Owner columns pulled in alongside a profile.
#[derive(Debug, Clone, FromRow)]
pub struct OwnerFields {
    pub name: String,
    pub avatar: String,
}

#[derive(FromRow)]
struct ProfileOwnerRow {
    #[sqlx(flatten)]
    profile: Profile,
    #[sqlx(flatten)]
    owner: OwnerFields,
}

impl ProfileOwnerRow {
    fn split(self) -> (Profile, OwnerFields) {
        (self.profile, self.owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_profile() -> Profile {
        Profile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            company: Some("Initech".into()),
            website: None,
            location: None,
            bio: Some("TPS report enthusiast".into()),
            status: "Developer".into(),
            githubusername: None,
            skills: vec!["rust".into()],
            social: Json(SocialLinks::default()),
            experience: Json(Vec::new()),
            education: Json(Vec::new()),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn entry(title: &str) -> Experience {
        Experience {
            id: Uuid::new_v4(),
            title: title.into(),
            company: "Initech".into(),
            location: None,
            from: "2020-01-01".into(),
            to: None,
            current: true,
            description: None,
        }
    }

    #[test]
    fn patch_leaves_absent_fields_untouched() {
        let mut profile = blank_profile();
        let patch = ProfilePatch {
            status: Some("Senior Developer".into()),
            skills: Some(vec!["rust".into(), "sql".into()]),
            ..Default::default()
        };
        profile.apply_patch(patch);

        assert_eq!(profile.status, "Senior Developer");
        assert_eq!(profile.skills, vec!["rust", "sql"]);
        // untouched by the sparse merge
        assert_eq!(profile.company.as_deref(), Some("Initech"));
        assert_eq!(profile.bio.as_deref(), Some("TPS report enthusiast"));
    }

    #[test]
    fn patch_overwrites_supplied_fields() {
        let mut profile = blank_profile();
        let patch = ProfilePatch {
            company: Some("Globex".into()),
            website: Some("https://globex.example".into()),
            ..Default::default()
        };
        profile.apply_patch(patch);
        assert_eq!(profile.company.as_deref(), Some("Globex"));
        assert_eq!(profile.website.as_deref(), Some("https://globex.example"));
    }

    #[test]
    fn social_block_is_replaced_wholesale() {
        let mut profile = blank_profile();
        profile.social = Json(SocialLinks {
            twitter: Some("https://twitter.com/old".into()),
            ..Default::default()
        });
        let patch = ProfilePatch {
            social: SocialLinks {
                youtube: Some("https://youtube.com/new".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        profile.apply_patch(patch);
        assert_eq!(
            profile.social.0.youtube.as_deref(),
            Some("https://youtube.com/new")
        );
        assert_eq!(profile.social.0.twitter, None);
    }

    #[test]
    fn experience_is_prepended_most_recent_first() {
        let mut profile = blank_profile();
        profile.add_experience(entry("first"));
        profile.add_experience(entry("second"));
        assert_eq!(profile.experience.0[0].title, "second");
        assert_eq!(profile.experience.0[1].title, "first");
    }

    #[test]
    fn remove_experience_by_id() {
        let mut profile = blank_profile();
        let keep = entry("keep");
        let drop = entry("drop");
        profile.add_experience(keep.clone());
        profile.add_experience(drop.clone());

        assert!(profile.remove_experience(drop.id));
        assert_eq!(profile.experience.0.len(), 1);
        assert_eq!(profile.experience.0[0].id, keep.id);
    }

    #[test]
    fn remove_experience_with_unknown_id_is_a_noop() {
        let mut profile = blank_profile();
        profile.add_experience(entry("only"));
        assert!(!profile.remove_experience(Uuid::new_v4()));
        assert_eq!(profile.experience.0.len(), 1);
    }

    #[test]
    fn education_mirrors_experience_semantics() {
        let mut profile = blank_profile();
        let first = Education {
            id: Uuid::new_v4(),
            school: "State U".into(),
            degree: "BSc".into(),
            fieldofstudy: "CS".into(),
            from: "2014".into(),
            to: Some("2018".into()),
            current: false,
            description: None,
        };
        let second = Education {
            id: Uuid::new_v4(),
            school: "Tech Institute".into(),
            degree: "MSc".into(),
            fieldofstudy: "Distributed Systems".into(),
            from: "2018".into(),
            to: None,
            current: true,
            description: None,
        };
        profile.add_education(first.clone());
        profile.add_education(second.clone());
        assert_eq!(profile.education.0[0].id, second.id);

        assert!(!profile.remove_education(Uuid::new_v4()));
        assert!(profile.remove_education(first.id));
        assert_eq!(profile.education.0.len(), 1);
        assert_eq!(profile.education.0[0].id, second.id);
    }
}
