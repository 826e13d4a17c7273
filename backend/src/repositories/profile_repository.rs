use dashmap::DashMap;
use thiserror::Error;

use crate::models::profile_models::Profile;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Profile {0} not found")]
    NotFound(String),
    #[error("Email already exists")]
    EmailTaken,
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Storage seam for member profiles. The editor never talks to storage
/// directly; handlers load through `get` and write committed edits through `save`.
pub trait ProfileRepository: Send + Sync {
    fn get(&self, member_id: &str) -> Result<Option<Profile>, RepositoryError>;
    fn save(&self, profile: &Profile) -> Result<(), RepositoryError>;
}

#[derive(Default)]
pub struct InMemoryProfileRepository {
    profiles: DashMap<String, Profile>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_demo_profile() -> Self {
        let repo = Self::new();
        let demo = Profile::demo();
        repo.profiles.insert(demo.member_id.clone(), demo);
        repo
    }

    pub fn insert(&self, profile: Profile) {
        self.profiles.insert(profile.member_id.clone(), profile);
    }
}

impl ProfileRepository for InMemoryProfileRepository {
    fn get(&self, member_id: &str) -> Result<Option<Profile>, RepositoryError> {
        Ok(self.profiles.get(member_id).map(|p| p.value().clone()))
    }

    fn save(&self, profile: &Profile) -> Result<(), RepositoryError> {
        if !self.profiles.contains_key(&profile.member_id) {
            return Err(RepositoryError::NotFound(profile.member_id.clone()));
        }
        let email_taken = self.profiles.iter().any(|entry| {
            entry.key() != &profile.member_id
                && entry.value().email.eq_ignore_ascii_case(&profile.email)
        });
        if email_taken {
            return Err(RepositoryError::EmailTaken);
        }
        self.profiles
            .insert(profile.member_id.clone(), profile.clone());
        Ok(())
    }
}
