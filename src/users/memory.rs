use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::profile::{NewUser, ProfileUpdate, Role, User};
use super::repo::{RepoError, UserRepository};

/// Process-local credential store. The uniqueness check and the insert run
/// under one write lock, so concurrent registrations of the same email
/// yield exactly one success.
#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Changes a stored user's role; test and bootstrap helper.
    pub async fn set_role(&self, id: Uuid, role: Role) -> bool {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.id == id) {
            Some(u) => {
                u.role = role;
                true
            }
            None => false,
        }
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        users.len() != before
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User, RepoError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(RepoError::DuplicateEmail);
        }
        let stored = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            role: Role::Farmer,
            profile: user.profile,
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn list_newest_first(&self) -> anyhow::Result<Vec<User>> {
        let users = self.users.read().await;
        // Insertion order breaks ties between equal timestamps.
        Ok(users.iter().rev().cloned().collect())
    }

    async fn update(&self, id: Uuid, change: ProfileUpdate) -> anyhow::Result<Option<User>> {
        let mut users = self.users.write().await;
        Ok(users.iter_mut().find(|u| u.id == id).map(|slot| {
            change.apply(slot);
            slot.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::profile::FarmerProfile;
    use std::sync::Arc;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.into(),
            password_hash: "hash".into(),
            profile: FarmerProfile {
                full_name: "Test".into(),
                phone: "1".into(),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_case_insensitive() {
        let repo = MemoryUserRepository::new();
        repo.insert(new_user("a@x.com")).await.unwrap();
        let err = repo.insert(new_user("A@X.COM")).await.unwrap_err();
        assert!(matches!(err, RepoError::DuplicateEmail));
        assert!(repo.find_by_email("A@x.Com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn concurrent_inserts_admit_one_winner() {
        let repo = Arc::new(MemoryUserRepository::new());
        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.insert(new_user("race@x.com")).await })
            })
            .collect();
        let mut ok = 0;
        for t in tasks {
            if t.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let repo = MemoryUserRepository::new();
        repo.insert(new_user("first@x.com")).await.unwrap();
        repo.insert(new_user("second@x.com")).await.unwrap();
        let all = repo.list_newest_first().await.unwrap();
        assert_eq!(all[0].email, "second@x.com");
        assert_eq!(all[1].email, "first@x.com");
    }

    #[tokio::test]
    async fn update_of_missing_user_is_none() {
        let repo = MemoryUserRepository::new();
        let u = repo.insert(new_user("gone@x.com")).await.unwrap();
        assert!(repo.remove(u.id).await);
        assert!(repo
            .update(u.id, ProfileUpdate::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn overlapping_partial_updates_both_land() {
        let repo = Arc::new(MemoryUserRepository::new());
        let u = repo.insert(new_user("both@x.com")).await.unwrap();
        let id = u.id;

        let a = {
            let repo = repo.clone();
            tokio::spawn(async move {
                let change = ProfileUpdate {
                    password_hash: Some("new-hash".into()),
                    ..Default::default()
                };
                repo.update(id, change).await
            })
        };
        let b = {
            let repo = repo.clone();
            tokio::spawn(async move {
                let change = ProfileUpdate {
                    farm_name: Some("North".into()),
                    ..Default::default()
                };
                repo.update(id, change).await
            })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let stored = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "new-hash");
        assert_eq!(stored.profile.farm_name.as_deref(), Some("North"));
        assert_eq!(stored.profile.full_name, "Test");
        assert_eq!(stored.created_at, u.created_at);
    }
}
