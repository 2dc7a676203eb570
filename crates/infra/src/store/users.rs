use std::sync::{Arc, RwLock};

use roster_auth::User;
use roster_core::UserId;

use super::{Constraint, StoreError};

/// User persistence with unique usernames and emails.
pub trait UserStore: Send + Sync {
    fn insert_user(&self, user: User) -> Result<(), StoreError>;
    /// Replace a stored user. Uniqueness ignores the user's own record.
    fn update_user(&self, user: User) -> Result<(), StoreError>;
    fn remove_user(&self, id: UserId) -> Result<bool, StoreError>;

    fn user(&self, id: UserId) -> Result<Option<User>, StoreError>;
    fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    fn users(&self) -> Result<Vec<User>, StoreError>;
}

impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    fn insert_user(&self, user: User) -> Result<(), StoreError> {
        (**self).insert_user(user)
    }

    fn update_user(&self, user: User) -> Result<(), StoreError> {
        (**self).update_user(user)
    }

    fn remove_user(&self, id: UserId) -> Result<bool, StoreError> {
        (**self).remove_user(id)
    }

    fn user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        (**self).user(id)
    }

    fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        (**self).user_by_username(username)
    }

    fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        (**self).user_by_email(email)
    }

    fn users(&self) -> Result<Vec<User>, StoreError> {
        (**self).users()
    }
}

/// In-memory user store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<Vec<User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_unique(users: &[User], candidate: &User) -> Result<(), StoreError> {
    for existing in users.iter().filter(|u| u.id != candidate.id) {
        if existing.username() == candidate.username() {
            return Err(StoreError::unique(Constraint::Username, candidate.username()));
        }
        if existing.email() == candidate.email() {
            return Err(StoreError::unique(Constraint::Email, candidate.email()));
        }
    }
    Ok(())
}

impl UserStore for InMemoryUserStore {
    fn insert_user(&self, user: User) -> Result<(), StoreError> {
        let mut users = self.inner.write().map_err(|_| StoreError::poisoned())?;
        if users.iter().any(|u| u.id == user.id) {
            return Err(StoreError::unique(Constraint::UserId, user.id.to_string()));
        }
        check_unique(&users, &user)?;
        users.push(user);
        Ok(())
    }

    fn update_user(&self, user: User) -> Result<(), StoreError> {
        let mut users = self.inner.write().map_err(|_| StoreError::poisoned())?;
        check_unique(&users, &user)?;
        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(StoreError::NotFound("user"))?;
        *slot = user;
        Ok(())
    }

    fn remove_user(&self, id: UserId) -> Result<bool, StoreError> {
        let mut users = self.inner.write().map_err(|_| StoreError::poisoned())?;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() != before)
    }

    fn user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let users = self.inner.read().map_err(|_| StoreError::poisoned())?;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.inner.read().map_err(|_| StoreError::poisoned())?;
        Ok(users.iter().find(|u| u.username() == username).cloned())
    }

    fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.inner.read().map_err(|_| StoreError::poisoned())?;
        Ok(users.iter().find(|u| u.email() == email).cloned())
    }

    fn users(&self) -> Result<Vec<User>, StoreError> {
        let users = self.inner.read().map_err(|_| StoreError::poisoned())?;
        Ok(users.clone())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use roster_auth::{RoleName, UserProfile};

    use super::*;

    fn user(username: &str, email: &str) -> User {
        let profile = UserProfile {
            username: username.to_string(),
            email: email.to_string(),
            first_name: "Ana".to_string(),
            last_name: "Rivas".to_string(),
            ..Default::default()
        };
        User::new(UserId::new(), profile, RoleName::REGULAR, Utc::now())
    }

    #[test]
    fn username_and_email_are_unique() {
        let store = InMemoryUserStore::new();
        store.insert_user(user("scout01", "a@example.com")).unwrap();

        let err = store.insert_user(user("scout01", "b@example.com")).unwrap_err();
        assert!(err.violates(Constraint::Username));

        let err = store.insert_user(user("scout02", "a@example.com")).unwrap_err();
        assert!(err.violates(Constraint::Email));
    }

    #[test]
    fn update_ignores_own_record() {
        let store = InMemoryUserStore::new();
        let mut ana = user("scout01", "a@example.com");
        store.insert_user(ana.clone()).unwrap();
        store.insert_user(user("scout02", "b@example.com")).unwrap();

        ana.profile.department = Some("Scouting".to_string());
        store.update_user(ana.clone()).unwrap();

        ana.profile.email = "b@example.com".to_string();
        assert!(store.update_user(ana).unwrap_err().violates(Constraint::Email));
    }

    #[test]
    fn approver_reference_dangles_after_removal() {
        let store = InMemoryUserStore::new();
        let approver = user("manager1", "m@example.com");
        let mut pending = user("scout01", "a@example.com");
        pending.approve(approver.id, Utc::now());
        store.insert_user(approver.clone()).unwrap();
        store.insert_user(pending.clone()).unwrap();

        assert!(store.remove_user(approver.id).unwrap());
        let stored = store.user(pending.id).unwrap().unwrap();
        assert_eq!(stored.approved_by, Some(approver.id));
        assert_eq!(store.user(approver.id).unwrap(), None);
        assert!(!store.remove_user(approver.id).unwrap());
    }

    #[test]
    fn updating_unknown_user_fails() {
        let store = InMemoryUserStore::new();
        assert_eq!(
            store.update_user(user("scout01", "a@example.com")).unwrap_err(),
            StoreError::NotFound("user")
        );
    }
}
