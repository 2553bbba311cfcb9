use tracing::{debug, info, warn};

use crate::{
    auth::password::hash_password,
    error::{internal, AppError},
    users::{
        dto::{PublicUser, RegisterRequest, Registration},
        repo::{StoreError, UserStore},
        repo_types::NewUser,
    },
};

pub const DUPLICATE_EMAIL: &str = "A user with this email address already exists";

pub async fn list_users(store: &dyn UserStore) -> Result<Vec<PublicUser>, AppError> {
    let users = store
        .list()
        .await
        .map_err(internal("An error occurred while fetching users"))?;
    Ok(users.into_iter().map(PublicUser::from).collect())
}

pub async fn find_by_email(store: &dyn UserStore, email: &str) -> Result<PublicUser, AppError> {
    store
        .find_by_email(email)
        .await
        .map_err(internal("An error occurred while searching for a user"))?
        .map(PublicUser::from)
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// Validates, hashes and persists a new user, returning its id.
pub async fn register(store: &dyn UserStore, req: RegisterRequest) -> Result<i64, AppError> {
    let Registration {
        email,
        password,
        name,
        country,
        city,
    } = req.validate().map_err(|missing| {
        warn!(?missing, "registration with missing fields");
        AppError::Validation(format!("Missing fields: {}", missing.join(", ")))
    })?;

    let existing = store
        .find_by_email(&email)
        .await
        .map_err(internal("An error occurred during registration"))?;
    if existing.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict(DUPLICATE_EMAIL.into()));
    }

    let password_hash =
        hash_password(&password).map_err(internal("An error occurred during registration"))?;

    let new_user = NewUser {
        email: email.clone(),
        password_hash,
        name,
        country,
        city,
    };

    match store.create(new_user).await {
        Ok(id) => {
            info!(user_id = id, email = %email, "user registered");
            Ok(id)
        }
        Err(StoreError::DuplicateEmail(_)) => {
            warn!(email = %email, "email registered concurrently");
            Err(AppError::Conflict(DUPLICATE_EMAIL.into()))
        }
        Err(e) => Err(internal("An error occurred during registration")(e)),
    }
}

pub async fn delete_by_email(store: &dyn UserStore, email: &str) -> Result<(), AppError> {
    let removed = store
        .delete_by_email(email)
        .await
        .map_err(internal("An error occurred while deleting a user"))?;
    debug!(email = %email, removed, "delete by email");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::memory::InMemoryUserStore;

    fn request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: Some(email.into()),
            password: Some("p".into()),
            name: Some("A".into()),
            country: Some("US".into()),
            city: Some("NY".into()),
        }
    }

    #[tokio::test]
    async fn register_assigns_sequential_ids() {
        let store = InMemoryUserStore::new();
        assert_eq!(register(&store, request("a@x.com")).await.unwrap(), 1);
        assert_eq!(register(&store, request("b@x.com")).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn register_reports_every_missing_field() {
        let store = InMemoryUserStore::new();
        let req = RegisterRequest {
            email: Some("a@x.com".into()),
            ..Default::default()
        };
        match register(&store, req).await {
            Err(AppError::Validation(msg)) => {
                assert_eq!(msg, "Missing fields: password, name, country, city")
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn register_twice_conflicts_and_keeps_one_record() {
        let store = InMemoryUserStore::new();
        register(&store, request("a@x.com")).await.unwrap();
        let err = register(&store, request("a@x.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m == DUPLICATE_EMAIL));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn emails_match_exactly() {
        let store = InMemoryUserStore::new();
        assert_eq!(register(&store, request("a@x.com")).await.unwrap(), 1);
        assert_eq!(register(&store, request("A@x.com")).await.unwrap(), 2);
        assert_eq!(register(&store, request("bob")).await.unwrap(), 3);
        assert_eq!(store.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn register_stores_a_hash_not_the_password() {
        let store = InMemoryUserStore::new();
        register(&store, request("a@x.com")).await.unwrap();
        let user = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_ne!(user.password_hash, "p");
        assert!(user.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn find_by_email_matches_exactly_and_reports_missing() {
        let store = InMemoryUserStore::new();
        register(&store, request("a@x.com")).await.unwrap();
        let found = find_by_email(&store, "a@x.com").await.unwrap();
        assert_eq!(found.id, 1);
        assert!(matches!(
            find_by_email(&store, "A@x.COM").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            find_by_email(&store, "nobody@x.com").await,
            Err(AppError::NotFound(_))
        ));
    }
}
