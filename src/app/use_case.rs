use std::sync::Arc;

use crate::{
    domain::{
        datatype::birthdate,
        entity::{NewUser, StoredUser, User},
        repository::UserRepository,
    },
    error::process::ProcessError,
    infra::executor::WorkerPool,
    message::key,
};

/// Orchestrates the user operations over a repository.
///
/// Listing and removal run on the worker pool, the caller awaits their output.
#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    workers: WorkerPool,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, workers: WorkerPool) -> Self {
        Self {
            repository,
            workers,
        }
    }

    pub async fn find_all(&self) -> Result<Vec<User>, ProcessError> {
        tracing::info!("Retrieving all users");

        let repository = Arc::clone(&self.repository);
        let stored = self
            .workers
            .dispatch(async move { repository.find_all().await })
            .await
            .map_err(|err| ProcessError::internal(key::USER_RETRIEVE_ALL).caused_by(err))?
            .map_err(|err| ProcessError::internal(key::USER_RETRIEVE_ALL).caused_by(err))?;

        let users = stored
            .into_iter()
            .map(User::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!("Retrieved {} users", users.len());
        Ok(users)
    }

    pub async fn find(&self, id: i64) -> Result<Option<User>, ProcessError> {
        tracing::info!("Retrieving user with id {id}");

        let stored = self.repository.find(id).await.map_err(|err| {
            ProcessError::internal(key::USER_RETRIEVE)
                .with_args([id])
                .caused_by(err)
        })?;

        let user = stored.map(User::try_from).transpose()?;
        match &user {
            Some(user) => tracing::info!("Retrieved user {}", user.name),
            None => tracing::info!("No user with id {id}"),
        }
        Ok(user)
    }

    pub async fn create(&self, user: NewUser) -> Result<User, ProcessError> {
        tracing::info!("Creating user {}", user.name);

        let creation_failed = || {
            ProcessError::internal(key::USER_CREATION)
                .with_args([user.name.clone(), birthdate::format(&user.birthdate)])
        };

        let created = self
            .repository
            .insert(&StoredUser::from(&user))
            .await
            .map_err(|err| creation_failed().caused_by(err))?
            .ok_or_else(creation_failed)?;

        let created = User::try_from(created)?;
        tracing::info!("Created user {} with id {}", created.name, created.id);
        Ok(created)
    }

    pub async fn update(&self, user: User) -> Result<Option<User>, ProcessError> {
        tracing::info!("Updating user with id {}", user.id);

        let updated = self
            .repository
            .update(&StoredUser::from(&user))
            .await
            .map_err(|err| {
                ProcessError::internal(key::USER_UPDATE)
                    .with_args([
                        user.id.to_string(),
                        user.name.clone(),
                        birthdate::format(&user.birthdate),
                    ])
                    .caused_by(err)
            })?;

        let updated = updated.map(User::try_from).transpose()?;
        match &updated {
            Some(updated) => tracing::info!("Updated user with id {}", updated.id),
            None => tracing::info!("No user with id {} to update", user.id),
        }
        Ok(updated)
    }

    pub async fn remove(&self, id: i64) -> Result<bool, ProcessError> {
        tracing::info!("Removing user with id {id}");

        let deletion_failed = || ProcessError::internal(key::USER_DELETION).with_args([id]);

        let repository = Arc::clone(&self.repository);
        let removed = self
            .workers
            .dispatch(async move { repository.delete(id).await })
            .await
            .map_err(|err| deletion_failed().caused_by(err))?
            .map_err(|err| deletion_failed().caused_by(err))?;

        tracing::info!("User with id {id} removed: {removed}");
        Ok(removed)
    }
}
