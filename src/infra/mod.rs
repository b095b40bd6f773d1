pub mod controller;
pub mod database;
pub mod executor;

pub mod router {
    use std::sync::Arc;

    use salvo::{logging::Logger, Router};
    use sqlx::SqlitePool;

    use super::{
        controller::*, database::repository::SqliteUserRepository, executor::WorkerPool,
    };
    use crate::{app::use_case::UserService, config::WorkerConfig, message::MessageSource};

    pub fn app(pool: SqlitePool, workers: &WorkerConfig, messages: Arc<MessageSource>) -> Router {
        let service = Arc::new(UserService::new(
            Arc::new(SqliteUserRepository::new(pool)),
            WorkerPool::new(workers),
        ));
        routes(service, messages)
    }

    /// `/api/user` routes over any user service.
    pub fn routes(service: Arc<UserService>, messages: Arc<MessageSource>) -> Router {
        Router::new()
            .push(
                Router::with_path("api/user")
                    .push(Router::with_path("getall").get(GetAllUsersController::new(
                        service.clone(),
                        messages.clone(),
                    )))
                    .push(
                        Router::with_path("get/<id>")
                            .get(GetUserController::new(service.clone(), messages.clone())),
                    )
                    .push(
                        Router::with_path("create")
                            .post(CreateUserController::new(service.clone(), messages.clone())),
                    )
                    .push(
                        Router::with_path("update")
                            .post(UpdateUserController::new(service.clone(), messages.clone())),
                    )
                    .push(
                        Router::with_path("remove/<id>")
                            .get(RemoveUserController::new(service, messages)),
                    ),
            )
            .hoop(Logger)
    }
}
