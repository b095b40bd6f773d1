use std::{future::Future, panic::AssertUnwindSafe, sync::Arc};

use async_trait::async_trait;
use futures::FutureExt;
use salvo::{http::StatusCode, writer::Json, Depot, FlowCtrl, Handler, Request, Response};
use serde::Serialize;

use crate::{
    app::{
        resource::{UserPayload, UserResponse},
        use_case::UserService,
        validation,
    },
    error::{app::ApplicationError, http::BadRequest, process::ProcessError, UnknownError},
    message::{key, Locale, MessageSource},
};

/// Successful outcome of a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<T> {
    /// 200 with a JSON body.
    Ok(T),
    /// 204 without body.
    NoContent,
    /// 404 without body.
    NotFound,
    /// 200 without body.
    Empty,
}

/// Runs the work of a handler and writes its outcome, the only place a fault
/// becomes a response. A panic is answered as an unclassified fault.
pub async fn respond<T, F>(res: &mut Response, messages: &MessageSource, locale: &Locale, work: F)
where
    T: Serialize + Send,
    F: Future<Output = Result<Reply<T>, ApplicationError>>,
{
    let result = AssertUnwindSafe(work)
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| Err(UnknownError::from_panic(panic).into()));

    match result {
        Ok(Reply::Ok(body)) => {
            res.set_status_code(StatusCode::OK);
            res.render(Json(body));
        }
        Ok(Reply::NoContent) => {
            res.set_status_code(StatusCode::NO_CONTENT);
        }
        Ok(Reply::NotFound) => {
            res.set_status_code(StatusCode::NOT_FOUND);
        }
        Ok(Reply::Empty) => {
            res.set_status_code(StatusCode::OK);
        }
        Err(err) => res.render(err.localize(messages, locale)),
    }
}

/// Extract the numeric user id from the `id` path param.
fn extract_id(req: &Request) -> Result<i64, BadRequest> {
    let param = req.params().get("id").map(String::as_str).unwrap_or_default();
    param
        .parse()
        .map_err(|_| BadRequest::InvalidParam("id", param.into()))
}

/// Locale requested through the `Accept-Language` header.
fn extract_locale(req: &Request) -> Locale {
    let accept_language: Option<&str> = req.header("accept-language");
    Locale::from_accept_language(accept_language)
}

fn require_positive_id(id: i64) -> Result<i64, ProcessError> {
    if id <= 0 {
        return Err(ProcessError::bad_request(key::ID_MINSIZE).with_args([id]));
    }
    Ok(id)
}

async fn parse_payload(req: &mut Request) -> Result<UserPayload, BadRequest> {
    req.parse_body().await.map_err(BadRequest::from)
}

pub struct GetAllUsersController {
    service: Arc<UserService>,
    messages: Arc<MessageSource>,
}

impl GetAllUsersController {
    pub fn new(service: Arc<UserService>, messages: Arc<MessageSource>) -> Self {
        Self { service, messages }
    }

    async fn get_all(&self) -> Result<Reply<Vec<UserResponse>>, ApplicationError> {
        let users = self.service.find_all().await?;
        if users.is_empty() {
            return Ok(Reply::NoContent);
        }
        Ok(Reply::Ok(users.into_iter().map(UserResponse::from).collect()))
    }
}

#[async_trait]
impl Handler for GetAllUsersController {
    async fn handle(&self, req: &mut Request, _: &mut Depot, res: &mut Response, _: &mut FlowCtrl) {
        let locale = extract_locale(req);
        respond(res, &self.messages, &locale, self.get_all()).await;
    }
}

pub struct GetUserController {
    service: Arc<UserService>,
    messages: Arc<MessageSource>,
}

impl GetUserController {
    pub fn new(service: Arc<UserService>, messages: Arc<MessageSource>) -> Self {
        Self { service, messages }
    }

    async fn get(&self, req: &Request) -> Result<Reply<UserResponse>, ApplicationError> {
        let id = require_positive_id(extract_id(req)?)?;

        Ok(match self.service.find(id).await? {
            Some(user) => Reply::Ok(user.into()),
            None => Reply::NotFound,
        })
    }
}

#[async_trait]
impl Handler for GetUserController {
    async fn handle(&self, req: &mut Request, _: &mut Depot, res: &mut Response, _: &mut FlowCtrl) {
        let locale = extract_locale(req);
        respond(res, &self.messages, &locale, self.get(req)).await;
    }
}

pub struct CreateUserController {
    service: Arc<UserService>,
    messages: Arc<MessageSource>,
}

impl CreateUserController {
    pub fn new(service: Arc<UserService>, messages: Arc<MessageSource>) -> Self {
        Self { service, messages }
    }

    async fn create(&self, req: &mut Request) -> Result<Reply<UserResponse>, ApplicationError> {
        let payload = parse_payload(req).await?;
        let user = validation::validate_for_create(payload)?;

        let created = self.service.create(user).await?;
        Ok(Reply::Ok(created.into()))
    }
}

#[async_trait]
impl Handler for CreateUserController {
    async fn handle(&self, req: &mut Request, _: &mut Depot, res: &mut Response, _: &mut FlowCtrl) {
        let locale = extract_locale(req);
        respond(res, &self.messages, &locale, self.create(req)).await;
    }
}

pub struct UpdateUserController {
    service: Arc<UserService>,
    messages: Arc<MessageSource>,
}

impl UpdateUserController {
    pub fn new(service: Arc<UserService>, messages: Arc<MessageSource>) -> Self {
        Self { service, messages }
    }

    async fn update(&self, req: &mut Request) -> Result<Reply<UserResponse>, ApplicationError> {
        let payload = parse_payload(req).await?;
        let user = validation::validate_for_update(payload)?;

        Ok(match self.service.update(user).await? {
            Some(updated) => Reply::Ok(updated.into()),
            None => Reply::NotFound,
        })
    }
}

#[async_trait]
impl Handler for UpdateUserController {
    async fn handle(&self, req: &mut Request, _: &mut Depot, res: &mut Response, _: &mut FlowCtrl) {
        let locale = extract_locale(req);
        respond(res, &self.messages, &locale, self.update(req)).await;
    }
}

pub struct RemoveUserController {
    service: Arc<UserService>,
    messages: Arc<MessageSource>,
}

impl RemoveUserController {
    pub fn new(service: Arc<UserService>, messages: Arc<MessageSource>) -> Self {
        Self { service, messages }
    }

    async fn remove(&self, req: &Request) -> Result<Reply<()>, ApplicationError> {
        let id = require_positive_id(extract_id(req)?)?;

        if !self.service.remove(id).await? {
            return Err(ProcessError::internal(key::USER_DELETION)
                .with_args([id])
                .into());
        }
        Ok(Reply::Empty)
    }
}

#[async_trait]
impl Handler for RemoveUserController {
    async fn handle(&self, req: &mut Request, _: &mut Depot, res: &mut Response, _: &mut FlowCtrl) {
        let locale = extract_locale(req);
        respond(res, &self.messages, &locale, self.remove(req)).await;
    }
}
