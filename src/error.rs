use derive_more::Display;

pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Renders an error followed by every error in its `source` chain.
pub fn display_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

/// Fault that was not raised deliberately by the application.
#[derive(Debug, Display)]
pub struct UnknownError(BoxedError);

impl std::error::Error for UnknownError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl UnknownError {
    pub fn new(err: BoxedError) -> Self {
        Self(err)
    }

    /// Fault built from the payload of a caught panic.
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|message| message.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".into());
        Self::from(format!("operation panicked: {message}").as_str())
    }
}

impl From<BoxedError> for UnknownError {
    fn from(err: BoxedError) -> Self {
        Self::new(err)
    }
}

#[derive(Debug, Display)]
struct StrError(pub Box<str>);

impl std::error::Error for StrError {}

impl<'a> From<&'a str> for UnknownError {
    fn from(err: &'a str) -> Self {
        UnknownError(Box::new(StrError(Box::from(err))))
    }
}

pub mod process {
    use salvo::http::StatusCode;

    use super::BoxedError;

    /// Failure of an operation, carrying the response status and a
    /// localizable message key with its positional arguments.
    #[derive(Debug)]
    pub struct ProcessError {
        status: StatusCode,
        key: &'static str,
        args: Vec<String>,
        cause: Option<BoxedError>,
    }

    impl ProcessError {
        pub fn new(status: StatusCode, key: &'static str) -> Self {
            Self {
                status,
                key,
                args: Vec::new(),
                cause: None,
            }
        }

        pub fn internal(key: &'static str) -> Self {
            Self::new(StatusCode::INTERNAL_SERVER_ERROR, key)
        }

        pub fn bad_request(key: &'static str) -> Self {
            Self::new(StatusCode::BAD_REQUEST, key)
        }

        pub fn with_args<I, A>(mut self, args: I) -> Self
        where
            I: IntoIterator<Item = A>,
            A: ToString,
        {
            self.args = args.into_iter().map(|arg| arg.to_string()).collect();
            self
        }

        pub fn caused_by<E>(mut self, cause: E) -> Self
        where
            E: Into<BoxedError>,
        {
            self.cause = Some(cause.into());
            self
        }

        pub fn status(&self) -> StatusCode {
            self.status
        }

        pub fn key(&self) -> &'static str {
            self.key
        }

        pub fn args(&self) -> &[String] {
            &self.args
        }

        pub fn has_cause(&self) -> bool {
            self.cause.is_some()
        }
    }

    impl std::fmt::Display for ProcessError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{} ({})", self.key, self.status)?;
            if !self.args.is_empty() {
                write!(f, " {:?}", self.args)?;
            }
            Ok(())
        }
    }

    impl std::error::Error for ProcessError {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            self.cause
                .as_deref()
                .map(|cause| cause as &(dyn std::error::Error + 'static))
        }
    }
}

pub mod service {
    use derive_more::Display;

    #[derive(Debug, Display)]
    pub enum DispatchError {
        #[display(fmt = "Dispatched operation timed out in {_0:?}")]
        Timeout(Option<std::time::Duration>),
        #[display(fmt = "IO error dispatching {_0}")]
        IO(std::io::Error),
        #[display(fmt = "Dispatch rejected, {_0} operations already admitted")]
        Rejected(usize),
        #[display(fmt = "Dispatch to a closed worker pool")]
        Closed,
        #[display(fmt = "Dispatched operation failed: {_0}")]
        Join(tokio::task::JoinError),
    }

    impl std::error::Error for DispatchError {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            match self {
                Self::IO(err) => Some(err),
                Self::Join(err) => Some(err),
                _ => None,
            }
        }
    }
}

pub mod persistence {
    use derive_more::Display;

    use super::{service::DispatchError, UnknownError};

    pub type SqlState = String;

    #[derive(Debug, Display)]
    pub enum PersistenceError {
        #[display(fmt = "database persistence error: SQLSTATE {_0:?}, {_1}")]
        Database(Option<SqlState>, String),
        #[display(fmt = "persistence layer connection error: {_0}")]
        Connection(DispatchError),
        #[display(fmt = "PersistenceError data not found")]
        NotFound,
        #[display(fmt = "PersistenceError decoding data")]
        DecodeData,
        #[display(fmt = "unknown persistence error: {_0}")]
        Unknown(UnknownError),
    }

    impl std::error::Error for PersistenceError {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            match self {
                Self::Connection(err) => Some(err),
                Self::Unknown(err) => Some(err),
                _ => None,
            }
        }
    }

    impl From<sqlx::Error> for PersistenceError {
        fn from(err: sqlx::Error) -> Self {
            use sqlx::Error as Sqlx;

            match err {
                Sqlx::Database(db) => Self::Database(
                    db.code().map(|code| code.into_owned()),
                    db.message().to_owned(),
                ),
                Sqlx::RowNotFound | Sqlx::ColumnNotFound(_) => Self::NotFound,
                Sqlx::ColumnIndexOutOfBounds { .. }
                | Sqlx::ColumnDecode { .. }
                | Sqlx::Decode(_)
                | Sqlx::TypeNotFound { .. } => Self::DecodeData,
                Sqlx::Io(io) => Self::Connection(DispatchError::IO(io)),
                Sqlx::PoolTimedOut => Self::Connection(DispatchError::Timeout(None)),
                Sqlx::PoolClosed | Sqlx::WorkerCrashed => {
                    tracing::error!("sqlite connection unavailable: {err}");
                    Self::Connection(DispatchError::Closed)
                }
                other => Self::Unknown(UnknownError::new(other.into())),
            }
        }
    }

}

pub mod resource {
    use derive_more::Display;

    #[derive(Debug, Display, Clone, PartialEq, Eq)]
    pub enum ValidationErrorKind {
        /// When a required property is missing.
        Required,
        /// String is too short.
        #[display(fmt = "MinLength({_0})")]
        MinLength(u64),
        /// Value is too small.
        #[display(fmt = "Minimum({_0})")]
        Minimum(i64),
    }

    #[derive(Debug, Display, Clone, PartialEq, Eq)]
    #[display(fmt = "{path}: {value:?}, {kinds:?}")]
    pub struct ValidationFieldError {
        /// Resource field path with invalid value
        pub path: String,
        /// Displayed invalid value
        pub value: Option<String>,
        /// Message key describing the violation
        pub message: &'static str,
        /// Kinds of validation errors
        pub kinds: Vec<ValidationErrorKind>,
    }

    impl ValidationFieldError {
        pub fn new(
            path: &str,
            value: Option<String>,
            message: &'static str,
            kinds: Vec<ValidationErrorKind>,
        ) -> Self {
            Self {
                path: path.into(),
                value,
                message,
                kinds,
            }
        }
    }

    impl std::error::Error for ValidationFieldError {}

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ValidationError {
        /// Name of the resource
        pub resource_type: &'static str,
        /// Invalid resource fields, in declaration order
        pub fields: Vec<ValidationFieldError>,
    }

    impl ValidationError {
        pub fn new(resource_type: &'static str, fields: Vec<ValidationFieldError>) -> Self {
            Self {
                resource_type,
                fields,
            }
        }
    }

    impl std::fmt::Display for ValidationError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_fmt(format_args!(
                "Invalid resource {}, fields {:?}",
                self.resource_type, self.fields
            ))
        }
    }

    impl std::error::Error for ValidationError {}
}

pub mod http {
    use derive_more::Display;
    use salvo::{
        http::{ParseError, StatusCode},
        writer::Json,
        Piece, Response,
    };
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Display, Clone, PartialEq, Eq)]
    pub enum BadRequest {
        #[display(fmt = "invalid request content: {_0}")]
        InvalidContent(String),
        #[display(fmt = "invalid path parameter {_0}: {_1:?}")]
        InvalidParam(&'static str, String),
    }

    impl std::error::Error for BadRequest {}

    impl From<ParseError> for BadRequest {
        fn from(err: ParseError) -> Self {
            BadRequest::InvalidContent(err.to_string())
        }
    }

    /// Message sent as the body of a failed request.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MessageResponse {
        pub message: String,
    }

    impl MessageResponse {
        pub fn new(message: String) -> Self {
            Self { message }
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
    #[serde(untagged)]
    pub enum ErrorBody {
        Single(MessageResponse),
        List(Vec<MessageResponse>),
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ErrorResponse {
        pub status: StatusCode,
        pub body: ErrorBody,
    }

    impl Piece for ErrorResponse {
        fn render(self, res: &mut Response) {
            res.set_status_code(self.status);
            res.render(Json(self.body));
        }
    }
}

pub mod app {
    use derive_more::Display;
    use salvo::http::StatusCode;

    use super::{
        display_chain,
        http::{BadRequest, ErrorBody, ErrorResponse, MessageResponse},
        process::ProcessError,
        resource::ValidationError,
        UnknownError,
    };
    use crate::message::{key, Locale, MessageSource};

    /// Every fault that can reach the HTTP boundary.
    #[derive(Debug, Display)]
    pub enum ApplicationError {
        Process(ProcessError),
        Validation(ValidationError),
        BadRequest(BadRequest),
        Unknown(UnknownError),
    }

    impl std::error::Error for ApplicationError {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            match self {
                Self::Process(err) => Some(err),
                Self::Validation(err) => Some(err),
                Self::BadRequest(err) => Some(err),
                Self::Unknown(err) => Some(err),
            }
        }
    }

    impl From<ProcessError> for ApplicationError {
        fn from(err: ProcessError) -> Self {
            Self::Process(err)
        }
    }

    impl From<ValidationError> for ApplicationError {
        fn from(err: ValidationError) -> Self {
            Self::Validation(err)
        }
    }

    impl From<BadRequest> for ApplicationError {
        fn from(err: BadRequest) -> Self {
            Self::BadRequest(err)
        }
    }

    impl From<UnknownError> for ApplicationError {
        fn from(err: UnknownError) -> Self {
            Self::Unknown(err)
        }
    }

    impl ApplicationError {
        pub fn status(&self) -> StatusCode {
            match self {
                ApplicationError::Process(err) => err.status(),
                ApplicationError::Validation(_) | ApplicationError::BadRequest(_) => {
                    StatusCode::BAD_REQUEST
                }
                ApplicationError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }

        /// Logs the fault and converts it into the localized response body.
        pub fn localize(self, messages: &MessageSource, locale: &Locale) -> ErrorResponse {
            let status = self.status();
            let body = match self {
                ApplicationError::Process(err) => {
                    if status.is_server_error() || err.has_cause() {
                        tracing::error!("{}", display_chain(&err));
                    } else {
                        tracing::warn!("{err}");
                    }
                    let message = messages.message_or_key(err.key(), err.args(), locale);
                    ErrorBody::Single(MessageResponse::new(message))
                }
                ApplicationError::Unknown(err) => {
                    tracing::error!("Internal error: {}", display_chain(&err));
                    let message = messages.message_or_key(key::INTERNAL, &[], locale);
                    ErrorBody::Single(MessageResponse::new(message))
                }
                ApplicationError::BadRequest(err) => {
                    tracing::error!("{err}");
                    let message = messages.message_or_key(key::INPUT_UNREADABLE, &[], locale);
                    ErrorBody::Single(MessageResponse::new(message))
                }
                ApplicationError::Validation(err) => {
                    tracing::warn!("{err}");
                    ErrorBody::List(
                        err.fields
                            .iter()
                            .map(|field| {
                                MessageResponse::new(messages.message_or_key(
                                    field.message,
                                    &[],
                                    locale,
                                ))
                            })
                            .collect(),
                    )
                }
            };

            ErrorResponse { status, body }
        }
    }

    #[cfg(test)]
    mod tests {
        use pretty_assertions::assert_eq;

        use super::*;
        use crate::error::resource::{ValidationErrorKind, ValidationFieldError};

        fn catalog() -> MessageSource {
            MessageSource::new().with_base("error.internal=Internal failure\nerror.input.unreadable=Unreadable\nerror.user.retrieve=Cannot read user {0}\nerror.name.notnull=Name required\nerror.birthdate.notnull=Birth date required\n")
        }

        fn single(text: &str) -> ErrorBody {
            ErrorBody::Single(MessageResponse::new(text.into()))
        }

        #[test]
        fn process_error_keeps_its_status_and_formats_arguments() {
            let err = ProcessError::internal(key::USER_RETRIEVE)
                .with_args([7])
                .caused_by(UnknownError::from("disk on fire"));

            let response = ApplicationError::from(err).localize(&catalog(), &Locale::base());

            assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(response.body, single("Cannot read user 7"));
        }

        #[test]
        fn unknown_error_maps_to_generic_internal_message() {
            let err = ApplicationError::from(UnknownError::from("boom"));

            let response = err.localize(&catalog(), &Locale::base());

            assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(response.body, single("Internal failure"));
        }

        #[test]
        fn caught_panic_maps_to_generic_internal_message() {
            let panic = std::panic::catch_unwind(|| {
                let missing: Option<u8> = None;
                missing.expect("repository exploded")
            })
            .unwrap_err();

            let err = UnknownError::from_panic(panic);
            assert_eq!(err.to_string(), "operation panicked: repository exploded");

            let response = ApplicationError::from(err).localize(&catalog(), &Locale::base());

            assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(response.body, single("Internal failure"));
        }

        #[test]
        fn unreadable_body_maps_to_bad_request() {
            let err = ApplicationError::from(BadRequest::InvalidContent("eof".into()));

            let response = err.localize(&catalog(), &Locale::base());

            assert_eq!(response.status, StatusCode::BAD_REQUEST);
            assert_eq!(response.body, single("Unreadable"));
        }

        #[test]
        fn validation_error_lists_one_message_per_field_in_order() {
            let err = ValidationError::new(
                "user",
                vec![
                    ValidationFieldError::new(
                        "/name",
                        None,
                        key::NAME_NOTNULL,
                        vec![ValidationErrorKind::Required],
                    ),
                    ValidationFieldError::new(
                        "/birthdate",
                        None,
                        key::BIRTHDATE_NOTNULL,
                        vec![ValidationErrorKind::Required],
                    ),
                ],
            );

            let response = ApplicationError::from(err).localize(&catalog(), &Locale::base());

            assert_eq!(response.status, StatusCode::BAD_REQUEST);
            assert_eq!(
                response.body,
                ErrorBody::List(vec![
                    MessageResponse::new("Name required".into()),
                    MessageResponse::new("Birth date required".into()),
                ])
            );
        }

        #[test]
        fn unresolvable_key_falls_back_to_the_key_itself() {
            let err = ProcessError::bad_request(key::ID_MINSIZE);

            let response = ApplicationError::from(err).localize(&catalog(), &Locale::base());

            assert_eq!(response.status, StatusCode::BAD_REQUEST);
            assert_eq!(response.body, single(key::ID_MINSIZE));
        }

        #[test]
        fn display_chain_walks_every_source() {
            let err = ProcessError::internal(key::USER_RETRIEVE)
                .caused_by(ProcessError::internal(key::CONVERSION).caused_by(UnknownError::from("bad")));

            assert_eq!(
                display_chain(&err),
                "error.user.retrieve (500 Internal Server Error): error.conversion (500 Internal Server Error): bad"
            );
        }
    }
}
