//! Abstraction of AUTH command.
//!
//! For general information about this command, see the [Redis documentation](<https://redis.io/commands/auth/>).
//!
//! *Authentication is done automatically by [ConnectionHandler](crate::network::ConnectionHandler), so there is usually no need for manual execution.*
//!
//! # Password-only
//! ```
//! use resp_pipeline::commands::auth::AuthCommand;
//! use resp_pipeline::commands::Command;
//! use resp_pipeline::network::Credentials;
//!
//! // Cast from Credentials
//! let command = AuthCommand::from(&Credentials::password_only("secret123!"));
//! assert_eq!(1, command.encode().argument_count());
//!
//! // Directly creating Auth command:
//! let _command = AuthCommand::new(None as Option<&str>, "secret123!");
//! ```
//! # Username/Password (ACL based authentication)
//! *Requires Redis version > 6.0 + serverside ACL configuration*
//! ```
//! use resp_pipeline::commands::auth::AuthCommand;
//! use resp_pipeline::commands::Command;
//! use resp_pipeline::network::Credentials;
//!
//! let command = AuthCommand::from(&Credentials::acl("user01", "secret123!"));
//! assert_eq!(2, command.encode().argument_count());
//! ```
//! # Error handling
//! Successful execution is terminated by returning `Ok(())` response.
//!
//! Authentication errors are normally signalled by Redis with an error response, which is mapped
//! to [CommandErrors::ErrorResponse](crate::network::CommandErrors::ErrorResponse).
use crate::commands::builder::CommandBuilder;
use crate::commands::Command;
use crate::network::handler::Credentials;
use crate::value::{ReplyValue, TypeMismatch};
use bytes::Bytes;

#[derive(Clone, Debug)]
pub struct AuthCommand {
    /// Optionally sets a username for ACL based authentication, which requires
    /// Redis version >= 6 + ACL enabled
    username: Option<Bytes>,
    password: Bytes,
}

impl AuthCommand {
    pub fn new<U, P>(username: Option<U>, password: P) -> Self
    where
        U: Into<Bytes>,
        P: Into<Bytes>,
    {
        AuthCommand {
            username: username.map(Into::into),
            password: password.into(),
        }
    }
}

impl Command for AuthCommand {
    type Response = ();

    fn encode(&self) -> CommandBuilder {
        CommandBuilder::new("AUTH")
            .arg_option(self.username.as_ref())
            .arg(&self.password)
    }

    fn eval_response(&self, reply: ReplyValue) -> Result<Self::Response, TypeMismatch> {
        if !reply.is_status("OK") {
            return Err(TypeMismatch::new("OK", &reply));
        }

        Ok(())
    }
}

impl From<&Credentials> for AuthCommand {
    fn from(credentials: &Credentials) -> AuthCommand {
        AuthCommand::new(credentials.username.clone(), credentials.password.clone())
    }
}
