//! Abstraction for arbitrary commands.
//!
//! [CustomCommand] in combination with [CommandBuilder] can be used for executing arbitrary commands,
//! which high level logic is not abstracted yet by this crate.
//!
//! Response is not evaluated, so the pure [ReplyValue] is returned.
//! The only exception is that error responses are intercepted and converted to [CommandErrors::ErrorResponse](crate::network::CommandErrors::ErrorResponse)
//!
//! *Please consider contributing command abstractions not supported yet.*
//!
//! # Basic usage
//! The following Example demonstrates the [ECHO](<https://redis.io/commands/echo/>) command
//! ```
//! use resp_pipeline::commands::builder::CommandBuilder;
//! use resp_pipeline::commands::Command;
//! use resp_pipeline::value::ReplyValue;
//!
//! let command = CommandBuilder::new("ECHO").arg_static("Hello World!").to_command();
//! assert_eq!(b"ECHO", command.encode().name());
//!
//! let response = command.eval_response(ReplyValue::bulk("Hello World!")).unwrap();
//! assert_eq!(ReplyValue::bulk("Hello World!"), response);
//! ```
use crate::commands::builder::CommandBuilder;
use crate::commands::Command;
use crate::value::{ReplyValue, TypeMismatch};

/// Abstraction for arbitrary commands.
#[derive(Clone, Debug)]
pub struct CustomCommand {
    builder: CommandBuilder,
}

impl CustomCommand {
    pub fn new(builder: CommandBuilder) -> Self {
        CustomCommand { builder }
    }
}

impl Command for CustomCommand {
    type Response = ReplyValue;

    fn encode(&self) -> CommandBuilder {
        self.builder.clone()
    }

    fn eval_response(&self, reply: ReplyValue) -> Result<Self::Response, TypeMismatch> {
        Ok(reply)
    }
}
