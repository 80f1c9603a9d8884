//! Abstraction of HELLO command.
//!
//! For general information about this command, see the [Redis documentation](<https://redis.io/commands/hello/>).
//!
//! *As this command is executed automatically during connection initialization, there is usually no
//! need for manual execution.
//! Response of HELLO command may be retrieved from [Client](crate::network::Client#method.get_hello_response)*
//! # Basic usage
//! **Requires RESP3 protocol usage.** The reply of a RESP3 server is a map, which is mapped to
//! [HelloResponse].
//! ```
//! use resp_pipeline::commands::hello::HelloCommand;
//! use resp_pipeline::commands::Command;
//! use resp_pipeline::value::ReplyValue;
//!
//! let reply = ReplyValue::Map(vec![
//!     (ReplyValue::bulk("server"), ReplyValue::bulk("redis")),
//!     (ReplyValue::bulk("version"), ReplyValue::bulk("7.2.0")),
//!     (ReplyValue::bulk("proto"), ReplyValue::Integer(3)),
//!     (ReplyValue::bulk("id"), ReplyValue::Integer(5)),
//!     (ReplyValue::bulk("mode"), ReplyValue::bulk("standalone")),
//!     (ReplyValue::bulk("role"), ReplyValue::bulk("master")),
//!     (ReplyValue::bulk("modules"), ReplyValue::Array(vec![])),
//! ]);
//!
//! let response = HelloCommand::default().eval_response(reply).unwrap();
//! assert_eq!("redis", response.server);
//! assert_eq!("master", response.role);
//! ```
use crate::commands::builder::CommandBuilder;
use crate::commands::Command;
use crate::value::{FromReply, ReplyValue, TypeMismatch};
use alloc::string::String;
use alloc::vec::Vec;

/// Abstraction of HELLO command.
#[derive(Clone, Debug, Default)]
pub struct HelloCommand {}

impl Command for HelloCommand {
    type Response = HelloResponse;

    fn encode(&self) -> CommandBuilder {
        CommandBuilder::new("HELLO").arg_static("3")
    }

    fn eval_response(&self, reply: ReplyValue) -> Result<Self::Response, TypeMismatch> {
        HelloResponse::try_from(reply)
    }
}

/// Mapped response to HELLO command
#[derive(Debug, Clone, PartialEq)]
pub struct HelloResponse {
    pub server: String,
    pub version: String,
    pub protocol: i64,
    pub id: i64,
    pub mode: String,
    pub role: String,
    pub modules: Vec<ReplyValue>,
}

impl TryFrom<ReplyValue> for HelloResponse {
    type Error = TypeMismatch;

    fn try_from(reply: ReplyValue) -> Result<Self, Self::Error> {
        let pairs = match reply {
            ReplyValue::Map(pairs) => pairs,
            other => return Err(TypeMismatch::new("map", &other)),
        };

        let mut fields = HelloFields::default();
        for (key, value) in pairs {
            match key.as_bytes() {
                Some(b"server") => fields.server = Some(String::from_reply(value)?),
                Some(b"version") => fields.version = Some(String::from_reply(value)?),
                Some(b"proto") => fields.protocol = Some(i64::from_reply(value)?),
                Some(b"id") => fields.id = Some(i64::from_reply(value)?),
                Some(b"mode") => fields.mode = Some(String::from_reply(value)?),
                Some(b"role") => fields.role = Some(String::from_reply(value)?),
                Some(b"modules") => fields.modules = Some(Vec::from_reply(value)?),
                _ => {}
            }
        }

        fields.build()
    }
}

#[derive(Default)]
struct HelloFields {
    server: Option<String>,
    version: Option<String>,
    protocol: Option<i64>,
    id: Option<i64>,
    mode: Option<String>,
    role: Option<String>,
    modules: Option<Vec<ReplyValue>>,
}

impl HelloFields {
    fn build(self) -> Result<HelloResponse, TypeMismatch> {
        let missing = TypeMismatch {
            expected: "complete HELLO map",
            found: "map",
        };

        Ok(HelloResponse {
            server: self.server.ok_or(missing.clone())?,
            version: self.version.ok_or(missing.clone())?,
            protocol: self.protocol.ok_or(missing.clone())?,
            id: self.id.ok_or(missing.clone())?,
            mode: self.mode.ok_or(missing.clone())?,
            role: self.role.ok_or(missing.clone())?,
            modules: self.modules.ok_or(missing)?,
        })
    }
}
