//! Builder for constructing request frames
//!
//! Generic wrapper mainly used as helper for encoding commands.
//! However, it can also be used to execute custom/arbitrary commands. See [CustomCommand](crate::commands::custom)  for more details.
//!
//! # Creating generic frames
//! The following example demonstrates the creation of command frame for [HGET](https://redis.io/commands/hget/).
//! ```
//! use resp_pipeline::commands::builder::CommandBuilder;
//!
//! let frame = CommandBuilder::new("HGET")
//!     .arg_static("field1")
//!     .arg_static("foo")
//!     .encode();
//!
//! assert_eq!(&b"*3\r\n$4\r\nHGET\r\n$6\r\nfield1\r\n$3\r\nfoo\r\n"[..], &frame[..]);
//! ```
//! # Improved performance
//! For best performance, especially with large amounts of data, it is recommended to use [Bytes](<https://docs.rs/bytes/latest/bytes/>).
//! ```
//!# use bytes::Bytes;
//! use resp_pipeline::commands::builder::CommandBuilder;
//!
//! // Using Bytes avoids data copy, as clone() is shallow
//! let value = Bytes::from_static("Large value".as_bytes());
//!
//! let _frame = CommandBuilder::new("HSET")
//!     .arg_static("myhash")
//!     .arg_static("field1")
//!     .arg(&value)
//!     .encode();
//! ```
use crate::commands::custom::CustomCommand;
use crate::network::encode;
use alloc::string::ToString;
use alloc::vec;
use alloc::vec::Vec;
use bytes::Bytes;

/// Builder for constructing request frames
#[derive(Clone, Debug)]
pub struct CommandBuilder {
    /// Command name followed by the arguments
    pub(crate) elements: Vec<Bytes>,
}

impl CommandBuilder {
    pub fn new(keyword: &'static str) -> Self {
        CommandBuilder {
            elements: vec![Bytes::from_static(keyword.as_bytes())],
        }
    }

    /// Converts builder to command ready for being sent by Client
    pub fn to_command(self) -> CustomCommand {
        self.into()
    }

    /// Adds a static argument
    pub fn arg_static(mut self, arg: &'static str) -> Self {
        self.elements.push(Bytes::from_static(arg.as_bytes()));
        self
    }

    /// Adds a static argument
    pub fn arg_static_option(mut self, arg: Option<&'static str>) -> Self {
        if let Some(arg_str) = arg {
            self.elements.push(Bytes::from_static(arg_str.as_bytes()));
        }
        self
    }

    /// Adds cased string of uint
    pub fn arg_uint(mut self, arg: usize) -> Self {
        self.elements.push(Bytes::from(arg.to_string()));
        self
    }

    /// Adds cased string of a signed integer
    pub fn arg_int(mut self, arg: i64) -> Self {
        self.elements.push(Bytes::from(arg.to_string()));
        self
    }

    /// Adds a byte argument
    /// Note: Besides static, the most efficient way caused by the nature how Bytes cloning is working
    pub fn arg(mut self, arg: &Bytes) -> Self {
        self.elements.push(arg.clone());
        self
    }

    /// Just adding byte if option is Some
    pub fn arg_option(mut self, arg: Option<&Bytes>) -> Self {
        if let Some(inner) = arg {
            self.elements.push(inner.clone());
        }
        self
    }

    /// Command name
    pub fn name(&self) -> &[u8] {
        self.elements.first().map(|name| name.as_ref()).unwrap_or_default()
    }

    /// Number of arguments, without the command name
    pub fn argument_count(&self) -> usize {
        self.elements.len().saturating_sub(1)
    }

    /// Encodes the command as RESP array of bulk strings
    pub fn encode(&self) -> Bytes {
        let arguments = self.elements.get(1..).unwrap_or_default();
        encode(self.name(), arguments)
    }
}

impl From<CommandBuilder> for CustomCommand {
    fn from(builder: CommandBuilder) -> Self {
        CustomCommand::new(builder)
    }
}
