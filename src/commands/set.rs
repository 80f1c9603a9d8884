//! Abstraction of SET command.
//!
//! For general information about this command, see the [Redis documentation](<https://redis.io/commands/set/>).
//!
//! # Basic usage
//! ```
//! use resp_pipeline::commands::set::SetCommand;
//! use resp_pipeline::commands::Command;
//!
//! let command = SetCommand::new("key", "value");
//! assert_eq!(2, command.encode().argument_count());
//! ```
//!
//! # Expiration (EX, PX, EXAT, PXAT, KEEPTTL)
//! Setting TTL can be achieved in the following way. Fore more details s. [ExpirationPolicy] enum.
//! ```
//!# use resp_pipeline::commands::set::{SetCommand, ExpirationPolicy};
//!# use resp_pipeline::commands::Command;
//!#
//!  // Expires in 120 seconds
//!  let command = SetCommand::new("key", "value")
//!      .expires(ExpirationPolicy::Seconds(120));
//!# assert_eq!(4, command.encode().argument_count());
//! ```
//! # Exclusive condition (NX/XX)
//! Manage set condition. Fore more details s. [Exclusivity] enum.
//!
//! Using this options affects the return type. s. [ExclusiveSetResponse]
//! ```
//!# use resp_pipeline::commands::set::{SetCommand, Exclusivity};
//!# use resp_pipeline::commands::Command;
//!# use resp_pipeline::value::ReplyValue;
//!#
//!  // Just set the key if its not existing yet
//!  let command = SetCommand::new("key", "value")
//!      .set_exclusive(Exclusivity::SetIfMissing);
//!
//!  // Key was existing already
//!  assert_eq!(None, command.eval_response(ReplyValue::Nil).unwrap());
//! ```
//! # Return previous value (GET)
//! Returns the previous value stored at the given key.
//!
//! Using this options affects the return type. s. [ReturnPreviousResponse]
//! ```
//!# use resp_pipeline::commands::set::SetCommand;
//!# use resp_pipeline::commands::Command;
//!# use resp_pipeline::value::ReplyValue;
//!#
//!  let command = SetCommand::new("key", "value")
//!      .return_previous();
//!
//!  let previous = command.eval_response(ReplyValue::bulk("old")).unwrap();
//!  assert_eq!(&b"old"[..], &previous.unwrap()[..]);
//! ```
//! # Shorthand
//! [Client](crate::network::Client#method.set) provides a shorthand method for this command.
use crate::commands::builder::CommandBuilder;
use crate::commands::Command;
use crate::network::{Client, CommandErrors, Future, Protocol, Transport};
use crate::value::{ReplyValue, TypeMismatch};
use alloc::string::ToString;
use bytes::Bytes;
use core::marker::PhantomData;
use embedded_time::Clock;

#[derive(Clone, Debug)]
pub enum ExpirationPolicy {
    /// Does not set and expiration option
    Never,
    /// EX option
    Seconds(usize),
    /// PX option
    Milliseconds(usize),
    /// EXAT option
    TimestampSeconds(usize),
    /// PXAT option
    TimestampMilliseconds(usize),
    /// KEEPTTL option
    Keep,
}

#[derive(Clone, Debug)]
pub enum Exclusivity {
    None,
    /// XX option
    SetIfExists,
    /// NX option
    SetIfMissing,
}

#[derive(Clone, Debug)]
pub struct SetCommand<R> {
    key: Bytes,
    value: Bytes,
    expiration: ExpirationPolicy,
    exclusivity: Exclusivity,

    /// GET option
    return_old_value: bool,

    response_type: PhantomData<R>,
}

impl SetCommand<ConfirmationResponse> {
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        Bytes: From<K>,
        Bytes: From<V>,
    {
        SetCommand {
            key: key.into(),
            value: value.into(),
            expiration: ExpirationPolicy::Never,
            exclusivity: Exclusivity::None,
            return_old_value: false,
            response_type: PhantomData,
        }
    }

    /// Set expiration (TTL)
    pub fn expires(mut self, policy: ExpirationPolicy) -> SetCommand<ConfirmationResponse> {
        self.expiration = policy;
        self
    }

    /// Only set key if Exclusivity condition is met
    pub fn set_exclusive(self, option: Exclusivity) -> SetCommand<ExclusiveSetResponse> {
        SetCommand {
            key: self.key,
            value: self.value,
            expiration: self.expiration,
            exclusivity: option,
            return_old_value: self.return_old_value,
            response_type: PhantomData,
        }
    }
}

impl<R> SetCommand<R> {
    /// Returns the previous key by setting the GET option
    pub fn return_previous(self) -> SetCommand<ReturnPreviousResponse> {
        SetCommand {
            key: self.key,
            value: self.value,
            expiration: self.expiration,
            exclusivity: self.exclusivity,
            return_old_value: true,
            response_type: PhantomData,
        }
    }
}

/// Regular response if neither GET or NX/XX option is set.
/// Indicates that SET operation was successful
pub type ConfirmationResponse = ();

/// Response if NX/XX option was set.
///
/// Some => SET was executed successfully.
/// None => Operation was not performed, as NX/XX condition was not met.
pub type ExclusiveSetResponse = Option<()>;

/// Response if GET option is used.
///
/// Some => The old string value stored at key.
/// None => The key did not exist.
pub type ReturnPreviousResponse = Option<Bytes>;

impl Command for SetCommand<ConfirmationResponse> {
    type Response = ConfirmationResponse;

    fn encode(&self) -> CommandBuilder {
        self.get_builder()
    }

    fn eval_response(&self, reply: ReplyValue) -> Result<Self::Response, TypeMismatch> {
        if !reply.is_status("OK") {
            return Err(TypeMismatch::new("OK", &reply));
        }

        Ok(())
    }
}

impl Command for SetCommand<ExclusiveSetResponse> {
    type Response = ExclusiveSetResponse;

    fn encode(&self) -> CommandBuilder {
        self.get_builder()
    }

    fn eval_response(&self, reply: ReplyValue) -> Result<Self::Response, TypeMismatch> {
        if reply.is_nil() {
            return Ok(None);
        }

        if reply.is_status("OK") {
            return Ok(Some(()));
        }

        Err(TypeMismatch::new("OK or nil", &reply))
    }
}

impl Command for SetCommand<ReturnPreviousResponse> {
    type Response = ReturnPreviousResponse;

    fn encode(&self) -> CommandBuilder {
        self.get_builder()
    }

    fn eval_response(&self, reply: ReplyValue) -> Result<Self::Response, TypeMismatch> {
        match reply {
            ReplyValue::BulkString(Some(data)) => Ok(Some(data)),
            reply if reply.is_nil() => Ok(None),
            other => Err(TypeMismatch::new("bulk string", &other)),
        }
    }
}

impl<R> SetCommand<R> {
    /// General logic for building the command
    fn get_builder(&self) -> CommandBuilder {
        CommandBuilder::new("SET")
            .arg(&self.key)
            .arg(&self.value)
            .arg_static_option(self.expiration_unit())
            .arg_option(self.expiration_time().as_ref())
            .arg_static_option(self.exclusive_option())
            .arg_static_option(self.get_option())
    }

    /// Returns the expiration time unit argument
    fn expiration_unit(&self) -> Option<&'static str> {
        match self.expiration {
            ExpirationPolicy::Never => None,
            ExpirationPolicy::Seconds(_) => Some("EX"),
            ExpirationPolicy::Milliseconds(_) => Some("PX"),
            ExpirationPolicy::TimestampSeconds(_) => Some("EXAT"),
            ExpirationPolicy::TimestampMilliseconds(_) => Some("PXAT"),
            ExpirationPolicy::Keep => Some("KEEPTTL"),
        }
    }

    /// Returns the expiration time
    fn expiration_time(&self) -> Option<Bytes> {
        match self.expiration {
            ExpirationPolicy::Seconds(time)
            | ExpirationPolicy::Milliseconds(time)
            | ExpirationPolicy::TimestampSeconds(time)
            | ExpirationPolicy::TimestampMilliseconds(time) => Some(time.to_string().into()),
            ExpirationPolicy::Never | ExpirationPolicy::Keep => None,
        }
    }

    /// Returns the exclusivity argument
    fn exclusive_option(&self) -> Option<&'static str> {
        match self.exclusivity {
            Exclusivity::None => None,
            Exclusivity::SetIfExists => Some("XX"),
            Exclusivity::SetIfMissing => Some("NX"),
        }
    }

    fn get_option(&self) -> Option<&'static str> {
        self.return_old_value.then_some("GET")
    }
}

impl<T: Transport, C: Clock, P: Protocol> Client<'_, T, C, P> {
    /// Shorthand for [SetCommand]
    /// For using options of SET command, use [SetCommand] directly instead
    pub fn set<K, V>(
        &self,
        key: K,
        value: V,
    ) -> Result<Future<'_, T, C, P, SetCommand<ConfirmationResponse>>, CommandErrors>
    where
        Bytes: From<K>,
        Bytes: From<V>,
    {
        self.send(SetCommand::new(key, value))
    }
}
