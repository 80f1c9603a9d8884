pub mod auth;
pub mod builder;
pub mod custom;
pub mod get;
pub mod hello;
pub mod interval;
pub mod ping;
pub mod publish;
pub mod set;
pub mod subscribe;
pub mod zrange;
#[cfg(test)]
pub(crate) mod tests;

use crate::commands::builder::CommandBuilder;
use crate::value::{ReplyValue, TypeMismatch};

/// Generic command structure
pub trait Command {
    /// Response type, either a custom evaluated "high-level" response or the original reply
    type Response;

    /// Encodes the command name and its arguments
    fn encode(&self) -> CommandBuilder;

    /// The command has the ability to evaluate the reply and craft its own high level
    /// response from that.
    /// Its also possible to just return 1:1 the reply value.
    ///
    /// Error replies are captured upfront and converted to CommandErrors::ErrorResponse.
    /// So error replies never reach that method.
    ///
    /// Returns Error only in case the reply shape does not fit the command (e.g. received an
    /// array for an command that only returns strings)
    fn eval_response(&self, reply: ReplyValue) -> Result<Self::Response, TypeMismatch>;
}
