use crate::commands::Command;

mod custom;
mod hello;
mod publish;
mod set;

/// Encodes the command and returns the frame as text
pub(crate) fn frame<Cmd: Command>(command: &Cmd) -> alloc::string::String {
    alloc::string::String::from_utf8_lossy(&command.encode().encode()).into_owned()
}
