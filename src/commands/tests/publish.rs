use crate::commands::publish::PublishCommand;
use crate::commands::tests::frame;
use crate::commands::Command;
use crate::value::ReplyValue;

#[test]
fn test_encode() {
    let command = PublishCommand::new("color", "green");
    assert_eq!("*3\r\n$7\r\nPUBLISH\r\n$5\r\ncolor\r\n$5\r\ngreen\r\n", frame(&command));
}

#[test]
fn test_eval_response() {
    let command = PublishCommand::new("color", "green");

    assert_eq!(3, command.eval_response(ReplyValue::Integer(3)).unwrap());
    assert_eq!(0, command.eval_response(ReplyValue::Integer(0)).unwrap());
}

#[test]
fn test_eval_response_wrong_type() {
    let command = PublishCommand::new("color", "green");
    assert!(command.eval_response(ReplyValue::Array(alloc::vec![])).is_err());
}
