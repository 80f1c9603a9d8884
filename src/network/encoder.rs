use bytes::{BufMut, Bytes, BytesMut};
use core::fmt::Write;

/// Encodes a command as RESP array of bulk strings
///
/// `*<n>\r\n` followed by `$<len>\r\n<data>\r\n` for the name and each argument. Arguments are
/// written unmodified, so any byte sequence (including `\0` and `\r\n`) is transferred as is.
pub fn encode<A: AsRef<[u8]>>(name: &[u8], arguments: &[A]) -> Bytes {
    let mut buffer = BytesMut::with_capacity(encoded_len(name, arguments));
    encode_into(&mut buffer, name, arguments);
    buffer.freeze()
}

/// Appends the encoded command to the given buffer
pub fn encode_into<A: AsRef<[u8]>>(buffer: &mut BytesMut, name: &[u8], arguments: &[A]) {
    write_header(buffer, b'*', arguments.len() + 1);
    write_bulk(buffer, name);

    for argument in arguments {
        write_bulk(buffer, argument.as_ref());
    }
}

fn write_bulk(buffer: &mut BytesMut, data: &[u8]) {
    write_header(buffer, b'$', data.len());
    buffer.put_slice(data);
    buffer.put_slice(b"\r\n");
}

fn write_header(buffer: &mut BytesMut, prefix: u8, length: usize) {
    buffer.put_u8(prefix);
    // Writing to BytesMut never fails, it grows on demand
    let _ = write!(buffer, "{}", length);
    buffer.put_slice(b"\r\n");
}

/// Exact size of the encoded frame
fn encoded_len<A: AsRef<[u8]>>(name: &[u8], arguments: &[A]) -> usize {
    let bulk_len = |length: usize| 1 + digits(length) + 2 + length + 2;

    1 + digits(arguments.len() + 1)
        + 2
        + bulk_len(name.len())
        + arguments.iter().map(|argument| bulk_len(argument.as_ref().len())).sum::<usize>()
}

fn digits(mut number: usize) -> usize {
    let mut count = 1;
    while number >= 10 {
        number /= 10;
        count += 1;
    }
    count
}
