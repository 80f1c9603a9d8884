#[cfg(test)]
mod encoder;
