mod client;
mod messages;
