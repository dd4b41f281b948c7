// # HTTP Transport and IP Source
//
// This crate provides the HTTP layer of the DDNS system:
//
// - `ReqwestTransport`: the `Transport` implementation shared by the IP
//   resolver and the DNS provider
// - `HttpIpSource`: resolves the public address by asking a
//   "what is my IP" endpoint
//
// ## Architecture
//
// One transport is built per process and shared behind an `Arc`. It returns
// the raw body for any HTTP status; interpreting the body is left to the
// caller.

pub mod ip_source;
pub mod transport;

pub use ip_source::{DEFAULT_SEEK_IP_URL, HttpIpSource};
pub use transport::ReqwestTransport;
