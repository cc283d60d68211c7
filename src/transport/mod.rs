//! 传输层：各服务商客户端共享的阻塞式 HTTP 传输。

mod http;

pub use http::{Auth, HttpTransport, TransportError};
