//! Core Infrastructure
//!
//! HTTP transport abstraction and the retrying gateway built on top of it.

pub mod gateway;
pub mod transport;

pub use gateway::{AuthMode, GatewayRequest, GatewayResponse, HttpGateway};
pub use transport::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, MockHttpTransport, ReqwestHttpTransport,
};
