//! Client library for the LocalMart marketplace REST API.
//!
//! [`ApiClient`] is the single gateway to the backend: it attaches the session
//! token, classifies failures into [`RequestError`], and keeps a TTL response
//! cache that successful writes invalidate by path prefix. The typed services
//! in [`services`] sit on top of it, and [`notifications::OrderPoller`] turns
//! newly pending orders into notifications for shop owners.

pub mod client;
pub mod domain;
pub mod error;
pub mod notifications;
pub mod services;
pub mod session;
pub mod transport;

#[cfg(test)]
mod testing;

pub use client::{ApiClient, RequestConfig};
pub use error::{RequestError, RequestErrorKind};
pub use notifications::{NotificationCenter, NotificationKind, NotificationRecord, OrderPoller};
pub use session::{FileTokenStore, MemoryTokenStore, SessionEvent, TokenStore};
pub use transport::{HttpRequest, HttpResponse, Method, RequestBody, ReqwestTransport, Transport, TransportError};
