//! # Trellis Test
//!
//! In-memory testing for Trellis routers. A [`TestClient`] wraps a sealed
//! [`DispatchTable`](trellis_router::DispatchTable) and dispatches requests
//! without binding a port, so middleware, deadlines and error envelopes
//! behave as they do behind the server.
//!
//! ```rust,ignore
//! let client = TestClient::new(router.seal());
//!
//! let response = client
//!     .post("/users")
//!     .json(&json!({ "name": "Alice" }))
//!     .send()
//!     .await;
//!
//! response.assert_status(StatusCode::CREATED);
//! ```

#![doc(html_root_url = "https://docs.rs/trellis-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::TestRequestBuilder;
pub use response::TestResponse;
