//! Authenticated REST client over reqwest: basic, bearer, per-context, and multi-realm OIDC
//! credentials, typed HTTP errors, and content-type aware body decoding.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod compose;
pub mod decode;
pub mod error;
pub mod http;
pub mod obs;
pub mod token;

mod _prelude {
	pub use std::{
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		time::Duration,
	};

	pub use reqwest::{
		Client as ReqwestClient, Error as ReqwestError, Method,
		header::{HeaderMap, HeaderName, HeaderValue},
	};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
