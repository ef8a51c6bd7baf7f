//! Credential keepers: long-running daemons that hold a time-limited credential (an OAuth access
//! token, or a signed streaming URL derived from one) continuously valid by refreshing it shortly
//! before expiry and republishing the result for other processes to read.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod keeper;
pub mod obs;
pub mod publish;
pub mod schedule;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		convert::Infallible,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		path::{Path, PathBuf},
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::Deserialize;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
// The daemon binaries own argument parsing and subscriber setup; the library never touches them.
use {clap as _, tracing_subscriber as _};
#[cfg(test)] use httpmock as _;
