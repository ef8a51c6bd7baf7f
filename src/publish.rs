//! Artifact publishing: atomic sink rewrites and URL rewriting.

// std
use std::{
	fs::{self, File},
	io::Write,
};
// self
use crate::{_prelude::*, error::PublishError};

/// File sink other processes poll for the current credential artifact.
///
/// Every publish is a complete overwrite staged through a sibling temp file and renamed into
/// place, so readers observe at most one version and never a mix of old and new content. A sink
/// has exactly one writing daemon; concurrent writers are unsupported.
#[derive(Clone, Debug)]
pub struct ArtifactSink {
	path: PathBuf,
}
impl ArtifactSink {
	/// Creates a sink for the provided path.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// Returns the sink path.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Replaces the sink contents with `content` in full. No retry; failure is fatal.
	pub fn publish(&self, content: &str) -> Result<(), PublishError> {
		self.ensure_parent_exists()?;

		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path)
				.map_err(|source| PublishError::Stage { path: self.path.clone(), source })?;

			file.write_all(content.as_bytes())
				.map_err(|source| PublishError::Stage { path: self.path.clone(), source })?;
			file.sync_all()
				.map_err(|source| PublishError::Stage { path: self.path.clone(), source })?;
		}

		fs::rename(&tmp_path, &self.path)
			.map_err(|source| PublishError::Replace { path: self.path.clone(), source })
	}

	fn ensure_parent_exists(&self) -> Result<(), PublishError> {
		if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent)
				.map_err(|source| PublishError::Stage { path: self.path.clone(), source })?;
		}

		Ok(())
	}
}

/// Re-serializes `url` with its `auth` query parameter set to `session_token`.
///
/// Every other query pair is carried over unchanged and in order; a missing `auth` parameter is
/// appended. Scheme, host, and path are untouched.
pub fn with_auth_token(url: &Url, session_token: &str) -> Url {
	let pairs: Vec<(String, String)> =
		url.query_pairs().map(|(key, value)| (key.into_owned(), value.into_owned())).collect();
	let mut rewritten = url.clone();

	{
		let mut query = rewritten.query_pairs_mut();

		query.clear();

		let mut replaced = false;

		for (key, value) in &pairs {
			if key == "auth" {
				query.append_pair(key, session_token);

				replaced = true;
			} else {
				query.append_pair(key, value);
			}
		}

		if !replaced {
			query.append_pair("auth", session_token);
		}
	}

	rewritten
}
