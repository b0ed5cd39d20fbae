use std::{
	fmt::{self, Display},
	path::{Path, PathBuf},
	sync::LazyLock,
};

use docker_compose_config::Config;
use futures::future::try_join_all;
use reqwest::{Client, StatusCode};
use tracing::{debug, info};
use url::Url;

use crate::AppError;

static CLIENT: LazyLock<Client> = LazyLock::new(Client::new);

/// The location of a compose document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
	Local(PathBuf),
	Remote(Url),
}

impl Display for Source {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Local(path) => write!(f, "{}", path.display()),
			Self::Remote(url) => write!(f, "{url}"),
		}
	}
}

impl Source {
	/// Interprets a command line argument.
	///
	/// `http` and `https` urls are remote sources, `file` urls and anything that is not a url are local paths.
	/// Urls with any other scheme are rejected.
	pub fn parse(arg: &str) -> Result<Self, AppError> {
		let invalid = |reason: String| AppError::InvalidSource {
			source_arg: arg.to_string(),
			reason,
		};

		if arg.trim().is_empty() {
			return Err(invalid("the source is empty".to_string()));
		}

		let Ok(url) = Url::parse(arg) else {
			return Ok(Self::Local(PathBuf::from(arg)));
		};

		match url.scheme() {
			"http" | "https" => Ok(Self::Remote(url)),
			"file" => url
				.to_file_path()
				.map(Self::Local)
				.map_err(|()| invalid("the url does not contain a valid file path".to_string())),
			scheme => Err(invalid(format!("the scheme `{scheme}` is not supported"))),
		}
	}

	/// Reads and deserializes the document.
	pub async fn load(&self) -> Result<Config, AppError> {
		debug!(source = %self, "loading document");

		match self {
			Self::Local(path) => load_local(path).await,
			Self::Remote(url) => load_remote(url).await,
		}
	}
}

/// Loads all the documents concurrently. The results keep the order of `sources`.
pub async fn load_all(sources: &[Source]) -> Result<Vec<Config>, AppError> {
	let configs = try_join_all(sources.iter().map(Source::load)).await?;

	info!(documents = configs.len(), "loaded all documents");

	Ok(configs)
}

async fn load_local(path: &Path) -> Result<Config, AppError> {
	let metadata = tokio::fs::metadata(path)
		.await
		.map_err(|e| AppError::ReadError {
			path: path.to_path_buf(),
			source: e,
		})?;

	if metadata.is_dir() {
		return Err(AppError::PathIsDir {
			path: path.to_path_buf(),
		});
	}

	let content = tokio::fs::read_to_string(path)
		.await
		.map_err(|e| AppError::ReadError {
			path: path.to_path_buf(),
			source: e,
		})?;

	deserialize_document(&path.display().to_string(), &content)
}

async fn load_remote(url: &Url) -> Result<Config, AppError> {
	let request_error = |e| AppError::HttpRequest {
		url: url.to_string(),
		source: e,
	};

	let response = CLIENT
		.get(url.clone())
		.send()
		.await
		.map_err(request_error)?;

	let status = response.status();

	if status != StatusCode::OK {
		return Err(AppError::HttpStatus {
			url: url.to_string(),
			status,
		});
	}

	let content = response.text().await.map_err(request_error)?;

	deserialize_document(url.as_str(), &content)
}

/// An empty document is a valid, empty configuration.
pub(crate) fn deserialize_document(name: &str, content: &str) -> Result<Config, AppError> {
	if content.trim().is_empty() {
		return Ok(Config::new());
	}

	serde_yaml_ng::from_str(content).map_err(|e| AppError::DeserializationError {
		file: name.to_string(),
		error: e.to_string(),
	})
}
