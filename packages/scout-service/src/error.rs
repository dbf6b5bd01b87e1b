pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid parameter: {message}")]
	InvalidParameter { message: String },
	#[error("Model unavailable: {message}")]
	ModelUnavailable { message: String },
}
impl Error {
	pub(crate) fn invalid(message: impl Into<String>) -> Self {
		Self::InvalidParameter { message: message.into() }
	}

	pub(crate) fn model(message: impl Into<String>) -> Self {
		Self::ModelUnavailable { message: message.into() }
	}
}

impl From<color_eyre::Report> for Error {
	fn from(err: color_eyre::Report) -> Self {
		Self::ModelUnavailable { message: err.to_string() }
	}
}
