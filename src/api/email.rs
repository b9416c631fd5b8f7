//! Unauthenticated mail-trigger endpoints under `/email`.

// self
use crate::{
	_prelude::*,
	http::{ApiRequest, ApiTransport},
	pipeline::ApiClient,
};

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Asks the backend to send an email verification message.
	pub async fn request_email_verification(&self, email: &str) -> Result<()> {
		self.email_trigger("/email/get-email-verification", email).await
	}

	/// Asks the backend to send a password reset message.
	pub async fn request_password_reset(&self, email: &str) -> Result<()> {
		self.email_trigger("/email/get-password-reset", email).await
	}

	async fn email_trigger(&self, path: &str, email: &str) -> Result<()> {
		let request = ApiRequest::post(path, serde_json::json!({ "email": email }));

		self.execute_public(request).await?.require_success()?;

		Ok(())
	}
}
