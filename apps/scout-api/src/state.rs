use std::sync::Arc;

use scout_service::{Funnel, ModelContext, SearchParams};

#[derive(Clone)]
pub struct AppState {
	pub funnel: Arc<Funnel>,
	/// Applied to every request field the caller leaves unset.
	pub defaults: SearchParams,
}
impl AppState {
	pub fn new(config: &scout_config::Config) -> color_eyre::Result<Self> {
		let models = ModelContext::from_config(&config.providers)?;

		Ok(Self::with_models(&models, &config.funnel))
	}

	pub fn with_models(models: &ModelContext, funnel: &scout_config::Funnel) -> Self {
		Self { funnel: Arc::new(Funnel::new(models)), defaults: SearchParams::from_config(funnel) }
	}
}
