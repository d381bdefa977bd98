//! Builder for [`CallStateController`]

use std::sync::Arc;

use crate::backend::{CallBackend, HttpBackend};
use crate::client::config::ClientConfig;
use crate::client::controller::CallStateController;
use crate::error::{ClientError, ClientResult};
use crate::sdk::{SdkConnector, SdkOptions};

/// Builder wiring configuration, backend and SDK connector together
///
/// The HTTP backend built from the configuration is used unless another
/// backend is supplied. An SDK connector is always required.
///
/// ```rust
/// use webphone_client_core::{ClientConfig, ControllerBuilder, SimulatedConnector};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let controller = ControllerBuilder::new()
///     .config(ClientConfig::new().with_backend_base("http://127.0.0.1:8080"))
///     .connector(SimulatedConnector::new())
///     .build()?;
///
/// controller.initialize()?;
/// assert!(controller.is_initialized());
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct ControllerBuilder {
    config: ClientConfig,
    backend: Option<Arc<dyn CallBackend>>,
    connector: Option<Arc<dyn SdkConnector>>,
}

impl ControllerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the SDK options of the current configuration
    pub fn sdk_options(mut self, options: SdkOptions) -> Self {
        self.config.sdk = options;
        self
    }

    pub fn backend(mut self, backend: impl CallBackend + 'static) -> Self {
        self.backend = Some(Arc::new(backend));
        self
    }

    pub fn connector(mut self, connector: impl SdkConnector + 'static) -> Self {
        self.connector = Some(Arc::new(connector));
        self
    }

    pub fn build(self) -> ClientResult<CallStateController> {
        self.config.validate()?;

        let connector = self
            .connector
            .ok_or_else(|| ClientError::config("an SDK connector is required"))?;
        let backend: Arc<dyn CallBackend> = match self.backend {
            Some(backend) => backend,
            None => Arc::new(HttpBackend::from_config(&self.config)),
        };

        Ok(CallStateController::new(self.config, backend, connector))
    }
}
