use std::path::Path;
use std::sync::Arc;

use mcengine_shared::abi::{
    encode_request, KernelFn, KernelResponse, STATUS_INVALID_REQUEST, STATUS_NULL_POINTER,
    STATUS_OK, STATUS_PANIC,
};
use mcengine_shared::{EuropeanOption, GbmModel, PricingError, PricingResult, RunConfig};
use tracing::debug;

use crate::loader::{configured_library_path, NativeLibrary};

/// Where the kernel function pointer came from.
#[derive(Debug, Clone)]
pub enum KernelSource {
    Linked,
    Library(Arc<NativeLibrary>),
}

/// Adapter over the native kernel. Same statistical contract as the
/// reference engine; the seed-to-sequence mapping differs, and results are
/// seed-deterministic independently of the worker count.
#[derive(Debug, Clone)]
pub struct AcceleratedEngine {
    model: GbmModel,
    config: RunConfig,
    kernel: KernelFn,
    source: KernelSource,
}

impl AcceleratedEngine {
    /// The library named by `MCENGINE_NATIVE_LIB` if set, otherwise the
    /// statically linked kernel when compiled in.
    pub fn new(model: GbmModel, config: RunConfig) -> Result<Self, PricingError> {
        if let Some(path) = configured_library_path() {
            return Self::from_library(path, model, config);
        }
        #[cfg(feature = "linked-kernel")]
        {
            Ok(Self::linked(model, config))
        }
        #[cfg(not(feature = "linked-kernel"))]
        {
            Err(crate::loader::LoaderError::NotConfigured.into())
        }
    }

    #[cfg(feature = "linked-kernel")]
    pub fn linked(model: GbmModel, config: RunConfig) -> Self {
        Self {
            model,
            config,
            kernel: mc_core::mcengine_price_european,
            source: KernelSource::Linked,
        }
    }

    pub fn from_library(
        path: impl AsRef<Path>,
        model: GbmModel,
        config: RunConfig,
    ) -> Result<Self, PricingError> {
        let library = NativeLibrary::load(path)?;
        Ok(Self::with_library(Arc::new(library), model, config))
    }

    pub fn with_library(library: Arc<NativeLibrary>, model: GbmModel, config: RunConfig) -> Self {
        Self {
            model,
            config,
            kernel: library.kernel(),
            source: KernelSource::Library(library),
        }
    }

    pub fn model(&self) -> &GbmModel {
        &self.model
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn source(&self) -> &KernelSource {
        &self.source
    }

    pub fn price(&self, product: &EuropeanOption) -> Result<PricingResult, PricingError> {
        self.config.validate()?;
        let seed = self.config.resolve_seed();
        debug!(
            backend = "accelerated",
            n_paths = self.config.n_paths,
            seed,
            option = %product.option_type(),
            "pricing"
        );

        let request = encode_request(&self.model, product, &self.config, seed);
        let mut response = KernelResponse::default();
        let status = unsafe { (self.kernel)(&request, &mut response) };

        match status {
            STATUS_OK => PricingResult::new(response.price, response.std_error, response.n_paths),
            STATUS_INVALID_REQUEST => Err(PricingError::InvalidConfiguration(
                "native kernel rejected the request".to_string(),
            )),
            STATUS_NULL_POINTER | STATUS_PANIC => Err(PricingError::BackendUnavailable(format!(
                "native kernel failed with status {status}"
            ))),
            other => Err(PricingError::BackendUnavailable(format!(
                "native kernel returned unknown status {other}"
            ))),
        }
    }
}
