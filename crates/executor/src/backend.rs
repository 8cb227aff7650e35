use mcengine_shared::{
    BackendKind, EuropeanOption, GbmModel, PricingError, PricingResult, RunConfig,
};
use tracing::warn;

use crate::native::AcceleratedEngine;
use crate::reference::ReferenceEngine;

/// "Given a model, a product and a run configuration, produce a pricing
/// result." Callers hold a `dyn PricingBackend` or an [`Engine`] and never
/// care which implementation sits behind it.
pub trait PricingBackend: Send + Sync {
    fn kind(&self) -> BackendKind;
    fn model(&self) -> &GbmModel;
    fn config(&self) -> &RunConfig;
    fn price(&self, product: &EuropeanOption) -> Result<PricingResult, PricingError>;
}

impl PricingBackend for ReferenceEngine {
    fn kind(&self) -> BackendKind {
        BackendKind::Reference
    }

    fn model(&self) -> &GbmModel {
        ReferenceEngine::model(self)
    }

    fn config(&self) -> &RunConfig {
        ReferenceEngine::config(self)
    }

    fn price(&self, product: &EuropeanOption) -> Result<PricingResult, PricingError> {
        ReferenceEngine::price(self, product)
    }
}

impl PricingBackend for AcceleratedEngine {
    fn kind(&self) -> BackendKind {
        BackendKind::Accelerated
    }

    fn model(&self) -> &GbmModel {
        AcceleratedEngine::model(self)
    }

    fn config(&self) -> &RunConfig {
        AcceleratedEngine::config(self)
    }

    fn price(&self, product: &EuropeanOption) -> Result<PricingResult, PricingError> {
        AcceleratedEngine::price(self, product)
    }
}

#[derive(Debug, Clone)]
pub enum Engine {
    Reference(ReferenceEngine),
    Accelerated(AcceleratedEngine),
}

impl Engine {
    /// Builds the requested backend. Asking for `Accelerated` without a
    /// kernel yields `BackendUnavailable`.
    pub fn new(kind: BackendKind, model: GbmModel, config: RunConfig) -> Result<Self, PricingError> {
        match kind {
            BackendKind::Reference => Ok(Engine::Reference(ReferenceEngine::new(model, config))),
            BackendKind::Accelerated => {
                AcceleratedEngine::new(model, config).map(Engine::Accelerated)
            }
        }
    }

    /// Like [`Engine::new`], but a missing accelerated backend degrades to
    /// the reference engine.
    pub fn with_fallback(kind: BackendKind, model: GbmModel, config: RunConfig) -> Self {
        match Self::new(kind, model, config.clone()) {
            Ok(engine) => engine,
            Err(err) => {
                warn!(error = %err, "accelerated backend unavailable, falling back to reference");
                Engine::Reference(ReferenceEngine::new(model, config))
            }
        }
    }

    /// Replaces a recoverable failure with a reference engine; any other
    /// error is passed through.
    pub fn or_reference(
        attempt: Result<Engine, PricingError>,
        model: GbmModel,
        config: RunConfig,
    ) -> Result<Engine, PricingError> {
        match attempt {
            Ok(engine) => Ok(engine),
            Err(err) if err.is_recoverable() => {
                warn!(error = %err, "accelerated backend unavailable, falling back to reference");
                Ok(Engine::Reference(ReferenceEngine::new(model, config)))
            }
            Err(err) => Err(err),
        }
    }

    fn backend(&self) -> &dyn PricingBackend {
        match self {
            Engine::Reference(engine) => engine,
            Engine::Accelerated(engine) => engine,
        }
    }
}

impl PricingBackend for Engine {
    fn kind(&self) -> BackendKind {
        self.backend().kind()
    }

    fn model(&self) -> &GbmModel {
        self.backend().model()
    }

    fn config(&self) -> &RunConfig {
        self.backend().config()
    }

    fn price(&self, product: &EuropeanOption) -> Result<PricingResult, PricingError> {
        self.backend().price(product)
    }
}

/// Whether `Engine::new(BackendKind::Accelerated, ..)` can succeed. A
/// configured library is opened and checked, same as the engine does.
pub fn accelerated_available() -> bool {
    match crate::loader::configured_library_path() {
        Some(path) => crate::loader::NativeLibrary::load(path).is_ok(),
        None => cfg!(feature = "linked-kernel"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atm_model() -> GbmModel {
        GbmModel::new(100.0, 0.02, 0.2).unwrap()
    }

    #[test]
    fn test_reference_selected() {
        let engine = Engine::new(BackendKind::Reference, atm_model(), RunConfig::default()).unwrap();
        assert_eq!(engine.kind(), BackendKind::Reference);
        assert_eq!(engine.config().n_paths, RunConfig::default().n_paths);
    }

    #[test]
    fn test_or_reference_recovers_missing_library() {
        let attempt = AcceleratedEngine::from_library(
            "/nonexistent/libmc_core.so",
            atm_model(),
            RunConfig::default(),
        )
        .map(Engine::Accelerated);
        assert!(attempt.is_err());

        let engine = Engine::or_reference(attempt, atm_model(), RunConfig::default()).unwrap();
        assert_eq!(engine.kind(), BackendKind::Reference);
    }

    #[test]
    fn test_or_reference_passes_through_fatal_errors() {
        let attempt = Err(PricingError::InvalidConfiguration("n_paths".into()));
        let err = Engine::or_reference(attempt, atm_model(), RunConfig::default()).unwrap_err();
        assert!(matches!(err, PricingError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_backends_are_swappable() {
        let option = EuropeanOption::call(100.0, 0.0).unwrap();
        let backends: Vec<Box<dyn PricingBackend>> = vec![
            Box::new(ReferenceEngine::new(atm_model(), RunConfig::new(100, Some(1)))),
            Box::new(Engine::with_fallback(
                BackendKind::Accelerated,
                atm_model(),
                RunConfig::new(100, Some(1)),
            )),
        ];
        for backend in &backends {
            assert_eq!(backend.price(&option).unwrap().price, 0.0);
        }
    }

    #[test]
    fn test_availability_matches_construction() {
        let built = AcceleratedEngine::new(atm_model(), RunConfig::default());
        assert_eq!(accelerated_available(), built.is_ok());
    }

    #[cfg(feature = "linked-kernel")]
    #[test]
    fn test_accelerated_selected_when_linked() {
        assert!(accelerated_available());
        let engine =
            Engine::new(BackendKind::Accelerated, atm_model(), RunConfig::default()).unwrap();
        assert_eq!(engine.kind(), BackendKind::Accelerated);
    }
}
