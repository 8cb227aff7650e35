pub mod backend;
pub mod loader;
pub mod native;
pub mod reference;

pub use backend::{accelerated_available, Engine, PricingBackend};
pub use loader::{LoaderError, NativeLibrary};
pub use native::{AcceleratedEngine, KernelSource};
pub use reference::{PricedSample, ReferenceEngine};
