use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use libloading::Library;
use mcengine_shared::abi::{
    KernelFn, VersionFn, KERNEL_ABI_VERSION, PRICE_SYMBOL, VERSION_SYMBOL,
};
use mcengine_shared::config::NATIVE_LIB_ENV;
use mcengine_shared::PricingError;

#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("failed to open native library {path}: {reason}")]
    Open { path: String, reason: String },
    #[error("symbol `{symbol}` not found in {path}")]
    MissingSymbol { path: String, symbol: String },
    #[error("kernel ABI mismatch in {path}: expected v{expected}, found v{found}")]
    AbiMismatch {
        path: String,
        expected: u32,
        found: u32,
    },
    #[error("MCENGINE_NATIVE_LIB is not set")]
    NotConfigured,
}

impl From<LoaderError> for PricingError {
    fn from(err: LoaderError) -> Self {
        PricingError::BackendUnavailable(err.to_string())
    }
}

/// Library path named by `MCENGINE_NATIVE_LIB`, read once per process.
pub fn configured_library_path() -> Option<&'static Path> {
    static PATH: OnceLock<Option<PathBuf>> = OnceLock::new();
    PATH.get_or_init(|| std::env::var_os(NATIVE_LIB_ENV).map(PathBuf::from))
        .as_deref()
}

/// A shared library exporting the kernel ABI. The library stays mapped for
/// as long as this value (or a clone of its `Arc`) is alive.
pub struct NativeLibrary {
    path: PathBuf,
    kernel: KernelFn,
    abi_version: u32,
    _library: Library,
}

impl NativeLibrary {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoaderError> {
        let path = path.as_ref().to_path_buf();
        let shown = path.display().to_string();

        let library = unsafe { Library::new(&path) }.map_err(|e| LoaderError::Open {
            path: shown.clone(),
            reason: e.to_string(),
        })?;

        let version: VersionFn = unsafe {
            *library
                .get::<VersionFn>(VERSION_SYMBOL)
                .map_err(|_| LoaderError::MissingSymbol {
                    path: shown.clone(),
                    symbol: String::from_utf8_lossy(VERSION_SYMBOL).into_owned(),
                })?
        };
        let abi_version = unsafe { version() };
        if abi_version != KERNEL_ABI_VERSION {
            return Err(LoaderError::AbiMismatch {
                path: shown,
                expected: KERNEL_ABI_VERSION,
                found: abi_version,
            });
        }

        let kernel: KernelFn = unsafe {
            *library
                .get::<KernelFn>(PRICE_SYMBOL)
                .map_err(|_| LoaderError::MissingSymbol {
                    path: shown.clone(),
                    symbol: String::from_utf8_lossy(PRICE_SYMBOL).into_owned(),
                })?
        };

        tracing::debug!(path = %shown, abi_version, "loaded native pricing kernel");

        Ok(Self {
            path,
            kernel,
            abi_version,
            _library: library,
        })
    }

    pub fn from_env() -> Result<Self, LoaderError> {
        let path = configured_library_path().ok_or(LoaderError::NotConfigured)?;
        Self::load(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kernel(&self) -> KernelFn {
        self.kernel
    }

    pub fn abi_version(&self) -> u32 {
        self.abi_version
    }
}

impl std::fmt::Debug for NativeLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeLibrary")
            .field("path", &self.path)
            .field("abi_version", &self.abi_version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_library_is_recoverable() {
        let err = NativeLibrary::load("/nonexistent/libmc_core.so").unwrap_err();
        assert!(matches!(err, LoaderError::Open { .. }));
        let err: PricingError = err.into();
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("libmc_core"));
    }

    #[test]
    fn test_not_configured_message() {
        let err: PricingError = LoaderError::NotConfigured.into();
        assert!(matches!(err, PricingError::BackendUnavailable(_)));
        assert!(err.to_string().contains(NATIVE_LIB_ENV));
    }
}
