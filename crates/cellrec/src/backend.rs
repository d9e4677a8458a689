//! Host code generators.
//!
//! Every function that completes the pass pipeline is handed to the
//! compiler's [`CodeGenerator`], if one is installed. [`Backend`] is the
//! shared-library generator. Its library exports
//!
//! ```text
//! uint32_t cellrec_backend_abi_version(void);
//! int32_t  cellrec_backend_emit(uint64_t address, const uint8_t *ir, size_t len);
//! ```
//!
//! `ir` is the textual IR of the function; a nonzero return rejects it.
//! The library is loaded once at startup and refused unless its ABI version
//! matches [`BACKEND_ABI_VERSION`].

use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};
use tracing::{debug, error, info};

use crate::{Error, Result};

/// ABI version this build of the compiler speaks.
pub const BACKEND_ABI_VERSION: u32 = 1;

type AbiVersionFn = unsafe extern "C" fn() -> u32;
type EmitFn = unsafe extern "C" fn(u64, *const u8, usize) -> i32;

/// Receives functions that completed the pass pipeline.
pub trait CodeGenerator: Send + Sync {
    /// Generate host code for the guest function at `address`.
    fn emit(&self, address: u64, function: &cellrec_ir::Function) -> Result<()>;
}

/// A loaded backend library.
pub struct Backend {
    path: PathBuf,
    abi_version: u32,
    emit: EmitFn,
    // Keeps `emit` valid.
    _lib: Library,
}

impl Backend {
    /// Load the library at `path` and check its ABI version.
    pub fn load(path: &Path) -> Result<Self> {
        let load_error = |source| Error::BackendLoad {
            path: path.display().to_string(),
            source,
        };
        let lib = unsafe { Library::new(path) }.map_err(load_error)?;
        let abi_version = unsafe {
            let sym: Symbol<AbiVersionFn> =
                lib.get(b"cellrec_backend_abi_version").map_err(|e| {
                    error!(symbol = "cellrec_backend_abi_version", "symbol not found in library");
                    load_error(e)
                })?;
            sym()
        };
        if abi_version != BACKEND_ABI_VERSION {
            error!(
                path = %path.display(),
                expected = BACKEND_ABI_VERSION,
                actual = abi_version,
                "backend ABI mismatch"
            );
            return Err(Error::AbiMismatch {
                expected: BACKEND_ABI_VERSION,
                actual: abi_version,
            });
        }
        let emit = unsafe {
            let sym: Symbol<EmitFn> = lib.get(b"cellrec_backend_emit").map_err(|e| {
                error!(symbol = "cellrec_backend_emit", "symbol not found in library");
                load_error(e)
            })?;
            *sym
        };
        info!(path = %path.display(), abi_version, "loaded backend");
        Ok(Self {
            path: path.to_path_buf(),
            abi_version,
            emit,
            _lib: lib,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub const fn abi_version(&self) -> u32 {
        self.abi_version
    }
}

impl CodeGenerator for Backend {
    fn emit(&self, address: u64, function: &cellrec_ir::Function) -> Result<()> {
        let ir = function.to_string();
        let status = unsafe { (self.emit)(address, ir.as_ptr(), ir.len()) };
        debug!(address = format_args!("{address:#x}"), status, "backend emit");
        if status == 0 {
            Ok(())
        } else {
            Err(Error::BackendRejected { address, status })
        }
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("path", &self.path)
            .field("abi_version", &self.abi_version)
            .finish_non_exhaustive()
    }
}
