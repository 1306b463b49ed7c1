//! Direct3D 11 Anti-Lag 2 driver, resolved at runtime
//!
//! The entry points live in `amd_antilag_dx11.dll`, shipped with AMD drivers
//! that support Anti-Lag 2. If the library or any entry point is missing the
//! driver reports `Unsupported` and the controller degrades silently.

use core::ffi::c_void;
use std::ffi::OsStr;

use libloading::Library;

use super::{AntiLagContext, AntiLagDriver, DeviceHandle};
use crate::common::DriverResult;

/// Default library name
pub const LIBRARY_NAME: &str = "amd_antilag_dx11.dll";

type InitializeFn = unsafe extern "C" fn(*mut AntiLagContext, *mut c_void) -> i32;
type UpdateFn = unsafe extern "C" fn(*mut AntiLagContext, bool, u32) -> i32;
type DeInitializeFn = unsafe extern "C" fn(*mut AntiLagContext) -> i32;

struct EntryPoints {
    initialize: InitializeFn,
    update: UpdateFn,
    deinitialize: DeInitializeFn,
    /// Keeps the entry points mapped
    _library: Library,
}

impl EntryPoints {
    unsafe fn open(path: &OsStr) -> Result<Self, libloading::Error> {
        let library = Library::new(path)?;
        let initialize = *library.get::<InitializeFn>(b"AmdAntiLag2Dx11Initialize\0")?;
        let update = *library.get::<UpdateFn>(b"AmdAntiLag2Dx11Update\0")?;
        let deinitialize = *library.get::<DeInitializeFn>(b"AmdAntiLag2Dx11DeInitialize\0")?;

        Ok(Self {
            initialize,
            update,
            deinitialize,
            _library: library,
        })
    }
}

/// Anti-Lag 2 driver for Direct3D 11 devices
pub struct Dx11Driver {
    entries: Option<EntryPoints>,
}

impl Dx11Driver {
    /// Load the driver from the system library search path
    pub fn load() -> Self {
        Self::load_from(LIBRARY_NAME)
    }

    /// Load the driver from an explicit library path
    pub fn load_from<P: AsRef<OsStr>>(path: P) -> Self {
        let path = path.as_ref();

        // SAFETY: the library is the vendor SDK runtime; its initializers
        // have no preconditions and the symbols match the SDK header.
        match unsafe { EntryPoints::open(path) } {
            Ok(entries) => {
                log::info!("Loaded AMD Anti-Lag 2 runtime from {:?}", path);
                Self {
                    entries: Some(entries),
                }
            }
            Err(err) => {
                log::debug!("AMD Anti-Lag 2 runtime not available ({:?}): {}", path, err);
                Self::unavailable()
            }
        }
    }

    /// A driver that reports Anti-Lag 2 as unsupported
    pub fn unavailable() -> Self {
        Self { entries: None }
    }

    /// Whether the runtime library and all entry points were found
    pub fn is_loaded(&self) -> bool {
        self.entries.is_some()
    }
}

impl AntiLagDriver for Dx11Driver {
    fn initialize(&mut self, context: &mut AntiLagContext, device: DeviceHandle) -> DriverResult {
        let Some(entries) = &self.entries else {
            return DriverResult::Unsupported;
        };

        // SAFETY: the context is boxed by the controller and stays put until
        // deinitialize; device liveness is the `DeviceHandle::from_raw` contract.
        let code = unsafe { (entries.initialize)(context.as_mut_ptr(), device.as_raw()) };
        DriverResult::from_raw(code)
    }

    fn update(&mut self, context: &mut AntiLagContext, enable: bool, max_fps: u32) -> DriverResult {
        let Some(entries) = &self.entries else {
            return DriverResult::NotInitialized;
        };

        // SAFETY: only reached with a context populated by initialize.
        let code = unsafe { (entries.update)(context.as_mut_ptr(), enable, max_fps) };
        DriverResult::from_raw(code)
    }

    fn deinitialize(&mut self, context: &mut AntiLagContext) -> DriverResult {
        let Some(entries) = &self.entries else {
            return DriverResult::NotInitialized;
        };

        // SAFETY: see update.
        let code = unsafe { (entries.deinitialize)(context.as_mut_ptr()) };
        DriverResult::from_raw(code)
    }
}
