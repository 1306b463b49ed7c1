//! AMD Anti-Lag 2 driver context lifecycle
//!
//! `AntiLagController` owns one driver context bound to one graphics device
//! and guards every driver call with a local state machine:
//!
//! ```text
//! Uninitialized --initialize Ok--------------> Initialized
//! Uninitialized --initialize Unsupported-----> ShutDown (inert)
//! Uninitialized --initialize error-----------> Failed
//! Initialized   --update error---------------> Failed
//! Initialized   --shutdown-------------------> ShutDown
//! Failed        --shutdown-------------------> ShutDown
//! ```
//!
//! Once the controller leaves `Initialized` it never calls the driver again.
//! The render loop can keep calling `update` and `shutdown` unconditionally.

#[cfg(feature = "dx11")]
pub mod dx11;

use alloc::boxed::Box;
use core::ffi::c_void;
use core::fmt;
use core::ptr;

use crate::common::{AntiLagError, DriverResult, LatencyMode, Result};

/// Number of pointer-sized slots reserved by the driver
pub const CONTEXT_SLOTS: usize = 8;

/// Opaque driver-owned state for one device binding.
///
/// Layout matches the SDK's `AntiLag2DX11Context`. The contents are never
/// interpreted here. The raw pointers keep the type `!Send` and `!Sync`, so
/// a controller cannot leave the render thread.
#[repr(C)]
pub struct AntiLagContext {
    reserved: [*mut c_void; CONTEXT_SLOTS],
}

impl AntiLagContext {
    /// Size of the context in bytes
    pub const SIZE: usize = core::mem::size_of::<Self>();

    /// Create a zeroed context
    pub const fn zeroed() -> Self {
        Self {
            reserved: [ptr::null_mut(); CONTEXT_SLOTS],
        }
    }

    /// Check whether the driver has left any state behind
    pub fn is_zeroed(&self) -> bool {
        self.reserved.iter().all(|slot| slot.is_null())
    }

    /// Pointer handed to the driver entry points
    pub fn as_mut_ptr(&mut self) -> *mut AntiLagContext {
        self
    }

    fn reset(&mut self) {
        self.reserved = [ptr::null_mut(); CONTEXT_SLOTS];
    }
}

impl Default for AntiLagContext {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl fmt::Debug for AntiLagContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AntiLagContext")
            .field("zeroed", &self.is_zeroed())
            .finish()
    }
}

/// Raw handle of the graphics device the context binds to (`ID3D11Device*`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct DeviceHandle(*mut c_void);

impl DeviceHandle {
    /// Wrap a native device pointer.
    ///
    /// # Safety
    ///
    /// `raw` must be null or point to a live device, and that device must
    /// stay alive until the controller it is given to has been shut down
    /// (or dropped). The driver cannot be called on a destroyed device.
    pub unsafe fn from_raw(raw: *mut c_void) -> Self {
        Self(raw)
    }

    /// Handle that refers to no device
    pub const fn null() -> Self {
        Self(ptr::null_mut())
    }

    /// Whether the handle refers to no device
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    /// Native device pointer
    pub fn as_raw(&self) -> *mut c_void {
        self.0
    }
}

/// Controller lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Constructed, no driver call made yet
    Uninitialized,
    /// Driver context populated and live
    Initialized,
    /// A driver call failed; inert for the rest of the instance's life
    Failed,
    /// Context released, or the feature is unsupported; inert
    ShutDown,
}

/// The three Anti-Lag 2 driver entry points.
///
/// Implementations forward to the vendor driver. The controller guarantees
/// that `update` and `deinitialize` are only called on a context that a
/// previous `initialize` populated successfully, and that `initialize` gets a
/// non-null device.
pub trait AntiLagDriver {
    /// Populate `context` for `device`
    fn initialize(&mut self, context: &mut AntiLagContext, device: DeviceHandle) -> DriverResult;

    /// Apply pacing for the current frame. `max_fps == 0` means no limit.
    fn update(&mut self, context: &mut AntiLagContext, enable: bool, max_fps: u32) -> DriverResult;

    /// Release `context`
    fn deinitialize(&mut self, context: &mut AntiLagContext) -> DriverResult;
}

/// Anti-Lag 2 controller for one device binding.
///
/// Single-use: once shut down or failed, a new instance is needed to try
/// again. Must only be used from the render thread.
pub struct AntiLagController<D: AntiLagDriver> {
    driver: D,
    /// Boxed so the address stays fixed while the driver holds on to it
    context: Box<AntiLagContext>,
    state: ControllerState,
    supported: bool,
    frames: u64,
}

impl<D: AntiLagDriver> AntiLagController<D> {
    /// Create an uninitialized controller
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            context: Box::new(AntiLagContext::zeroed()),
            state: ControllerState::Uninitialized,
            supported: true,
            frames: 0,
        }
    }

    /// Bind the driver context to `device`.
    ///
    /// Call once, after device creation and before the first frame.
    /// `Err(Unsupported)` is not a fault: the controller turns inert and
    /// every later call succeeds without touching the driver.
    pub fn initialize(&mut self, device: DeviceHandle) -> Result<()> {
        if self.state != ControllerState::Uninitialized {
            log::error!(
                "Anti-Lag 2 initialize called in state {:?}; controller is single-use",
                self.state
            );
            return Err(AntiLagError::InvalidArgument);
        }

        if device.is_null() {
            log::error!("Anti-Lag 2 initialize called with a null device");
            self.state = ControllerState::Failed;
            return Err(AntiLagError::InvalidArgument);
        }

        let result = self.driver.initialize(&mut self.context, device);
        match result {
            DriverResult::Ok => {
                log::info!("AMD Anti-Lag 2 initialized");
                self.state = ControllerState::Initialized;
            }
            DriverResult::Unsupported => {
                log::debug!("AMD Anti-Lag 2 not supported, running without it");
                self.context.reset();
                self.supported = false;
                self.state = ControllerState::ShutDown;
            }
            error => {
                log::warn!("AMD Anti-Lag 2 initialization failed: {:?}", error);
                self.context.reset();
                self.state = ControllerState::Failed;
            }
        }

        match result {
            DriverResult::NotInitialized => Err(AntiLagError::Fail),
            other => other.into_result(),
        }
    }

    /// Per-frame synchronization point.
    ///
    /// Call exactly once per frame, before the first input sample of that
    /// frame. Inert controllers return `Ok(())` without a driver call. A
    /// driver error moves the controller to `Failed` and is reported once,
    /// as `NotInitialized` or otherwise `Fail`.
    pub fn update(&mut self, enable: bool, max_fps: u32) -> Result<()> {
        match self.state {
            ControllerState::Initialized => {}
            ControllerState::Uninitialized => return Err(AntiLagError::NotInitialized),
            ControllerState::Failed | ControllerState::ShutDown => return Ok(()),
        }

        let result = self.driver.update(&mut self.context, enable, max_fps);
        if !result.is_ok() {
            log::warn!(
                "AMD Anti-Lag 2 update failed after {} frames: {:?}; disabling",
                self.frames,
                result
            );
            self.state = ControllerState::Failed;
            return match result {
                DriverResult::NotInitialized => Err(AntiLagError::NotInitialized),
                _ => Err(AntiLagError::Fail),
            };
        }

        self.frames += 1;
        log::trace!(
            "Anti-Lag 2 frame {}: enable={} max_fps={}",
            self.frames,
            enable,
            max_fps
        );
        Ok(())
    }

    /// `update` driven by a latency mode.
    ///
    /// Anti-Lag 2 has no boost input; `Boost` behaves like `On`.
    pub fn update_mode(&mut self, mode: LatencyMode, max_fps: u32) -> Result<()> {
        self.update(mode.is_enabled(), max_fps)
    }

    /// Release the driver context.
    ///
    /// Must run before the bound device is destroyed. Idempotent: only the
    /// first call from `Initialized` reaches the driver. Any driver error is
    /// reported as `Fail`.
    pub fn shutdown(&mut self) -> Result<()> {
        let previous = self.state;
        self.state = ControllerState::ShutDown;

        if previous != ControllerState::Initialized {
            return Ok(());
        }

        let result = self.driver.deinitialize(&mut self.context);
        self.context.reset();

        if result.is_ok() {
            log::info!("AMD Anti-Lag 2 shut down after {} frames", self.frames);
            Ok(())
        } else {
            log::warn!("AMD Anti-Lag 2 deinitialize failed: {:?}", result);
            Err(AntiLagError::Fail)
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// The driver is live and being driven every frame
    pub fn is_active(&self) -> bool {
        self.state == ControllerState::Initialized
    }

    /// False once the driver has reported Anti-Lag 2 as unsupported
    pub fn is_supported(&self) -> bool {
        self.supported
    }

    /// Number of successful per-frame updates
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Driver context, for inspection only
    pub fn context(&self) -> &AntiLagContext {
        &self.context
    }

    /// Driver backend
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Mutable driver backend
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}

impl<D: AntiLagDriver> Drop for AntiLagController<D> {
    fn drop(&mut self) {
        if self.state == ControllerState::Initialized {
            log::warn!("AntiLagController dropped while initialized, shutting down");
            let _ = self.shutdown();
        }
    }
}
