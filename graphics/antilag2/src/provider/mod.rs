//! Low-latency provider surface for the render loop

use crate::anti_lag::{AntiLagController, AntiLagDriver, DeviceHandle};
use crate::common::{LatencyMarker, LatencyMode, Result};

/// Anti-Lag settings, owned by the caller's settings store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AntiLagSettings {
    /// Requested mode
    pub mode: LatencyMode,
    /// Target frame rate handed to the driver (0 = no limit)
    pub max_fps: u32,
}

impl AntiLagSettings {
    /// Settings for `mode` with a frame rate target
    pub fn new(mode: LatencyMode, max_fps: u32) -> Self {
        Self { mode, max_fps }
    }
}

/// Vendor low-latency provider as seen by the render loop
pub trait LowLatencyProvider {
    /// The feature is live on the bound device
    fn is_available(&self) -> bool;

    /// Bind to the render device. Called once, before the first frame.
    fn initialize(&mut self, device: DeviceHandle) -> Result<()>;

    /// Select the latency mode used from the next frame on
    fn set_mode(&mut self, mode: LatencyMode) -> Result<()>;

    /// Record a latency marker for `frame_id`
    fn set_marker(&mut self, marker: LatencyMarker, frame_id: u64) -> Result<()>;

    /// Per-frame hook, called right before input is polled
    fn frame_sleep(&mut self) -> Result<()>;

    /// Release the provider before the device goes away
    fn shutdown(&mut self) -> Result<()>;
}

/// AMD Anti-Lag 2 provider
pub struct AntiLagProvider<D: AntiLagDriver> {
    controller: AntiLagController<D>,
    settings: AntiLagSettings,
}

impl<D: AntiLagDriver> AntiLagProvider<D> {
    /// Provider over an uninitialized controller for `driver`
    pub fn new(driver: D, settings: AntiLagSettings) -> Self {
        Self {
            controller: AntiLagController::new(driver),
            settings,
        }
    }

    /// Settings applied on every frame
    pub fn settings(&self) -> AntiLagSettings {
        self.settings
    }

    /// Replace mode and frame rate target in one go
    pub fn set_settings(&mut self, settings: AntiLagSettings) {
        if settings != self.settings {
            log::info!("AMD Anti-Lag 2 settings: {:?} -> {:?}", self.settings, settings);
        }
        self.settings = settings;
    }

    /// Underlying controller
    pub fn controller(&self) -> &AntiLagController<D> {
        &self.controller
    }
}

impl<D: AntiLagDriver> LowLatencyProvider for AntiLagProvider<D> {
    fn is_available(&self) -> bool {
        self.controller.is_active()
    }

    fn initialize(&mut self, device: DeviceHandle) -> Result<()> {
        match self.controller.initialize(device) {
            Err(err) if err.is_degradation() => Ok(()),
            result => result,
        }
    }

    fn set_mode(&mut self, mode: LatencyMode) -> Result<()> {
        if mode == LatencyMode::Boost {
            log::debug!("Anti-Lag 2 has no boost mode, using standard mode");
        }
        self.set_settings(AntiLagSettings { mode, ..self.settings });
        Ok(())
    }

    fn set_marker(&mut self, _marker: LatencyMarker, _frame_id: u64) -> Result<()> {
        // Anti-Lag 2 paces from the update call alone
        Ok(())
    }

    fn frame_sleep(&mut self) -> Result<()> {
        // A failure has already been logged and has made the controller inert
        let _ = self
            .controller
            .update_mode(self.settings.mode, self.settings.max_fps);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.controller.shutdown()
    }
}
