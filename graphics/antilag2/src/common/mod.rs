//! Common Anti-Lag types

use core::fmt;

/// Crate result type
pub type Result<T, E = AntiLagError> = core::result::Result<T, E>;

/// Latency reduction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LatencyMode {
    /// Disabled
    #[default]
    Off,
    /// Enabled (standard latency reduction)
    On,
    /// Boost mode (maximum latency reduction)
    Boost,
}

impl LatencyMode {
    /// Whether the driver should be asked to reduce latency at all
    pub fn is_enabled(self) -> bool {
        self != LatencyMode::Off
    }
}

/// Latency marker for profiling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyMarker {
    /// Simulation start
    SimulationStart,
    /// Simulation end
    SimulationEnd,
    /// Render submit start
    RenderSubmitStart,
    /// Render submit end
    RenderSubmitEnd,
    /// Present start
    PresentStart,
    /// Present end
    PresentEnd,
    /// Input sample
    InputSample,
}

/// Raw result code returned by every Anti-Lag 2 driver entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum DriverResult {
    /// Success
    Ok = 0,
    /// Driver or device fault
    Fail = -1,
    /// Anti-Lag 2 unavailable on this device or driver
    Unsupported = -2,
    /// Bad context or device argument
    InvalidArgument = -3,
    /// Context not initialized
    NotInitialized = -4,
}

impl DriverResult {
    /// Decode a code coming back across the FFI boundary.
    ///
    /// Codes outside the documented set are reported as `Fail`.
    pub fn from_raw(code: i32) -> Self {
        match code {
            0 => DriverResult::Ok,
            -2 => DriverResult::Unsupported,
            -3 => DriverResult::InvalidArgument,
            -4 => DriverResult::NotInitialized,
            _ => DriverResult::Fail,
        }
    }

    /// Whether the driver call succeeded
    pub fn is_ok(self) -> bool {
        self == DriverResult::Ok
    }

    /// Convert into the crate's error model
    pub fn into_result(self) -> Result<()> {
        match self {
            DriverResult::Ok => Ok(()),
            DriverResult::Fail => Err(AntiLagError::Fail),
            DriverResult::Unsupported => Err(AntiLagError::Unsupported),
            DriverResult::InvalidArgument => Err(AntiLagError::InvalidArgument),
            DriverResult::NotInitialized => Err(AntiLagError::NotInitialized),
        }
    }
}

/// Anti-Lag error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AntiLagError {
    /// Driver or device fault
    Fail,
    /// Hardware or driver lacks Anti-Lag 2
    Unsupported,
    /// Contract violation by the caller (null device, repeated initialize)
    InvalidArgument,
    /// Driver context is not initialized
    NotInitialized,
}

impl AntiLagError {
    /// Unsupported is a permanent, silent degradation rather than a fault
    pub fn is_degradation(self) -> bool {
        self == AntiLagError::Unsupported
    }
}

impl fmt::Display for AntiLagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AntiLagError::Fail => write!(f, "Anti-Lag 2 driver call failed"),
            AntiLagError::Unsupported => write!(f, "Anti-Lag 2 not supported"),
            AntiLagError::InvalidArgument => write!(f, "Invalid argument"),
            AntiLagError::NotInitialized => write!(f, "Anti-Lag 2 not initialized"),
        }
    }
}

impl core::error::Error for AntiLagError {}
