//! AMD Anti-Lag 2 integration for Redox OS render loops
//!
//! This crate wraps the vendor Anti-Lag 2 driver feature:
//! - Driver context lifecycle (initialize / per-frame update / shutdown)
//! - Result code translation and silent degradation when unsupported
//! - A low-latency provider surface for the render loop
//!
//! All calls must come from the render thread that owns the graphics device.
//! The per-frame update must run once per frame, before the first input
//! sample of that frame.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

pub mod common;

#[cfg(feature = "anti-lag")]
pub mod anti_lag;

#[cfg(feature = "anti-lag")]
pub mod provider;

pub use common::{AntiLagError, DriverResult, LatencyMarker, LatencyMode, Result};

#[cfg(feature = "anti-lag")]
pub use anti_lag::{
    AntiLagContext, AntiLagController, AntiLagDriver, ControllerState, DeviceHandle,
};

#[cfg(feature = "anti-lag")]
pub use provider::{AntiLagProvider, AntiLagSettings, LowLatencyProvider};

#[cfg(feature = "dx11")]
pub use anti_lag::dx11::Dx11Driver;
