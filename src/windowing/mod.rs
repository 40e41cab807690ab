pub mod device;
pub mod error;
pub mod params;
pub mod platform;
pub mod receiver;
pub mod subsystem;
pub mod timer;

pub use device::{Device, DeviceStatus};
pub use error::{ContextError, DeviceError};
pub use params::{ContextRequest, CreationParams, DriverType};
pub use platform::{ControlModifier, HeadlessPlatform, Platform, PlatformCaps};
#[cfg(not(any(target_arch = "wasm32", target_os = "ios")))]
pub use platform::{GpuContext, WinitPlatform};
pub use receiver::EventReceiver;
pub use subsystem::SubsystemGuard;
pub use timer::Timer;
