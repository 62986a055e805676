//! Device detection and bring-up sequencing for early NVIDIA GPUs.
//!
//! The flow is: scan the capability table against whatever the PCI layer
//! enumerates ([`detect`]), build a [`DeviceSession`] for the match, then run
//! the model's bring-up entry point. Today only NV3/NV3T (Riva 128 / 128 ZX)
//! has one; every other supported identity is "detected but unsupported",
//! which is an expected outcome rather than an error.

pub mod modes;
pub mod nv3;
pub mod session;
pub mod table;

pub use nv3::{BringupError, SweepConfig};
pub use session::{BackendKind, BringupOptions, DeviceSession};
pub use table::{detect, GpuModel, SUPPORTED_GPUS};
