//! nvprobe: raw bring-up tool for early NVIDIA GPUs.
//!
//! Detects a supported part over PCI, maps its apertures, runs the bring-up
//! sequence and the memory-clock stability sweep, then idles until Ctrl+C.
//! `--backend virtual` runs the whole flow against the in-process NV3 model
//! instead of real hardware.

mod signal;

use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use nvprobe_bringup::{detect, BackendKind, BringupOptions, DeviceSession, SweepConfig, SUPPORTED_GPUS};
use nvprobe_pci::{PciAccess, SysfsPci, VirtualPci};
use nvprobe_regs::pci_ids::{PCI_DEVICE_NV3, PCI_VENDOR_SGS_NVIDIA};

#[derive(Debug, Parser)]
#[command(name = "nvprobe", version, about = "Raw GPU programming for early NVIDIA GPUs")]
struct Args {
    /// Register/PCI backend: real hardware (/dev/mem + sysfs) or the
    /// in-process virtual NV3 model.
    #[arg(long, value_enum, default_value_t = Backend::Real)]
    backend: Backend,

    /// Seconds to hold each memory-clock sweep step.
    #[arg(long, default_value_t = 5)]
    dwell_secs: u64,

    /// Print the supported-GPU table and exit.
    #[arg(long)]
    list_gpus: bool,

    /// Exit after at most N seconds instead of waiting for Ctrl+C.
    #[arg(long)]
    max_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    Real,
    Virtual,
}

/// Process exit codes are a contract with wrapper scripts; keep them stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitStatus {
    Success,
    PciInitFailed,
    NoSupportedGpu,
    UnsupportedGpu,
    BringupFailed,
}

impl ExitStatus {
    fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::PciInitFailed => 1,
            ExitStatus::NoSupportedGpu => 2,
            ExitStatus::UnsupportedGpu => 3,
            ExitStatus::BringupFailed => 4,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let status = run(&args);
    // All sessions have dropped by now; exiting here cannot skip teardown.
    std::process::exit(status.code());
}

fn run(args: &Args) -> ExitStatus {
    tracing::info!("nvprobe {}, raw GPU programming for early NVIDIA GPUs", env!("CARGO_PKG_VERSION"));

    if args.list_gpus {
        for model in SUPPORTED_GPUS {
            let status = if model.bringup.is_some() { "" } else { " (detect only)" };
            println!("{:04x}:{:04x}  {}{status}", model.vendor_id, model.device_id, model.name);
        }
        return ExitStatus::Success;
    }

    signal::install();

    let pci: Box<dyn PciAccess> = match args.backend {
        Backend::Real => {
            tracing::info!("running with real hardware PCI access");
            match SysfsPci::probe() {
                Ok(pci) => Box::new(pci),
                Err(err) => {
                    tracing::error!("failed to initialize PCI subsystem: {err}");
                    return ExitStatus::PciInitFailed;
                }
            }
        }
        Backend::Virtual => {
            tracing::info!("running with virtual PCI device (no hardware access)");
            Box::new(VirtualPci::with_device(PCI_VENDOR_SGS_NVIDIA, PCI_DEVICE_NV3))
        }
    };

    let Some((model, location)) = detect(pci.as_ref()) else {
        tracing::error!("no supported NVIDIA GPU found");
        return ExitStatus::NoSupportedGpu;
    };

    let Some(bring_up) = model.bringup else {
        tracing::error!("{} is detected but not yet supported", model.name);
        return ExitStatus::UnsupportedGpu;
    };

    let opts = BringupOptions {
        backend: match args.backend {
            Backend::Real => BackendKind::Real,
            Backend::Virtual => BackendKind::Virtual,
        },
        sweep: SweepConfig {
            dwell: Duration::from_secs(args.dwell_secs),
            // Ctrl+C during the sweep restores the nominal clock and exits
            // instead of holding the card on an overclock step.
            cancel: Some(signal::shutdown_requested),
        },
    };

    let mut session = DeviceSession::new(model, location);
    tracing::info!("initializing GPU: {}", model.name);
    if let Err(err) = bring_up(&mut session, pci.as_ref(), &opts) {
        tracing::error!("GPU bring-up failed: {err}");
        return ExitStatus::BringupFailed;
    }

    tracing::info!("GPU initialized successfully; press Ctrl+C to exit");
    let started = Instant::now();
    while !signal::shutdown_requested() {
        if let Some(max_secs) = args.max_secs {
            if started.elapsed() >= Duration::from_secs(max_secs) {
                break;
            }
        }
        thread::sleep(Duration::from_millis(200));
    }

    // The session (and with it the mappings) drops on return.
    ExitStatus::Success
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_match_the_documented_contract() {
        assert_eq!(ExitStatus::Success.code(), 0);
        assert_eq!(ExitStatus::PciInitFailed.code(), 1);
        assert_eq!(ExitStatus::NoSupportedGpu.code(), 2);
        assert_eq!(ExitStatus::UnsupportedGpu.code(), 3);
        assert_eq!(ExitStatus::BringupFailed.code(), 4);
    }

    #[test]
    fn backend_and_dwell_flags_parse() {
        let args =
            Args::try_parse_from(["nvprobe", "--backend", "virtual", "--dwell-secs", "0"]).unwrap();
        assert_eq!(args.backend, Backend::Virtual);
        assert_eq!(args.dwell_secs, 0);
        assert_eq!(args.max_secs, None);

        let args = Args::try_parse_from(["nvprobe"]).unwrap();
        assert_eq!(args.backend, Backend::Real);
        assert_eq!(args.dwell_secs, 5);
    }
}
