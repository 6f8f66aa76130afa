//! Compile-time hardware constants.
//!
//! Cache line sizes:
//!   Apple Silicon (M-series performance cores) : 128 bytes
//!   x86-64 and non-Apple ARM64                 : 64 bytes

/// Assumed L1 data cache line size for the compilation target.
#[cfg(all(target_arch = "aarch64", target_os = "macos"))]
pub const CACHE_LINE_SIZE: usize = 128;
#[cfg(not(all(target_arch = "aarch64", target_os = "macos")))]
pub const CACHE_LINE_SIZE: usize = 64;

/// Human-readable target description for benchmark report headers.
pub fn platform_name() -> &'static str {
    #[cfg(all(target_os = "macos", target_arch = "aarch64"))]
    {
        "macOS (Apple Silicon)"
    }
    #[cfg(all(target_os = "macos", target_arch = "x86_64"))]
    {
        "macOS (Intel)"
    }
    #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
    {
        "Linux (x86-64)"
    }
    #[cfg(all(target_os = "linux", target_arch = "aarch64"))]
    {
        "Linux (ARM64)"
    }
    #[cfg(not(any(
        all(target_os = "macos", target_arch = "aarch64"),
        all(target_os = "macos", target_arch = "x86_64"),
        all(target_os = "linux", target_arch = "x86_64"),
        all(target_os = "linux", target_arch = "aarch64"),
    )))]
    {
        "Unknown"
    }
}
