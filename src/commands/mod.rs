// Command handlers module
pub mod backends;
pub mod config;
pub mod detect;
pub mod version;
pub mod watch;

// Re-exports for cleaner imports
pub use backends::execute as backends;
pub use detect::execute as detect;
pub use version::execute as version;
pub use watch::execute as watch;

use crate::core::{Config, Detector};
use crate::platform::{self, Platform};

/// Load config and run detection once, the shared start of detect/watch
pub(crate) fn detect_gpu() -> anyhow::Result<(Config, Detector)> {
    let config = Config::load()?;
    let platform = Platform::current();

    log::debug!("Host: {}", platform::host_description());

    let mut detector = Detector::from_config(&config, platform);
    detector.detect();
    Ok((config, detector))
}
