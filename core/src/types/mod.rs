pub mod break_options;
pub mod credentials;
pub mod plugin;
pub mod scan;

pub use break_options::{BreakOptions, LegalBreak, VulnerabilityBreak};
pub use credentials::Credentials;
pub use plugin::{PluginDescriptor, ResolvedPlugin};
pub use scan::Scan;
