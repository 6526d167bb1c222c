// Adapters layer: concrete implementations for external systems.
// The HTTP client lives here; local file storage stays with the CLI config.

pub mod http;
