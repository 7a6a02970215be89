//! Search provider implementations

pub mod ekoru;
pub mod excite;
pub mod html;
pub mod mullvad;
pub mod privacywall;
pub mod registry;

// Re-export providers for convenience
pub use ekoru::EkoruProvider;
pub use excite::ExciteProvider;
pub use mullvad::MullvadProvider;
pub use privacywall::PrivacyWallProvider;
pub use registry::ProviderRegistry;
