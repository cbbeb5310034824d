/// Re-export `Config` from `folio-core` for use within this crate.
///
/// All environment-variable parsing lives in `folio-core` so integration
/// tests can build a config without the full server.
pub use folio_core::config::{Config, SiteProfile};
