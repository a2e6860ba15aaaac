// Services layer for business logic
// Services own validation, sealing and masking, calling storage directly

pub mod bootstrap;
pub mod model_config;
pub mod probe;
pub mod reseal;

pub use bootstrap::{bootstrap, BootstrapOutcome, LegacyCredential};
pub use model_config::ModelConfigService;
pub use probe::ConnectionProber;
pub use reseal::{reseal_legacy_credentials, ResealReport};
