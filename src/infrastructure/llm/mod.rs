mod generator;
pub mod prompt;

pub use generator::RigGenerator;
pub(crate) use generator::require_env;
