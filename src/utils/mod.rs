// Shared helpers used by the indexer and the CLI.

/// Relative, forward-slash paths
pub mod paths;

/// Token estimation for optimization reports
pub mod token_estimation;

