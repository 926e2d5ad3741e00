/// Reads an environment variable, falling back to `default` when unset.
///
/// Used for optional overrides such as alternate data endpoints.
pub fn env_var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
