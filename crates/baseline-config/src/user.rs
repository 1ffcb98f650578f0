/// Environment variables consulted, in order, for the current user.
pub const USER_ENV_VARS: &[&str] = &["BASELINE_USER", "USER", "LOGNAME"];

/// Name of the invoking user, `unknown` when none of [`USER_ENV_VARS`] is set.
pub fn current_user() -> String {
  user_from(|name| std::env::var(name).ok())
}

/// Resolve the user through `lookup`, first non-empty variable wins.
pub fn user_from(lookup: impl Fn(&str) -> Option<String>) -> String {
  USER_ENV_VARS
    .iter()
    .filter_map(|name| lookup(name))
    .map(|value| value.trim().to_string())
    .find(|value| !value.is_empty())
    .unwrap_or_else(|| "unknown".to_string())
}
