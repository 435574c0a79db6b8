// Copyright 2025 Irreducible Inc.

/// Read a boolean flag from the environment; unset or unrecognised values count as `false`.
pub fn boolean_env_flag_set(flag: &str) -> bool {
	std::env::var(flag).is_ok_and(|val| {
		["1", "on", "ON", "true", "TRUE", "yes", "YES"].contains(&val.trim())
	})
}

/// Read a positive integer from the environment, falling back to `default` when the variable is
/// unset, unparsable or zero.
pub fn usize_env_var(name: &str, default: usize) -> usize {
	std::env::var(name)
		.ok()
		.and_then(|val| val.trim().parse::<usize>().ok())
		.filter(|&val| val > 0)
		.unwrap_or(default)
}
