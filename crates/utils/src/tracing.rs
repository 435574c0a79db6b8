// Copyright 2025 Irreducible Inc.

use crate::env::boolean_env_flag_set;

/// Installs a global `tracing` subscriber for binaries, tests and benches built on lamina.
///
/// Filtering follows `RUST_LOG` (default `warn`). With `LAMINA_TRACE_SPANS` set, the duration of
/// each instrumented kernel is reported when its span closes. A subscriber installed earlier is
/// left in place.
pub fn init_tracing() {
	use tracing_subscriber::{
		fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
	};

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
	let span_events = if boolean_env_flag_set("LAMINA_TRACE_SPANS") {
		FmtSpan::CLOSE
	} else {
		FmtSpan::NONE
	};

	let _ = tracing_subscriber::registry()
		.with(filter)
		.with(tracing_subscriber::fmt::layer().with_span_events(span_events))
		.try_init();
}
