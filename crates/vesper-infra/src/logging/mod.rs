// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Process-wide logging setup.

use std::sync::Once;

static INIT: Once = Once::new();

/// Configuration for the logging subsystem.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directives applied when `RUST_LOG` is not set.
    pub env_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: "info".to_string(),
        }
    }
}

/// Initializes the global logger.
///
/// `RUST_LOG` overrides the configured filter. Safe to call more than once;
/// only the first call has any effect.
pub fn init_logging(config: &LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&config.env_filter);
        if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        }
        builder.init();
        log::debug!("Logging initialized with filter '{}'", config.env_filter);
    });
}
