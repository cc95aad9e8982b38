// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::time::Duration;

use newsvote_domain::DEFAULT_TRENDING_LIMIT;

/// Default time a caller waits for a vote write before giving up.
pub const DEFAULT_CAST_TIMEOUT: Duration = Duration::from_secs(5);

/// Default time a caller waits for a read before giving up.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Default upper bound on the number of ids in one batch read.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 100;

/// Tunables for the vote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteConfig {
    /// How long a cast or reconciliation may take before the caller gets a timeout.
    pub cast_timeout: Duration,
    /// How long a read may take. A batch read that runs out of time falls
    /// back to zero records.
    pub read_timeout: Duration,
    /// Largest batch accepted by the hydrator.
    pub max_batch_size: usize,
    /// How many articles appear in the trending list.
    pub trending_limit: usize,
}

impl Default for VoteConfig {
    fn default() -> Self {
        Self {
            cast_timeout: DEFAULT_CAST_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            trending_limit: DEFAULT_TRENDING_LIMIT,
        }
    }
}
