// Copyright 2026 the Modeloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Switch timing configuration.

use core::fmt;

use crate::time::Duration;

/// Configuration for the [`ModeScheduler`](crate::scheduler::ModeScheduler).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwitchConfig {
    /// Shortest wait between two switches.
    pub min_interval: Duration,
    /// Longest wait between two switches.
    pub max_interval: Duration,
    /// Length of the cross-fade. Clip opacity transitions should use the
    /// same length so audio and picture finish together.
    pub fade: Duration,
    /// Period of the audio fade timer loop.
    pub fade_step: Duration,
    /// Fraction of the waiting interval after which the next clip is
    /// pre-selected and seeked. `None` disables pre-warming.
    pub prewarm_at: Option<f64>,
}

impl SwitchConfig {
    /// Default configuration for the browser page: a switch every 2–10 s
    /// with a one-second cross-fade stepped every 50 ms, pre-warming halfway
    /// through the wait.
    #[must_use]
    pub const fn web() -> Self {
        Self {
            min_interval: Duration::from_secs(2),
            max_interval: Duration::from_secs(10),
            fade: Duration::from_millis(1_000),
            fade_step: Duration::from_millis(50),
            prewarm_at: Some(0.5),
        }
    }

    /// Checks the configuration for values the scheduler cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_interval > self.max_interval {
            return Err(ConfigError::InvertedInterval {
                min: self.min_interval,
                max: self.max_interval,
            });
        }
        if self.fade_step == Duration::ZERO {
            return Err(ConfigError::ZeroFadeStep);
        }
        if self.fade != Duration::ZERO && self.fade_step > self.fade {
            return Err(ConfigError::FadeStepTooLong {
                step: self.fade_step,
                fade: self.fade,
            });
        }
        if let Some(at) = self.prewarm_at
            && !(at > 0.0 && at < 1.0)
        {
            return Err(ConfigError::PrewarmOutOfRange(at));
        }
        Ok(())
    }
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self::web()
    }
}

/// Reasons a [`SwitchConfig`] or mode table is rejected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigError {
    /// The mode table is empty.
    NoModes,
    /// `min_interval` is longer than `max_interval`.
    InvertedInterval {
        /// Configured minimum.
        min: Duration,
        /// Configured maximum.
        max: Duration,
    },
    /// `fade_step` is zero, so the fade loop would never advance.
    ZeroFadeStep,
    /// `fade_step` is longer than a non-zero `fade`.
    FadeStepTooLong {
        /// Configured step.
        step: Duration,
        /// Configured fade.
        fade: Duration,
    },
    /// `prewarm_at` is not strictly between 0 and 1.
    PrewarmOutOfRange(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoModes => write!(f, "mode table is empty"),
            Self::InvertedInterval { min, max } => write!(
                f,
                "min interval {:.3}s exceeds max interval {:.3}s",
                min.as_secs_f64(),
                max.as_secs_f64()
            ),
            Self::ZeroFadeStep => write!(f, "fade step must be non-zero"),
            Self::FadeStepTooLong { step, fade } => write!(
                f,
                "fade step {:.1}ms is longer than the {:.1}ms fade",
                step.as_millis_f64(),
                fade.as_millis_f64()
            ),
            Self::PrewarmOutOfRange(at) => {
                write!(f, "prewarm fraction {at} is outside (0, 1)")
            }
        }
    }
}

impl core::error::Error for ConfigError {}
