// Copyright 2026 the Modeloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The fixed table of modes a deck cycles through.

use core::fmt;

use crate::config::ConfigError;

/// A named looping clip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mode {
    /// URL of the video asset.
    pub source: &'static str,
    /// Human-readable name shown in the mode indicator.
    pub name: &'static str,
}

impl Mode {
    /// Creates a mode.
    #[must_use]
    pub const fn new(source: &'static str, name: &'static str) -> Self {
        Self { source, name }
    }
}

/// Position of a mode in its [`ModeTable`], which is also the position of
/// its clip in the deck.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ModeIndex(pub usize);

impl ModeIndex {
    /// Returns the raw index.
    #[inline]
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Debug for ModeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModeIndex({})", self.0)
    }
}

impl fmt::Display for ModeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A non-empty, immutable list of modes defined at startup.
#[derive(Clone, Copy, Debug)]
pub struct ModeTable {
    modes: &'static [Mode],
}

impl ModeTable {
    /// Wraps a static mode list.
    pub const fn new(modes: &'static [Mode]) -> Result<Self, ConfigError> {
        if modes.is_empty() {
            return Err(ConfigError::NoModes);
        }
        Ok(Self { modes })
    }

    /// Number of modes; always at least one.
    #[inline]
    #[must_use]
    #[expect(clippy::len_without_is_empty, reason = "a table is never empty")]
    pub const fn len(&self) -> usize {
        self.modes.len()
    }

    /// Returns the mode at `index`.
    #[must_use]
    pub fn get(&self, index: ModeIndex) -> Option<&Mode> {
        self.modes.get(index.0)
    }

    /// Returns the display name of the mode at `index`, or `""` when out of
    /// range.
    #[must_use]
    pub fn name_of(&self, index: ModeIndex) -> &'static str {
        self.modes.get(index.0).map_or("", |m| m.name)
    }

    /// Iterates over modes with their indices.
    pub fn iter(&self) -> impl Iterator<Item = (ModeIndex, &'static Mode)> {
        self.modes.iter().enumerate().map(|(i, m)| (ModeIndex(i), m))
    }
}
