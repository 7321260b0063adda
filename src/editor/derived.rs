//! Version-keyed derived state.

/// A value derived from a particular document version.
///
/// Offers carrying an older version than the stored one are rejected, so a
/// slow recomputation that finishes after a newer one can never overwrite
/// it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Versioned<T> {
    version: u64,
    value: T,
}

impl<T> Versioned<T> {
    /// Create a cell holding `value` for `version`.
    pub fn new(version: u64, value: T) -> Self {
        Self { version, value }
    }

    /// Store `value` unless `version` is older than the current one.
    ///
    /// Returns `true` when the value was accepted.
    pub fn offer(&mut self, version: u64, value: T) -> bool {
        if version < self.version {
            log::debug!(
                "Discarding derived state for version {} (have {})",
                version,
                self.version
            );
            return false;
        }
        self.version = version;
        self.value = value;
        true
    }

    /// Current value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Version the current value was derived from.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Check if the value was derived from `version`.
    pub fn is_current(&self, version: u64) -> bool {
        self.version == version
    }

    /// Take the value out.
    pub fn into_inner(self) -> T {
        self.value
    }
}
