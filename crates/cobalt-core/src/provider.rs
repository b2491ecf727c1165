//! Availability of an external provider, decided once at startup.

/// Either a provider has credentials and a live handle, or it does not.
///
/// Callers branch on this instead of probing credentials per request.
#[derive(Debug, Clone)]
pub enum ProviderState<T> {
    Unconfigured,
    Configured(T),
}

impl<T> ProviderState<T> {
    /// Builds the state from an optional credential. `build` runs only when
    /// a non-blank credential is present.
    ///
    /// # Errors
    ///
    /// Returns whatever `build` fails with.
    pub fn try_from_credential<E, F>(credential: Option<&str>, build: F) -> Result<Self, E>
    where
        F: FnOnce(&str) -> Result<T, E>,
    {
        match credential.map(str::trim).filter(|key| !key.is_empty()) {
            Some(key) => build(key).map(ProviderState::Configured),
            None => Ok(ProviderState::Unconfigured),
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, ProviderState::Configured(_))
    }

    #[must_use]
    pub fn handle(&self) -> Option<&T> {
        match self {
            ProviderState::Configured(handle) => Some(handle),
            ProviderState::Unconfigured => None,
        }
    }
}
