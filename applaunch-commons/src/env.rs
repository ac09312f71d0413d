/// Read-only access to environment variables.
///
/// Implementations must be cheap to query repeatedly; callers look up the
/// same key more than once during a single launch.
pub trait EnvLookup: Send + Sync {
    /// Return the value of `key`, or `None` when it is unset or not valid UTF-8.
    fn var(&self, key: &str) -> Option<String>;

    /// Return the value of `key` only when it is set to a non-empty string.
    fn non_empty(&self, key: &str) -> Option<String> {
        self.var(key).filter(|value| !value.is_empty())
    }
}

/// Environment lookup backed by the real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl<T> EnvLookup for &T
where
    T: EnvLookup + ?Sized,
{
    fn var(&self, key: &str) -> Option<String> {
        (**self).var(key)
    }
}
