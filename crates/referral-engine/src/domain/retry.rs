//! Bounded retry policy for optimistic commits.
//!
//! Collision retries in the allocator and guard-conflict retries in the
//! linker and propagation worker are expressed as explicit bounded
//! policies with typed terminal errors, never open-ended loops.

/// Outcome of a single attempt.
pub enum Attempt<T, E> {
    /// The operation finished with a value.
    Done(T),
    /// The attempt lost a race; try again if budget remains.
    Retry,
    /// Terminal failure; retrying cannot succeed.
    Fail(E),
}

/// A bounded retry policy.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl RetryPolicy {
    /// Policy allowing up to `max_attempts` attempts.
    pub fn new(max_attempts: u32) -> Self {
        debug_assert!(max_attempts > 0);
        Self { max_attempts }
    }

    /// How many attempts this policy allows.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `op` until it finishes, fails terminally, or the budget is
    /// spent. `exhausted` is returned when every attempt asked to retry.
    pub fn run<T, E>(
        &self,
        mut op: impl FnMut(u32) -> Attempt<T, E>,
        exhausted: E,
    ) -> Result<T, E> {
        for attempt in 1..=self.max_attempts {
            match op(attempt) {
                Attempt::Done(value) => return Ok(value),
                Attempt::Fail(err) => return Err(err),
                Attempt::Retry => continue,
            }
        }
        Err(exhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_attempt_succeeds() {
        let policy = RetryPolicy::new(3);
        let result: Result<u32, &str> = policy.run(|attempt| Attempt::Done(attempt), "exhausted");
        assert_eq!(result, Ok(1));
    }

    #[test]
    fn test_retries_until_success() {
        let policy = RetryPolicy::new(5);
        let result: Result<u32, &str> = policy.run(
            |attempt| {
                if attempt < 3 {
                    Attempt::Retry
                } else {
                    Attempt::Done(attempt)
                }
            },
            "exhausted",
        );
        assert_eq!(result, Ok(3));
    }

    #[test]
    fn test_exhaustion_returns_typed_error() {
        let policy = RetryPolicy::new(4);
        let mut attempts = 0;
        let result: Result<u32, &str> = policy.run(
            |_| {
                attempts += 1;
                Attempt::Retry
            },
            "exhausted",
        );
        assert_eq!(result, Err("exhausted"));
        assert_eq!(attempts, 4);
    }

    #[test]
    fn test_terminal_failure_stops_immediately() {
        let policy = RetryPolicy::new(10);
        let mut attempts = 0;
        let result: Result<u32, &str> = policy.run(
            |_| {
                attempts += 1;
                Attempt::Fail("terminal")
            },
            "exhausted",
        );
        assert_eq!(result, Err("terminal"));
        assert_eq!(attempts, 1);
    }
}
