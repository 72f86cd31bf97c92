/// Classification for retry policy.
///
/// Tells the caller how to respond to a provider error.
///
/// | Class | Retry same provider? | Try another source? |
/// |-------|---------------------|---------------------|
/// | `Never` | No | No |
/// | `WithBackoff` | Yes, after backing off | Yes |
/// | `NextProvider` | No | Yes |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - bad symbol, validation error, cancellation, or another
    /// terminal failure. The request is fundamentally invalid and retrying
    /// won't help.
    Never,

    /// Transient failure (rate limit, timeout). Retrying the same provider
    /// after a backoff is reasonable.
    WithBackoff,

    /// This provider can't serve the request, but another source might.
    NextProvider,
}
