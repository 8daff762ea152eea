pub mod transaction;
pub mod transport;

/// Builds the fixture of a test from its arguments.
pub trait TestContext<T>: Sized {
    fn setup(args: T) -> Self;
}
