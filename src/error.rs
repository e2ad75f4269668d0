use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// A power train error.
///
/// Peripheral errors are passed through unchanged, so the variant a
/// [`PwmPeripheral`](crate::hal::PwmPeripheral) returns is the variant the
/// caller of [`PowerTrain`](crate::PowerTrain) sees.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A configuration constant is out of bounds.
    #[error("invalid argument")]
    InvalidArgument,

    /// The motor slot does not exist in this power train.
    #[error("motor slot {0} is out of range")]
    OutOfRange(usize),

    /// The peripheral has no free timebase, comparator or generator.
    #[error("PWM peripheral resources exhausted")]
    ResourceExhausted,

    /// The peripheral rejected an operation. Fatal for the affected resource.
    #[error("PWM peripheral hardware fault")]
    HardwareFault,

    /// The power train has not been (successfully) initialized.
    #[error("power train is not initialized")]
    NotInitialized,

    /// The arm sequence has not reached its steady stage.
    #[error("power train is not armed")]
    NotArmed,
}
