//! Common data types used throughout the stakeline system

pub mod round;
pub mod validator;
pub mod yields;

pub use round::RoundStatus;
pub use validator::{Hint, RawValidator, Validator, EMPTY_ADDRESS};
pub use yields::{Currency, YieldPeriod};
