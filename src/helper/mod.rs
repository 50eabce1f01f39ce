pub mod cycle;
pub mod decimal_ext;
pub mod number;

pub use decimal_ext::DecimalExt;
pub use number::Sign;
