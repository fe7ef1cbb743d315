//! Mathematical utilities: digit extraction, the Benford distribution, and the
//! chi-square test.

pub mod benford;
pub mod chi2;
pub mod digits;
pub mod gamma;

pub use benford::*;
pub use chi2::*;
pub use digits::*;
