//! BIP352 scan tweak computation.
//!
//! Every input is classified once by the shape of the output it spends
//! ([`SpendingPattern`]), its key is summed with the others and the sum is
//! multiplied by a hash committing to the smallest outpoint of the
//! transaction. Point arithmetic goes through [`CurveArithmetic`].

mod curve;
mod input;
mod tweak;

pub use curve::{CurveArithmetic, Secp256k1Curve};
pub use input::{KeyMaterial, SpendingPattern};
pub use tweak::{input_hash, smallest_outpoint, ScanTweakComputer};
