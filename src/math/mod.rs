//! Ring arithmetic: modular operations, negacyclic NTT, polynomials in
//! R_q = Z_q[X]/(X^n + 1), and discrete Gaussian sampling.

pub mod gaussian;
pub mod modular;
pub mod ntt;
pub mod poly;

pub use gaussian::{GaussianSampler, DEFAULT_SIGMA};
pub use modular::ModQ;
pub use ntt::{NttTable, DEFAULT_Q};
pub use poly::Poly;
