//! CLI commands for the dice wagering simulator.

pub mod batch;
pub mod chi_square;
pub mod compare;
pub mod convergence;
pub mod die;
pub mod output;
pub mod play;
pub mod sim_args;
pub mod simulate;

pub use batch::{run_batch, BatchArgs};
pub use chi_square::{run_chi_square, ChiSquareArgs};
pub use compare::{run_compare, CompareArgs};
pub use convergence::{run_convergence, ConvergenceArgs};
pub use die::{run_die, DieArgs};
pub use play::{run_play, PlayArgs};
pub use simulate::{run_simulate, SimulateArgs};
pub use z_test::{run_z_test, ZTestArgs};
