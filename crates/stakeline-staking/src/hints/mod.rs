//! Position hints for the bonding manager's stake-sorted linked list

mod hint;
mod simulation;

pub use hint::get_hint;
pub use simulation::{simulate_new_active_set_order, ActiveSetChange, StakeAction};
