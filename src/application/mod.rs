pub mod applier;
pub mod gateway;
pub mod intake;
pub mod ledger;
