pub mod audit;
pub mod authorization;
pub mod capability;
pub mod verifier;
