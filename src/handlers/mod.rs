// handlers/mod.rs - two security tiers
//
// Public (no auth) → Protected (bearer token resolved by `jwt_auth_middleware`)

pub mod protected;
pub mod public;
