// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every route here sits behind `jwt_auth_middleware`, so handlers receive the
// caller as `Extension<CallerIdentity>`. Scoped resources are checked for
// membership inside the service call before anything else runs.

pub mod commit;
pub mod course;
pub mod group;
pub mod message;
pub mod review;
pub mod task;
pub mod user;
