/// Authentication and authorization
///
/// # Modules
///
/// - [`authorization`]: the ownership gate deciding allow / redirect / sign-in
/// - [`password`]: Argon2id credential hashing
/// - [`jwt`]: session token generation and validation
/// - [`middleware`]: resolves the request's actor from its session token
///
/// Credential checks stay at the edge: by the time a request reaches the
/// gate, identity is already reduced to an optional [`authorization::Actor`].

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
