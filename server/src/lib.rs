// Life of a request:
// 1. JSON comes in over HTTP
// 2. Protected routes: the gate validates the bearer token and resolves the
//    caller's identity before the handler runs
// 3. The handler parses the body into typed input and calls a service on the
//    blocking pool
//     - accounts: hash or verify the password, issue a token
//     - notes: read or write only rows owned by the identity
// 4. The outcome is mapped to a status code and a JSON body
//
// System components:
//  - Credential hasher (Argon2id)
//  - Token service (HS256 JWT)
//  - Authorization gate
//  - Store (in-memory behind a trait)

pub mod accounts;
pub mod api;
pub mod auth;
pub mod config;
pub mod notes;
pub mod seed;
pub mod store;
pub mod time;

#[cfg(test)]
mod e2e_tests;
#[cfg(test)]
mod testing;
