//! Overload dispatch.
//!
//! Selects which implementation of an overloaded function runs, based on
//! the runtime values of all arguments.
//!
//! # Algorithm Overview
//!
//! 1. **Compile**: Each declared overload becomes a [`Candidate`] whose
//!    tuple guard checks exact arity and per-position type membership
//! 2. **Select**: Candidates are tried in declaration order; the first whose
//!    guard accepts the arguments wins
//! 3. **Convert**: Arguments accepted through a conversion edge are replaced
//!    by their converted values
//! 4. **Invoke**: The winning method runs with the converted arguments
//!
//! Declaration order is the only precedence rule. Callers that want a
//! different order must supply the overloads in that order.
//!
//! # Module Structure
//!
//! - [`types`] - Core type definitions (Overload, FunctionSpec, Candidate)
//! - [`result`] - Dispatch errors
//! - [`resolver`] - Dispatcher construction and first-match selection

mod resolver;
mod result;
mod types;


pub use resolver::{Dispatcher, ANONYMOUS};
pub use result::{DispatchError, DispatchResult, NoMatchError};
pub use types::{method, method_with_receiver, Candidate, FunctionSpec, Method, Overload};
