//! Core dispatch engine
//!
//! Contains the registry, the argument binder with its type coercion, and
//! the dispatcher that ties them together.

pub mod args;
pub mod binder;
pub mod coerce;
pub mod dispatcher;
pub mod handler;
pub mod registry;

pub use args::{CommandArgs, FieldType};
pub use binder::{BoundArgs, FieldDescriptor, FieldSpec, Schema};
pub use coerce::{FieldKind, Value};
pub use dispatcher::{DispatchState, Dispatcher};
pub use handler::{CancelToken, Context, Handler, HandlerShape};
pub use registry::{Category, CategoryMut, Command, Registry};
