//! # REST API Module
//!
//! Resource endpoints for bootcamps, courses, reviews and users, and the
//! query translation / pagination engine every list endpoint shares.

pub mod advanced;
pub mod collection;
pub mod errors;
pub mod filter;
pub mod handler;
pub mod parser;
pub mod resource;
pub mod response;
pub mod server;

pub use advanced::{PageRef, PaginationWindow, ResultAssembler, ResultEnvelope};
pub use collection::{Collection, CollectionHandle, DocumentStore, Expansion, FindQuery};
pub use errors::{RestError, RestResult};
pub use filter::{ContainsPattern, Filter, FilterOperator, Operand, Predicate};
pub use handler::{DirectoryHandler, RestHandler};
pub use parser::{QueryPlan, QueryTranslator, ReservedKey, SortDirection, SortKey};
pub use resource::Resource;
pub use response::{ListResponse, SingleResponse};
pub use server::RestServer;
