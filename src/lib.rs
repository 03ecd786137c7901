pub mod form;
pub mod lookup;
pub mod model;
pub mod session;
pub mod store;
pub mod validate;

pub use form::{CustomerForm, LookupRequest};
pub use lookup::HttpLookup;
pub use model::{Address, Customer, CustomerId};
pub use store::CustomerStore;
