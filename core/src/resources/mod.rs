//! Per-resource clients. Every operation has a pure `build_*` method that
//! produces its `HttpRequest` and an async method that sends it through the
//! shared `Transport`.

mod company;
mod pet;
mod store;
mod user;

pub use company::CompanyApi;
pub use pet::PetApi;
pub use store::StoreApi;
pub use user::UserApi;
