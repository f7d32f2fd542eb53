pub mod document_store;
pub mod error;
pub mod runner;
pub mod secret_store;

pub use document_store::{DocumentStore, FsDocumentStore};
pub use error::ProviderError;
pub use runner::{DynRequestRunner, HttpResponse, RequestRunner};
pub use secret_store::{MemorySecretStore, SecretStore, StoreReceipt};
