pub mod credentials;
pub mod images;
pub mod tasks;

pub use credentials::CredentialService;
pub use images::ImageService;
pub use tasks::TaskService;
