pub mod image;
pub mod task;
pub mod user;

pub use image::{Image, ImageMeta, ImageUpload, MAX_IMAGE_BYTES};
pub use task::{NewTask, Task, TaskPatch, TaskQuery, TaskResponse};
pub use user::{NewUser, User, UserResponse};
