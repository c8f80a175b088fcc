mod color_name;
mod email;
mod media_folder;

pub use color_name::ColorName;
pub use email::Email;
pub use media_folder::MediaFolder;
