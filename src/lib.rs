pub mod appearance;
pub mod config;
pub mod error;
pub mod events;
pub mod finder;
pub mod frame;
pub mod interval;
pub mod playlist;
pub mod preview;
pub mod resolution;
pub mod scheduler;
pub mod slideshow_xml;
pub mod timeline;
pub mod wallpaper_list;
pub mod processing {
    pub mod blend;
    pub mod image_io;
    pub mod layout;
}
pub mod tasks {
    pub mod slideshow;
    pub mod xml_timer;
}

pub use error::Error;
