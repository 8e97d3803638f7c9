pub mod announcements;
pub mod config;
pub mod error;
pub mod events;
pub mod platform {
    pub mod video_player;
}
pub mod processing {
    pub mod announcement;
    pub mod layout;
}
pub mod render {
    pub mod canvas;
    pub mod framebuffer;
    pub mod text;
}
pub mod tasks {
    pub mod files;
    pub mod manager;
    pub mod viewer;
}
