pub mod app;
pub mod game_view;
pub mod main_menu;
pub mod settings;
pub mod settings_io;
pub mod theme;
