pub mod controller;
pub mod data;
pub mod domain;
pub mod inputter;
pub mod model;
pub mod stretch;
pub mod ui;
