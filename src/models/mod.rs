// src/models/mod.rs

pub mod assistant;
pub mod course;
pub mod glossary;
pub mod question;
pub mod user_xp;
