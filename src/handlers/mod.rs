// src/handlers/mod.rs

pub mod assistant;
pub mod course;
pub mod glossary;
pub mod quiz;
pub mod xp;
