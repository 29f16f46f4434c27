//! Fallcity - an endlessly travelling procedural falling city

pub mod core;
pub mod city;
pub mod scene;
pub mod atmosphere;
pub mod render;
pub mod remote;
