#![allow(dead_code)]

pub mod file_helpers;
pub mod source_fixtures;
