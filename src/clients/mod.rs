pub mod tvdb;
