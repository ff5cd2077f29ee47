mod effects;
mod environments;
mod repository;
