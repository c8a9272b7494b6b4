mod meshes;

mod budget;
mod dumbbell;
mod export;
mod invalid_input;
mod pca;
mod resolution;
mod unit_cube;
