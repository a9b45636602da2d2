//! Repository implementations

pub mod curseforge;

pub use curseforge::CurseForgeRepository;
