pub mod methods;
pub mod modules;
