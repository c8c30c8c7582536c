// Domain layer: core models and ports (interfaces) shared by the api, entity and client layers.

pub mod model;
pub mod ports;
