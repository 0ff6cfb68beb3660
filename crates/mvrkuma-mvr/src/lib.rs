// mvrkuma-mvr: MVR (My Virtual Rig) show-file reading, network patching and writing

pub mod builder;
pub mod error;
pub mod model;
pub mod scene;
pub mod xml;

pub use builder::{NewFixture, SceneBuilder};
pub use error::Error;
pub use model::{MvrAddress, MvrAuxEntry, MvrFixture, MvrLayer, MvrNetwork};
pub use scene::{Resource, SceneDocument};
