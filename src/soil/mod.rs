pub mod layer;
pub mod profile;
pub mod soil_type;
pub mod sublayer;

pub use layer::{RockLayer, SoilLayer};
pub use profile::SoilProfile;
pub use soil_type::SoilType;
pub use sublayer::{Location, SubLayer};
