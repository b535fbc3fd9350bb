use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;
use shared::{DEFAULT_REFERENCE_NAME, RankError, ReferencePoint};

pub const DEFAULT_NEARBY_LIMIT: usize = 3;

#[derive(Debug, Clone, Parser)]
#[command(
    author,
    version,
    about = "Serve the hiking trail directory and distance ranking API"
)]
pub struct ServerConfig {
    /// Address the HTTP server listens on
    #[arg(long, env = "TRAILS_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// JSON file with the trail list (the bundled Dongguan trails when omitted)
    #[arg(long, env = "TRAILS_JSON")]
    pub trails_json: Option<PathBuf>,

    /// Label shown for the reference location
    #[arg(long, env = "REFERENCE_NAME", default_value = DEFAULT_REFERENCE_NAME)]
    pub reference_name: String,

    #[arg(long, env = "REFERENCE_LAT", default_value_t = 22.9907, allow_negative_numbers = true)]
    pub reference_lat: f64,

    #[arg(long, env = "REFERENCE_LNG", default_value_t = 113.7378, allow_negative_numbers = true)]
    pub reference_lng: f64,

    /// How many trails /api/nearby-trails returns by default
    #[arg(long, env = "NEARBY_LIMIT", default_value_t = DEFAULT_NEARBY_LIMIT)]
    pub nearby_limit: usize,

    /// Directory with the built frontend, served for non-API paths
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Reference point from the flags, rejected if it is not on the globe.
    pub fn reference(&self) -> Result<ReferencePoint, RankError> {
        let reference = ReferencePoint::new(
            self.reference_name.clone(),
            self.reference_lat,
            self.reference_lng,
        );
        if reference.coordinate().is_valid() {
            Ok(reference)
        } else {
            Err(RankError::InvalidReference {
                lat: self.reference_lat,
                lon: self.reference_lng,
            })
        }
    }
}
