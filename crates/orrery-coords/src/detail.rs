/// Distance bands that switch auxiliary visual detail on and off.
///
/// A feature is enabled while the observer is strictly closer than its band.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetailBands {
    pub atmosphere_distance: f64,
    pub cloud_detail_distance: f64,
    pub surface_lod_distance: f64,
}

impl Default for DetailBands {
    fn default() -> Self {
        Self {
            atmosphere_distance: 120_000.0,
            cloud_detail_distance: 40_000.0,
            surface_lod_distance: 10_000.0,
        }
    }
}

/// Which auxiliary details should be active for one body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DetailLevel {
    pub atmosphere: bool,
    pub cloud_detail: bool,
    pub surface_lod: bool,
}

impl DetailBands {
    pub fn classify(&self, distance: f64) -> DetailLevel {
        DetailLevel {
            atmosphere: distance < self.atmosphere_distance,
            cloud_detail: distance < self.cloud_detail_distance,
            surface_lod: distance < self.surface_lod_distance,
        }
    }
}
